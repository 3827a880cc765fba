//! RISC-V `time` CSR.
//!
//! `cycle` is not used: Linux stops exposing it to user mode by default, while
//! `time` stays readable everywhere.

use core::arch::asm;

#[cfg(target_arch = "riscv64")]
#[inline(always)]
pub fn read() -> u64 {
    let count: u64;
    // SAFETY: RDTIME only reads the time CSR.
    unsafe {
        asm!("rdtime {}", out(reg) count, options(nomem, nostack));
    }
    count
}

/// RV32 exposes the counter as two CSRs. The high word is read on both sides
/// of the low word and the pair retried if a carry happened in between.
#[cfg(target_arch = "riscv32")]
#[inline(always)]
pub fn read() -> u64 {
    loop {
        let hi: u32;
        let lo: u32;
        let hi_again: u32;
        // SAFETY: RDTIMEH/RDTIME only read the time CSRs.
        unsafe {
            asm!(
                "rdtimeh {0}",
                "rdtime {1}",
                "rdtimeh {2}",
                out(reg) hi,
                out(reg) lo,
                out(reg) hi_again,
                options(nomem, nostack),
            );
        }
        if hi == hi_again {
            return super::combine(hi, lo);
        }
    }
}

#[inline(always)]
pub fn read_serialized() -> u64 {
    fence();
    let count = read();
    fence();
    count
}

#[inline(always)]
fn fence() {
    // SAFETY: a full fence has no effect beyond ordering.
    unsafe {
        asm!("fence rw, rw", options(nostack));
    }
}

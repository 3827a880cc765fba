//! AArch64 generic timer, virtual count (`CNTVCT_EL0`).
//!
//! The register is a single 64-bit value readable from EL0 on every OS we
//! target; it ticks at the fixed `CNTFRQ_EL0` rate, not the core clock.

use core::arch::asm;

#[inline(always)]
pub fn read() -> u64 {
    let count: u64;
    // SAFETY: reading CNTVCT_EL0 has no side effects.
    unsafe {
        asm!(
            "mrs {}, cntvct_el0",
            out(reg) count,
            options(nomem, nostack, preserves_flags),
        );
    }
    count
}

/// `ISB` on both sides keeps the read from being speculated early or late.
#[inline(always)]
pub fn read_serialized() -> u64 {
    let count: u64;
    // SAFETY: ISB and an MRS of CNTVCT_EL0 have no side effects.
    unsafe {
        asm!(
            "isb",
            "mrs {}, cntvct_el0",
            "isb",
            out(reg) count,
            options(nostack, preserves_flags),
        );
    }
    count
}

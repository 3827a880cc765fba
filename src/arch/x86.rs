//! `RDTSC` on x86 and x86_64.
//!
//! The instruction leaves the low 32 bits in EAX and the high 32 bits in EDX
//! (the upper halves of RAX/RDX are cleared on x86_64), so both targets read
//! the two halves and join them the same way. Every x86 target gets this
//! backend; only the serialized read depends on SSE2.

use core::arch::asm;

use super::combine;

/// Unserialized read. The CPU may execute it before earlier instructions
/// retire or after later ones begin.
#[inline(always)]
pub fn read() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: RDTSC only writes EDX:EAX and touches neither memory nor flags.
    unsafe {
        asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    combine(hi, lo)
}

/// `LFENCE; RDTSC; LFENCE`: earlier instructions complete before the read and
/// later ones do not start until it has been taken.
#[cfg(target_feature = "sse2")]
#[inline(always)]
pub fn read_serialized() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: LFENCE and RDTSC have no memory operands; LFENCE is part of SSE2,
    // which this function is gated on.
    unsafe {
        asm!(
            "lfence",
            "rdtsc",
            "lfence",
            out("eax") lo,
            out("edx") hi,
            options(nostack, preserves_flags),
        );
    }
    combine(hi, lo)
}

/// Pre-SSE2 parts (i586 class) have no LFENCE; CPUID is the serializing
/// instruction available wherever RDTSC is.
#[cfg(all(target_arch = "x86", not(target_feature = "sse2")))]
#[inline(always)]
pub fn read_serialized() -> u64 {
    use core::arch::x86::__cpuid;

    // SAFETY: CPUID leaf 0 only reads identification registers.
    unsafe {
        __cpuid(0);
    }
    let count = read();
    // SAFETY: as above.
    unsafe {
        __cpuid(0);
    }
    count
}

//! Per-architecture counter reads, selected at build time.
//!
//! `build.rs` sets exactly one `cyclecount_backend` cfg. Each backend module
//! exposes `read()` and `read_serialized()` with identical signatures.

use crate::backend::Backend;

#[cfg(cyclecount_backend = "rdtsc")]
pub(crate) mod x86;
#[cfg(cyclecount_backend = "rdtsc")]
pub(crate) use self::x86 as imp;
#[cfg(cyclecount_backend = "rdtsc")]
pub(crate) const ACTIVE: Backend = Backend::Rdtsc;

#[cfg(cyclecount_backend = "cntvct")]
pub(crate) mod aarch64;
#[cfg(cyclecount_backend = "cntvct")]
pub(crate) use self::aarch64 as imp;
#[cfg(cyclecount_backend = "cntvct")]
pub(crate) const ACTIVE: Backend = Backend::Cntvct;

#[cfg(cyclecount_backend = "rdtime")]
pub(crate) mod riscv;
#[cfg(cyclecount_backend = "rdtime")]
pub(crate) use self::riscv as imp;
#[cfg(cyclecount_backend = "rdtime")]
pub(crate) const ACTIVE: Backend = Backend::Rdtime;

// Also built under test so the clock path is covered on hardware hosts.
#[cfg(any(cyclecount_backend = "fallback", test))]
pub(crate) mod fallback;
#[cfg(cyclecount_backend = "fallback")]
pub(crate) use self::fallback as imp;
#[cfg(cyclecount_backend = "fallback")]
pub(crate) const ACTIVE: Backend = Backend::Fallback;

#[cfg(not(any(
    cyclecount_backend = "rdtsc",
    cyclecount_backend = "cntvct",
    cyclecount_backend = "rdtime",
    cyclecount_backend = "fallback",
)))]
compile_error!(
    "UnsupportedPlatform: no cycle counter backend was selected for this target; \
     build through cargo so build.rs can pick one, or enable the `fallback` feature"
);

/// Joins a counter split across two 32-bit registers. `hi` is the half the
/// instruction defines as the upper word (EDX for RDTSC, RDTIMEH on RV32).
#[allow(dead_code)]
#[inline(always)]
pub(crate) const fn combine(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_places_high_half_on_top() {
        assert_eq!(combine(0, 0), 0);
        assert_eq!(combine(0, 0xFFFF_FFFF), 0x0000_0000_FFFF_FFFF);
        assert_eq!(combine(1, 0), 0x0000_0001_0000_0000);
        assert_eq!(combine(0xDEAD_BEEF, 0x0123_4567), 0xDEAD_BEEF_0123_4567);
        assert_eq!(combine(u32::MAX, u32::MAX), u64::MAX);
    }

    #[test]
    fn test_combine_never_sign_extends_low_half() {
        // A low word with its top bit set must not leak into the high word.
        assert_eq!(combine(0, 0x8000_0000), 0x8000_0000);
        assert_eq!(combine(2, 0x8000_0000) >> 32, 2);
    }
}

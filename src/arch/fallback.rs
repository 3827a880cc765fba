//! Monotonic clock in nanoseconds, for targets without a counter instruction.
//!
//! Values are nanoseconds, not cycles. They only share the contract of the
//! hardware backends: 64-bit, non-decreasing on a thread, wrapping.

use std::sync::atomic::{fence, Ordering};

#[cfg(any(target_os = "linux", target_os = "android"))]
const CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC_RAW;
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
const CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[cfg(unix)]
#[inline]
pub fn read() -> u64 {
    // SAFETY: timespec is plain old data; all-zero is a valid value.
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    // SAFETY: `ts` is a valid, writable timespec and CLOCK is a monotonic
    // clock id every supported kernel provides.
    let rc = unsafe { libc::clock_gettime(CLOCK, &mut ts) };
    debug_assert_eq!(rc, 0, "clock_gettime on a monotonic clock failed");
    (ts.tv_sec as u64)
        .wrapping_mul(NANOS_PER_SEC)
        .wrapping_add(ts.tv_nsec as u64)
}

#[cfg(not(unix))]
#[inline]
pub fn read() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    let anchor = ANCHOR.get_or_init(Instant::now);
    anchor.elapsed().as_nanos() as u64
}

#[inline]
pub fn read_serialized() -> u64 {
    fence(Ordering::SeqCst);
    let now = read();
    fence(Ordering::SeqCst);
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fallback_is_monotonic() {
        let mut prev = read();
        for _ in 0..10_000 {
            let now = read();
            assert!(now >= prev, "clock went backwards: {} -> {}", prev, now);
            prev = now;
        }
    }

    #[test]
    fn test_fallback_counts_nanoseconds() {
        let start = read_serialized();
        std::thread::sleep(Duration::from_millis(20));
        let elapsed = read_serialized() - start;
        // Lower bound only; a loaded host can oversleep arbitrarily.
        assert!(elapsed >= 20_000_000, "only {}ns elapsed across a 20ms sleep", elapsed);
    }
}

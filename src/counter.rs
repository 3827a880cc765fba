//! The counter read primitives.
//!
//! Reads are stateless: no allocation, no locks, no system calls on the
//! hardware backends. They can be called from any thread at any time.
//!
//! # Ordering
//!
//! [`read_cycles`] is unserialized. The processor may take the reading before
//! earlier instructions finish or after later ones start, so it brackets a
//! region only approximately. [`read_cycles_serialized`] fences the read on
//! both sides at the cost of a slower call.
//!
//! # Cross-core behaviour
//!
//! Each core's counter is non-decreasing. Counters on different cores are not
//! guaranteed to be synchronized, so two reads taken on different cores may
//! compare in either order.
//!
//! # Wraparound
//!
//! Values wrap to zero after `u64::MAX`. At GHz rates that takes centuries,
//! but differences should still go through [`cycles_between`].

use crate::arch;
use crate::backend::Backend;
use crate::error::{Error, Result};

/// A raw counter reading: cycles on hardware backends, nanoseconds on the
/// clock fallback.
pub type CycleValue = u64;

/// Returns the current counter value exactly as the hardware presents it.
///
/// No scaling, calibration, or fencing is applied.
#[inline(always)]
pub fn read_cycles() -> CycleValue {
    arch::imp::read()
}

/// Like [`read_cycles`], but fenced so the read is not reordered with the
/// surrounding instructions.
#[inline(always)]
pub fn read_cycles_serialized() -> CycleValue {
    arch::imp::read_serialized()
}

/// Ticks elapsed from `start` to `end`, correct across a single wraparound.
#[inline]
pub const fn cycles_between(start: CycleValue, end: CycleValue) -> CycleValue {
    end.wrapping_sub(start)
}

impl Backend {
    /// The backend this build reads from.
    pub const ACTIVE: Backend = arch::ACTIVE;

    /// Same rule as [`Backend::for_target`], reporting rejection as
    /// [`Error::UnsupportedPlatform`].
    pub fn select(arch: &str, fallback: bool) -> Result<Backend> {
        Backend::for_target(arch, fallback).ok_or_else(|| Error::UnsupportedPlatform {
            arch: arch.to_string(),
        })
    }
}

/// Handle on the counter for code that wants to hold or pass one around.
///
/// Zero-sized; every method forwards to the free functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounter;

impl CycleCounter {
    pub const fn new() -> Self {
        CycleCounter
    }

    #[inline(always)]
    pub fn read(&self) -> CycleValue {
        read_cycles()
    }

    #[inline(always)]
    pub fn read_serialized(&self) -> CycleValue {
        read_cycles_serialized()
    }

    pub const fn backend(&self) -> Backend {
        Backend::ACTIVE
    }
}

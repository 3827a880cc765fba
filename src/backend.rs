//! Counter backend selection.
//!
//! This file is compiled twice: once by `build.rs` to pick the backend for the
//! target being built, and once as part of the library so the same rule is
//! visible (and testable) at run time. It must stay free of crate imports.

use std::fmt;

/// The instruction family used to read the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// x86 / x86_64 `RDTSC`, returned split across EDX:EAX.
    Rdtsc,
    /// AArch64 virtual count register `CNTVCT_EL0`.
    Cntvct,
    /// RISC-V `time` CSR (`RDTIME`, plus `RDTIMEH` on RV32).
    Rdtime,
    /// Nanosecond monotonic clock for targets without a counter instruction.
    Fallback,
}

impl Backend {
    /// Every backend, in cfg declaration order.
    pub const ALL: [Backend; 4] = [
        Backend::Rdtsc,
        Backend::Cntvct,
        Backend::Rdtime,
        Backend::Fallback,
    ];

    /// Picks the backend for a target.
    ///
    /// `arch` is a `target_arch` value as cargo reports it to build scripts.
    /// Returns `None` when the target has no counter instruction and
    /// `fallback` is off.
    pub fn for_target(arch: &str, fallback: bool) -> Option<Backend> {
        let hardware = match arch {
            "x86_64" | "x86" => Some(Backend::Rdtsc),
            "aarch64" => Some(Backend::Cntvct),
            "riscv64" | "riscv32" => Some(Backend::Rdtime),
            _ => None,
        };

        match hardware {
            Some(backend) => Some(backend),
            None if fallback => Some(Backend::Fallback),
            None => None,
        }
    }

    /// Value used in `cfg(cyclecount_backend = "...")`.
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Rdtsc => "rdtsc",
            Backend::Cntvct => "cntvct",
            Backend::Rdtime => "rdtime",
            Backend::Fallback => "fallback",
        }
    }

    /// Human-readable description of what is executed on a read.
    pub const fn instruction(self) -> &'static str {
        match self {
            Backend::Rdtsc => "RDTSC",
            Backend::Cntvct => "MRS CNTVCT_EL0",
            Backend::Rdtime => "RDTIME",
            Backend::Fallback => "monotonic clock (ns)",
        }
    }

    /// Width of the value the backend produces. All current backends hand
    /// back a full 64-bit count.
    pub const fn counter_bits(self) -> u32 {
        match self {
            Backend::Rdtsc | Backend::Cntvct | Backend::Rdtime | Backend::Fallback => 64,
        }
    }

    /// False for the clock-based fallback.
    pub const fn is_hardware(self) -> bool {
        !matches!(self, Backend::Fallback)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.instruction())
    }
}

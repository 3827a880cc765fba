//! Raw hardware cycle counter reads.
//!
//! [`read_cycles`] executes the target's counter instruction (`RDTSC` on x86,
//! `CNTVCT_EL0` on AArch64, `RDTIME` on RISC-V) and returns the value as a
//! `u64`, with no scaling and no fencing. The instruction is chosen at build
//! time; targets without one fail to build unless the `fallback` feature
//! substitutes a nanosecond monotonic clock.
//!
//! ```no_run
//! use cyclecount::{cycles_between, read_cycles};
//!
//! let start = read_cycles();
//! // ... work ...
//! let elapsed = cycles_between(start, read_cycles());
//! println!("{elapsed} cycles");
//! ```

mod arch;
mod backend;
pub mod counter;
pub mod error;
pub mod ffi;
pub mod probe;

pub use backend::Backend;
pub use counter::{cycles_between, read_cycles, read_cycles_serialized, CycleCounter, CycleValue};
pub use error::{Error, Result};

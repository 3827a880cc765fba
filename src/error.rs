use std::io;
use thiserror::Error;

/// Errors outside the read path. Reading the counter itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    /// The target architecture has no usable counter instruction and the
    /// clock fallback was not requested.
    #[error("unsupported platform: `{arch}` has no cycle counter instruction")]
    UnsupportedPlatform {
        /// `target_arch` value that was rejected.
        arch: String,
    },

    /// The probe could not pin its thread to a CPU.
    #[error("failed to pin thread to CPU {cpu}: {source}")]
    Affinity {
        /// CPU index that was requested.
        cpu: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Probe configuration rejected by validation.
    #[error("invalid probe configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for fallible cyclecount operations.
pub type Result<T> = std::result::Result<T, Error>;

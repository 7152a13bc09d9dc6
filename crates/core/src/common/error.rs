//! Fatal precondition violations surfaced by the core.
//!
//! Only invariant violations are errors here: an out-of-range core id or a
//! failed allocation/configuration. Malformed ops, register ids `>= 64`,
//! chain/path truncation, and RRB pushes dropped during a walk are all
//! *designed* recoverable behavior and never appear as a [`CoreError`].

use thiserror::Error;

/// Fatal errors raised by the H2P core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A core id was used that is not less than the configured `NUM_CORES`.
    #[error("core id {core} out of bounds (NUM_CORES = {num_cores})")]
    CoreIdOutOfBounds {
        /// The offending core id.
        core: usize,
        /// The configured number of cores.
        num_cores: usize,
    },

    /// A size parameter in [`crate::config::Config`] was zero where a positive
    /// value is required (e.g. `RRB_SIZE`, `HBT_SIZE`).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A core context was used before `rrb_init`/`init_dep_chain_caches` allocated it.
    #[error("core {core} was not initialized before use")]
    CoreNotInitialized {
        /// The offending core id.
        core: usize,
    },
}

/// Convenience alias for fallible core operations.
pub type CoreResult<T> = Result<T, CoreError>;

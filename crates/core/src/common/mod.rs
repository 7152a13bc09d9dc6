//! Common types shared across the H2P core: the retired-op record and the
//! fatal error taxonomy.

/// Fatal error taxonomy (out-of-range core id, invalid configuration).
pub mod error;
/// The retired operation record (`Op`) and its small enums.
pub mod op;

pub use error::{CoreError, CoreResult};
pub use op::{CfType, MemType, Op, OpType, TRACKED_REGISTER_SPACE};

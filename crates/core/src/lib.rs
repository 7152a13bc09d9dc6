//! Hard-to-predict (H2P) branch analysis core.
//!
//! This crate implements the per-core analysis pipeline a surrounding
//! out-of-order simulator drives at branch retirement:
//! 1. **Identification:** a saturating-counter table classifies branches as
//!    hard-to-predict from their live misprediction history.
//! 2. **Context capture:** a retirement ring buffer holds the most recent
//!    ops so a hard branch's surrounding context is available when it's
//!    time to walk backward from it.
//! 3. **Slice extraction:** a backward-walk engine and a register/address
//!    live-in tracker isolate the minimal dependency slice feeding a hard
//!    branch's condition.
//! 4. **Caching:** the slice is cached two ways — a flat dependency chain
//!    keyed on the branch PC, and a block-granularity chain plus an
//!    empty-block tag store for ops that turned out to have no live
//!    dependencies in a given block.
//! 5. **On/off-path recovery:** when a hard branch is evicted from the ring
//!    buffer before a walk reaches it, its trailing context is preserved
//!    separately so the work isn't lost.
//!
//! [`H2pCore`] owns every modeled core's state side-by-side and is the
//! single entry point the rest of this crate is built to support.

/// Common types shared across the core: the retired-op record and the fatal
/// error taxonomy.
pub mod common;
/// Core configuration: table/cache sizes, thresholds, and logging.
pub mod config;
/// Hard Branch Table: saturating-counter H2P classification.
pub mod hbt;
/// Live-In Set: register and address-range live-in tracking used by slice
/// extraction.
pub mod liws;
/// Retirement Ring Buffer: per-core context window.
pub mod rrb;
/// Backward slice extraction: dependency-slice isolation over the live-in
/// tracker.
pub mod bse;
/// Dependency Chain Cache: flat per-PC slice cache.
pub mod dcc;
/// Block Chain Cache and Empty Block Tag Store: block-granularity slice
/// cache.
pub mod bcc;
/// Backward-Walk Engine: the latency-modeled walk scheduler.
pub mod bwe;
/// On/Off-Path Recorder: trailing-context recovery for evicted H2P ops.
pub mod oopr;
/// Periodic maintenance: scheduled BCC/EBTS clearing.
pub mod maintenance;
/// Per-core statistics.
pub mod stats;
/// Lookup API and retirement driver: wires every subsystem together.
pub mod engine;

/// Root configuration type; use `Config::default()` or deserialize it.
pub use crate::config::{Config, LogConfig};
/// Fatal error taxonomy and its result alias.
pub use crate::common::{CoreError, CoreResult};
/// The retired operation record and its small enums.
pub use crate::common::{CfType, MemType, Op, OpType};
/// Per-core analysis statistics, returned by [`H2pCore::stats`].
pub use crate::stats::CoreStats;
/// Top-level analysis core; owns every modeled core's disjoint state.
pub use crate::engine::H2pCore;

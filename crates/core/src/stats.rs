//! Per-core H2P analysis statistics.
//!
//! Not part of the core's correctness contract — persisted state is limited
//! to the caches and buffers themselves — but tracked the way every sibling
//! subsystem in this codebase tracks its own counters, for observability
//! through the Lookup API.

/// Counters describing one core's H2P analysis activity since the last reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreStats {
    /// Number of ops retired through this core.
    pub ops_retired: u64,
    /// Number of retired branches (HBT updates).
    pub branches_retired: u64,
    /// Number of distinct retirements currently classified hard-to-predict.
    pub h2p_retirements: u64,
    /// Number of times the Backward-Walk Engine was armed.
    pub walks_armed: u64,
    /// Number of times the Backward-Walk Engine completed a walk.
    pub walks_completed: u64,
    /// Number of DCC writes.
    pub dcc_writes: u64,
    /// Number of BCC block merges (non-empty blocks).
    pub bcc_merges: u64,
    /// Number of blocks recorded as empty in the EBTS.
    pub ebts_empty_blocks: u64,
    /// Number of OOPR records written (H2P ops evicted from the RRB).
    pub oopr_records: u64,
    /// Number of RRB pushes dropped because the engine was walking.
    pub rrb_pushes_dropped: u64,
    /// Number of maintenance sweeps run.
    pub maintenance_sweeps: u64,
}

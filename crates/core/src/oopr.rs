//! On/Off-Path Recorder (OOPR) — on eviction of an H2P op from the RRB,
//! snapshots the surrounding trace into a direct-mapped cache so the context
//! leading up to that branch isn't lost.
//!
//! Grounded on `src/on_off_path_cache.c`'s `record_on_off_path`: it walks the
//! fill buffer forward from `head` (the oldest surviving entry, since the
//! evicted op has already been logically removed) and copies up to
//! `MAX_ON_OFF_PATH_LENGTH` ops into the path.

use tracing::debug;

use crate::common::Op;

/// One OOPR entry: the trace leading up to an evicted H2P branch.
#[derive(Debug, Clone, Default)]
pub struct OnOffPathEntry {
    /// PC of the evicted H2P branch this entry anchors on.
    pub h2p_branch_pc: u64,
    /// `op_num` of the evicted H2P branch.
    pub h2p_branch_op_num: u64,
    /// Cycle at which the evicted H2P branch retired, as stamped by the
    /// caller at `retire()` time. The core does not model execution timing
    /// itself; this is the one piece of timing data the surrounding pipeline
    /// naturally has at retirement, carried alongside the path the way
    /// `on_off_path_cache.c`'s `Path_Op_Info` carries retirement timestamps.
    pub retire_cycle: u64,
    /// The recorded path, oldest-first, truncated to the configured maximum.
    pub path: Vec<Op>,
}

impl OnOffPathEntry {
    /// Number of ops recorded in this entry's path.
    #[must_use]
    pub fn path_len(&self) -> usize {
        self.path.len()
    }
}

/// Direct-mapped cache of on/off-path traces, one per evicted H2P branch PC.
#[derive(Debug)]
pub struct OnOffPathCache {
    slots: Vec<Option<OnOffPathEntry>>,
    max_path_length: usize,
}

impl OnOffPathCache {
    /// Creates an empty OOPR cache with `size` slots.
    #[must_use]
    pub fn new(size: usize, max_path_length: usize) -> Self {
        Self {
            slots: vec![None; size],
            max_path_length,
        }
    }

    fn index(&self, pc: u64) -> usize {
        (pc % self.slots.len() as u64) as usize
    }

    /// Records the on/off-path trace for an evicted H2P op, given the rest of
    /// the RRB's contents (oldest-first, evicted entry excluded) as they
    /// stood at the moment of eviction — before the op that triggered the
    /// eviction was itself stored — and the cycle at which the evicted op
    /// retired.
    pub fn record(&mut self, evicted_op: &Op, remaining_rrb: &[Op], retire_cycle: u64) {
        let index = self.index(evicted_op.pc);
        let path: Vec<Op> = std::iter::once(evicted_op.clone())
            .chain(remaining_rrb.iter().cloned())
            .take(self.max_path_length)
            .collect();

        debug!(
            pc = evicted_op.pc,
            index,
            path_len = path.len(),
            retire_cycle,
            "OOPR record"
        );

        self.slots[index] = Some(OnOffPathEntry {
            h2p_branch_pc: evicted_op.pc,
            h2p_branch_op_num: evicted_op.op_num,
            retire_cycle,
            path,
        });
    }

    /// Returns the entry for `pc` iff the slot is valid and tag-matched.
    #[must_use]
    pub fn get(&self, pc: u64) -> Option<&OnOffPathEntry> {
        let index = self.index(pc);
        self.slots[index]
            .as_ref()
            .filter(|entry| entry.h2p_branch_pc == pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CfType, MemType, Op, OpType};

    fn make_op(op_num: u64, pc: u64, is_hard: bool) -> Op {
        Op {
            op_num,
            pc,
            op_type: OpType::Alu,
            cf_type: CfType::NotCf,
            mem_type: MemType::None,
            va: 0,
            mem_size: 0,
            srcs: vec![],
            dests: vec![],
            mispredicted: false,
            misfetched: false,
            is_hard,
            has_table_info: true,
            has_inst_info: true,
        }
    }

    #[test]
    fn records_evicted_op_first_then_remaining_path_s6() {
        // Exercises `record`'s own path-assembly logic in isolation, with
        // the evicted op and the rest of the buffer fed in directly. The
        // surrounding engine's retire-to-eviction wiring that produces these
        // arguments for real is covered end-to-end in `engine`'s tests.
        let evicted = make_op(1, 0x900, true);
        let remaining = vec![make_op(2, 0x904, false), make_op(3, 0x908, false), make_op(4, 0x90C, false)];

        let mut oopr = OnOffPathCache::new(1024, 256);
        oopr.record(&evicted, &remaining, 42);

        let entry = oopr.get(0x900).unwrap();
        assert_eq!(entry.path_len(), 4);
        assert_eq!(entry.path[0].op_num, 1);
        assert_eq!(entry.h2p_branch_op_num, 1);
        assert_eq!(entry.retire_cycle, 42);
    }

    #[test]
    fn path_truncates_at_max_length() {
        let evicted = make_op(0, 0x100, true);
        let remaining: Vec<Op> = (1..10).map(|i| make_op(i, 0x100 + i, false)).collect();
        let mut oopr = OnOffPathCache::new(4, 3);
        oopr.record(&evicted, &remaining, 7);
        let entry = oopr.get(0x100).unwrap();
        assert_eq!(entry.path_len(), 3);
    }

    #[test]
    fn miss_on_tag_mismatch() {
        let oopr = OnOffPathCache::new(4, 64);
        assert!(oopr.get(0x42).is_none());
    }
}

//! Dependency-Chain Cache (DCC) — direct-mapped cache of full per-H2P-branch
//! backward slices, keyed on the triggering branch's PC.
//!
//! Structurally similar to [`crate::hbt`]'s direct-mapped tag/entry indexing,
//! but here every write unconditionally overwrites the entry (no
//! aliasing-skip behavior — a DCC slot belongs to whichever H2P branch last
//! retired at that index).

use tracing::debug;

use crate::common::Op;

/// One DCC entry: a contiguous backward slice ending at the trigger.
#[derive(Debug, Clone, Default)]
pub struct DependencyChainEntry {
    /// PC of the H2P branch this entry was computed for.
    pub tag_pc: u64,
    /// `op_num` of the triggering H2P branch.
    pub anchor_op_num: u64,
    /// The slice, in program order, truncated to the configured maximum length.
    pub chain: Vec<Op>,
}

impl DependencyChainEntry {
    /// Number of ops recorded in this entry.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

/// Direct-mapped cache of full dependency chains, one per H2P branch PC.
#[derive(Debug)]
pub struct DependencyChainCache {
    slots: Vec<Option<DependencyChainEntry>>,
    max_chain_length: usize,
}

impl DependencyChainCache {
    /// Creates an empty DCC with `size` slots.
    #[must_use]
    pub fn new(size: usize, max_chain_length: usize) -> Self {
        Self {
            slots: vec![None; size],
            max_chain_length,
        }
    }

    fn index(&self, pc: u64) -> usize {
        (pc % self.slots.len() as u64) as usize
    }

    /// Writes a slice for `trigger` over `ops[first_dep..=trigger_idx]`,
    /// keeping only ops marked dependent, in program order, up to
    /// `max_chain_length`.
    pub fn write(
        &mut self,
        trigger: &Op,
        ops: &[Op],
        is_data_dependent: &[bool],
        first_dep: usize,
        trigger_idx: usize,
    ) {
        let mut chain = Vec::new();
        for i in first_dep..=trigger_idx {
            if is_data_dependent[i] {
                if chain.len() >= self.max_chain_length {
                    break;
                }
                chain.push(ops[i].clone());
            }
        }

        let index = self.index(trigger.pc);
        debug!(
            pc = trigger.pc,
            index,
            chain_len = chain.len(),
            "DCC write"
        );
        self.slots[index] = Some(DependencyChainEntry {
            tag_pc: trigger.pc,
            anchor_op_num: trigger.op_num,
            chain,
        });
    }

    /// Returns the entry for `pc` iff the slot is valid and tag-matched.
    #[must_use]
    pub fn get(&self, pc: u64) -> Option<&DependencyChainEntry> {
        let index = self.index(pc);
        self.slots[index]
            .as_ref()
            .filter(|entry| entry.tag_pc == pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bse::extract_slice;
    use crate::common::{CfType, MemType, Op, OpType};

    fn alu(op_num: u64, pc: u64, srcs: Vec<u32>, dests: Vec<u32>) -> Op {
        Op {
            op_num,
            pc,
            op_type: OpType::Alu,
            cf_type: CfType::NotCf,
            mem_type: MemType::None,
            va: 0,
            mem_size: 0,
            srcs,
            dests,
            mispredicted: false,
            misfetched: false,
            is_hard: false,
            has_table_info: true,
            has_inst_info: true,
        }
    }

    fn branch(op_num: u64, pc: u64, srcs: Vec<u32>) -> Op {
        Op {
            cf_type: CfType::ConditionalBranch,
            is_hard: true,
            ..alu(op_num, pc, srcs, vec![])
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let ops = vec![
            alu(0, 0x2000, vec![2], vec![1]),
            alu(1, 0x2004, vec![1], vec![3]),
            branch(2, 0x2008, vec![3]),
        ];
        let slice = extract_slice(&ops, 16).unwrap();
        let mut dcc = DependencyChainCache::new(1024, 64);
        dcc.write(
            &ops[slice.trigger_idx],
            &ops,
            &slice.is_data_dependent,
            slice.first_dep,
            slice.trigger_idx,
        );

        let entry = dcc.get(0x2008).unwrap();
        assert_eq!(entry.anchor_op_num, 2);
        assert_eq!(
            entry.chain.iter().map(|o| o.op_num).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn miss_on_tag_mismatch() {
        let dcc = DependencyChainCache::new(4, 64);
        assert!(dcc.get(0x100).is_none());
    }

    #[test]
    fn writes_are_unconditional_overwrites() {
        let ops_a = vec![branch(0, 0x1000, vec![])];
        let slice_a = extract_slice(&ops_a, 16).unwrap();
        let mut dcc = DependencyChainCache::new(1, 64);
        dcc.write(
            &ops_a[slice_a.trigger_idx],
            &ops_a,
            &slice_a.is_data_dependent,
            slice_a.first_dep,
            slice_a.trigger_idx,
        );
        assert!(dcc.get(0x1000).is_some());

        // A different PC aliasing the same (single) slot overwrites unconditionally.
        let ops_b = vec![branch(1, 0x2000, vec![])];
        let slice_b = extract_slice(&ops_b, 16).unwrap();
        dcc.write(
            &ops_b[slice_b.trigger_idx],
            &ops_b,
            &slice_b.is_data_dependent,
            slice_b.first_dep,
            slice_b.trigger_idx,
        );
        assert!(dcc.get(0x1000).is_none());
        assert!(dcc.get(0x2000).is_some());
    }

    #[test]
    fn chain_truncates_at_max_length() {
        let mut ops = Vec::new();
        // Linear def-use chain ending right before the trigger: op9 defines r1
        // (consumed by the branch) and needs r2, which op8 defines, and so on
        // down to op0 (which needs the never-defined r11, so first_dep = 0).
        for i in 0..10u32 {
            ops.push(alu(
                u64::from(i),
                0x3000 + u64::from(i),
                vec![10 - i + 1],
                vec![10 - i],
            ));
        }
        ops.push(branch(10, 0x3100, vec![1]));

        let slice = extract_slice(&ops, 16).unwrap();
        let mut dcc = DependencyChainCache::new(4, 3);
        dcc.write(
            &ops[slice.trigger_idx],
            &ops,
            &slice.is_data_dependent,
            slice.first_dep,
            slice.trigger_idx,
        );
        let entry = dcc.get(0x3100).unwrap();
        assert_eq!(entry.chain_len(), 3);
    }
}

//! Block-Aligned Chain Cache (BCC) and Empty-Block Tag Store (EBTS).
//!
//! The BCC caches slice fragments aligned to basic blocks, merging
//! dependency masks by OR across every trigger that walks through a shared
//! producer block. The EBTS is a negative cache: it remembers which blocks
//! were evaluated and contributed nothing, so a consumer never has to
//! re-derive that a block is irrelevant.

use tracing::debug;

use crate::common::Op;

/// One BCC entry: a basic block's accumulated dependency mask and the
/// rebuilt chain of ops it implies.
#[derive(Debug, Clone, Default)]
pub struct BlockChainEntry {
    /// Starting PC of the basic block.
    pub tag_pc: u64,
    /// `op_num` of the block's first op, set only when the entry transitions
    /// from an empty mask to a non-empty one.
    pub anchor_op_num: u64,
    /// Accumulated (OR-merged) dependency bitmask; bit `j` means the `j`-th
    /// op of the block's original sequence is part of some slice.
    pub dependency_mask: u64,
    /// Total number of ops observed in this block across all writes (≤ 64).
    pub total_ops_in_block: usize,
    /// The ops selected by `dependency_mask`, rebuilt in block order.
    pub chain: Vec<Op>,
}

impl BlockChainEntry {
    /// Number of ops in the rebuilt chain — kept equal to
    /// `dependency_mask.count_ones()` by construction.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

/// Direct-mapped cache of block-aligned slice fragments.
#[derive(Debug)]
pub struct BlockChainCache {
    slots: Vec<Option<BlockChainEntry>>,
    max_chain_length: usize,
}

/// Negative cache recording basic blocks that contributed nothing to any
/// slice that walked through them.
#[derive(Debug)]
pub struct EmptyBlockTagStore {
    slots: Vec<Option<u64>>,
}

impl BlockChainCache {
    /// Creates an empty BCC with `size` slots.
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

    /// Number of slots currently holding a valid entry.
    #[must_use]
    pub fn len_valid(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Merges a newly computed block's dependency mask into the cache.
    ///
    /// `block_ops` are the ops of the block in original sequence order;
    /// `new_mask` has bit `j` set iff `block_ops[j]` is dependent. On a tag
    /// hit, the old mask is ORed in; on a miss or collision, the entry starts
    /// fresh.
    pub fn merge_block(&mut self, block_start_pc: u64, block_ops: &[Op], new_mask: u64) {
        let index = self.index(block_start_pc);
        let old_mask = match &self.slots[index] {
            Some(entry) if entry.tag_pc == block_start_pc => entry.dependency_mask,
            _ => 0,
        };

        let merged_mask = old_mask | new_mask;
        let anchor_op_num = if old_mask == 0 {
            block_ops.first().map_or(0, |op| op.op_num)
        } else {
            self.slots[index]
                .as_ref()
                .map_or(0, |entry| entry.anchor_op_num)
        };

        let mut chain = Vec::new();
        for (j, op) in block_ops.iter().enumerate() {
            if merged_mask & (1u64 << j) != 0 {
                if chain.len() >= self.max_chain_length {
                    break;
                }
                chain.push(op.clone());
            }
        }

        debug!(
            block_start_pc,
            index,
            mask = merged_mask,
            chain_len = chain.len(),
            "BCC merge"
        );

        self.slots[index] = Some(BlockChainEntry {
            tag_pc: block_start_pc,
            anchor_op_num,
            dependency_mask: merged_mask,
            total_ops_in_block: block_ops.len(),
            chain,
        });
    }

    /// Returns the entry for `pc` iff the slot is valid and tag-matched.
    #[must_use]
    pub fn get(&self, pc: u64) -> Option<&BlockChainEntry> {
        let index = self.index(pc);
        self.slots[index]
            .as_ref()
            .filter(|entry| entry.tag_pc == pc)
    }

    /// Clears every valid entry's mask and chain (the tag is left in place so
    /// a subsequent writer merges from zero again).
    pub fn clear_masks(&mut self) {
        for slot in &mut self.slots {
            if let Some(entry) = slot {
                entry.dependency_mask = 0;
                entry.chain.clear();
            }
        }
    }
}

impl EmptyBlockTagStore {
    /// Creates an empty EBTS with `size` slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    fn index(&self, pc: u64) -> usize {
        (pc % self.slots.len() as u64) as usize
    }

    /// Number of slots currently holding a valid entry.
    #[must_use]
    pub fn len_valid(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Records that the block starting at `pc` contributed nothing.
    pub fn mark_empty(&mut self, block_start_pc: u64) {
        let index = self.index(block_start_pc);
        self.slots[index] = Some(block_start_pc);
    }

    /// Returns whether the block starting at `pc` is tag-matched in the EBTS.
    #[must_use]
    pub fn is_empty_block(&self, pc: u64) -> bool {
        let index = self.index(pc);
        self.slots[index] == Some(pc)
    }

    /// Clears every entry entirely.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

/// One segmented basic block over a backward-walk snapshot: its starting PC
/// and the half-open `[start, end)` index range into the snapshot.
#[derive(Debug, Clone, Copy)]
struct Block {
    start_pc: u64,
    start_idx: usize,
    end_idx: usize,
}

/// Segments `ops[first_dep..=trigger_idx]` into basic blocks, a block ending
/// at any terminator (`cf_type != NotCf`) or at `trigger_idx` itself.
fn segment_blocks(ops: &[Op], first_dep: usize, trigger_idx: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current_start = first_dep;
    for i in first_dep..=trigger_idx {
        if ops[i].is_block_terminator() || i == trigger_idx {
            blocks.push(Block {
                start_pc: ops[current_start].pc,
                start_idx: current_start,
                end_idx: i + 1,
            });
            current_start = i + 1;
        }
    }
    blocks
}

/// Writes block-aligned slice fragments for the range `[first_dep,
/// trigger_idx]` of `ops`, splitting into basic blocks and merging each
/// block's dependency mask into the BCC, or marking it empty in the EBTS.
///
/// Blocks longer than 64 ops are clamped to the mask width: only the first
/// 64 ops of an oversized block are represented in the mask, and
/// `total_ops_in_block` is clamped to 64.
pub fn write_block_chains(
    bcc: &mut BlockChainCache,
    ebts: &mut EmptyBlockTagStore,
    ops: &[Op],
    is_data_dependent: &[bool],
    first_dep: usize,
    trigger_idx: usize,
) {
    for block in segment_blocks(ops, first_dep, trigger_idx) {
        let full_len = block.end_idx - block.start_idx;
        let clamped_len = full_len.min(64);

        let mut new_mask = 0u64;
        for j in 0..clamped_len {
            if is_data_dependent[block.start_idx + j] {
                new_mask |= 1u64 << j;
            }
        }

        if new_mask == 0 {
            ebts.mark_empty(block.start_pc);
        } else {
            let block_ops = &ops[block.start_idx..block.start_idx + clamped_len];
            bcc.merge_block(block.start_pc, block_ops, new_mask);
        }
    }
}

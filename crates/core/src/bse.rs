//! Backward Slice Extractor (BSE) — from a trigger op, computes the boolean
//! mask `is_data_dependent[i]` over the retirement-window snapshot.
//!
//! Register and memory def-to-use are resolved by *consumption*: the def
//! that matches a live-in removes it from the [`crate::liws::LiveInSet`], so
//! the latest def (walking in reverse chronological order) wins.
//! Store-to-load aliasing is modeled by exact virtual-address equality only.

use tracing::trace;

use crate::common::{MemType, Op};
use crate::liws::LiveInSet;

/// Result of a backward walk over a snapshot.
#[derive(Debug, Clone)]
pub struct SliceResult {
    /// Index into `ops` of the trigger (the newest op with `is_hard == true`).
    pub trigger_idx: usize,
    /// Index of the oldest op the slice depends on; ops before this index
    /// are never consulted.
    pub first_dep: usize,
    /// Per-index membership in the slice, sized to `ops.len()`.
    pub is_data_dependent: Vec<bool>,
}

/// Locates the trigger op (the newest op with `is_hard == true`) and computes
/// its backward data-dependence slice over `ops` (oldest-first, program
/// order). Returns `None` if no op in the window is H2P.
#[must_use]
pub fn extract_slice(ops: &[Op], max_mem_live_ins: usize) -> Option<SliceResult> {
    let trigger_idx = ops.iter().rposition(|op| op.is_hard)?;
    let trigger = &ops[trigger_idx];

    let mut is_data_dependent = vec![false; ops.len()];
    is_data_dependent[trigger_idx] = true;

    let mut liws = LiveInSet::new(max_mem_live_ins);
    liws.clear();
    for &src in &trigger.srcs {
        liws.add_reg(src);
    }
    if trigger.mem_type == MemType::Load {
        liws.add_addr(trigger.va);
    }

    let mut first_dep = trigger_idx;

    for idx in (0..trigger_idx).rev() {
        let cur = &ops[idx];
        if !cur.is_well_formed() {
            trace!(op_num = cur.op_num, "BSE: skipping malformed op");
            continue;
        }

        let mut depends = false;
        for &dest in &cur.dests {
            if liws.remove_reg(dest) {
                depends = true;
            }
        }
        if cur.mem_type == MemType::Store && liws.remove_addr(cur.va) {
            depends = true;
        }

        if depends {
            is_data_dependent[idx] = true;
            first_dep = idx;
            for &src in &cur.srcs {
                liws.add_reg(src);
            }
            if cur.mem_type == MemType::Load {
                liws.add_addr(cur.va);
            }
        }
    }

    Some(SliceResult {
        trigger_idx,
        first_dep,
        is_data_dependent,
    })
}

//! Backward-Walk Engine (BWE) — the latency-modeled state machine that
//! snapshots the RRB when an H2P branch retires and, after a fixed cycle
//! budget, drives BSE → DCC → BCC/EBTS over that snapshot.
//!
//! The countdown models the simulated hardware cost of the walk; no real
//! suspension occurs — `tick` advances the countdown exactly once per
//! simulator cycle.

use tracing::debug;

use crate::common::Op;

/// State of the Backward-Walk Engine for one core.
#[derive(Debug, Clone)]
pub enum BweState {
    /// No walk in progress; the RRB may be pushed to.
    Idle,
    /// A walk is in progress; the RRB is frozen until the countdown expires.
    Walking {
        /// Cycles remaining before the walk executes.
        cycles_remaining: u32,
        /// Deep-cloned snapshot of the RRB at arm time.
        snapshot: Vec<Op>,
    },
}

/// Per-core Backward-Walk Engine state machine.
#[derive(Debug)]
pub struct BackwardWalkEngine {
    state: BweState,
    walk_latency: u32,
}

impl BackwardWalkEngine {
    /// Creates a new, idle engine with the given countdown latency.
    #[must_use]
    pub fn new(walk_latency: u32) -> Self {
        Self {
            state: BweState::Idle,
            walk_latency,
        }
    }

    /// Whether the engine is currently `Walking` (and thus the RRB is frozen).
    #[must_use]
    pub const fn is_walking(&self) -> bool {
        matches!(self.state, BweState::Walking { .. })
    }

    /// Arms the engine with a snapshot, transitioning `Idle -> Walking`.
    ///
    /// Arming only happens after a successful push while the engine was
    /// `Idle`, so a caller that respects that precondition never calls this
    /// while `Walking`.
    pub fn arm(&mut self, snapshot: Vec<Op>) {
        debug!(snapshot_len = snapshot.len(), "BWE armed");
        self.state = BweState::Walking {
            cycles_remaining: self.walk_latency,
            snapshot,
        };
    }

    /// Advances the countdown by one cycle. Returns the snapshot to execute
    /// the walk over, if the countdown has just reached zero; the caller is
    /// responsible for running BSE/DCC/BCC over it and then resetting the RRB
    /// and calling [`Self::complete`].
    pub fn tick(&mut self) -> Option<Vec<Op>> {
        match &mut self.state {
            BweState::Idle => None,
            BweState::Walking {
                cycles_remaining,
                snapshot,
            } => {
                if *cycles_remaining == 0 {
                    Some(std::mem::take(snapshot))
                } else {
                    *cycles_remaining -= 1;
                    None
                }
            }
        }
    }

    /// Returns the engine to `Idle` after a completed walk.
    pub fn complete(&mut self) {
        self.state = BweState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CfType, MemType, Op, OpType};

    fn make_op(op_num: u64) -> Op {
        Op {
            op_num,
            pc: 0,
            op_type: OpType::Alu,
            cf_type: CfType::NotCf,
            mem_type: MemType::None,
            va: 0,
            mem_size: 0,
            srcs: vec![],
            dests: vec![],
            mispredicted: false,
            misfetched: false,
            is_hard: false,
            has_table_info: true,
            has_inst_info: true,
        }
    }

    #[test]
    fn zero_latency_completes_on_first_tick() {
        let mut bwe = BackwardWalkEngine::new(0);
        bwe.arm(vec![make_op(1)]);
        assert!(bwe.is_walking());
        let result = bwe.tick();
        assert!(result.is_some());
        assert_eq!(result.unwrap()[0].op_num, 1);
        bwe.complete();
        assert!(!bwe.is_walking());
    }

    #[test]
    fn nonzero_latency_counts_down() {
        let mut bwe = BackwardWalkEngine::new(2);
        bwe.arm(vec![make_op(1)]);
        assert!(bwe.tick().is_none());
        assert!(bwe.tick().is_none());
        assert!(bwe.tick().is_some());
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut bwe = BackwardWalkEngine::new(5);
        assert!(bwe.tick().is_none());
    }
}

//! Hard Branch Table (HBT) — per-PC saturating counter that marks branches
//! as hard-to-predict (H2P) under direct-mapped aliasing.
//!
//! Grounded on `src/bp/hbt.c` in the original source: a branch's counter only
//! accumulates on mispredicts, and slowly leaks (`-HBT_DECAY_AMOUNT` every
//! `HBT_DECAY_PERIOD` *counted* branch retirements) so that only branches
//! whose mispredict density is high enough to outrun the leak reach
//! saturation and are classified H2P.

use tracing::{debug, trace};

use crate::common::Op;
use crate::config::Config;

/// One direct-mapped HBT slot: the owning tag and its saturating counter.
#[derive(Debug, Clone, Copy, Default)]
struct HbtEntry {
    tag: u64,
    counter: u32,
}

/// Per-core Hard Branch Table.
///
/// Indexing is direct-mapped (`index = pc mod hbt_size`, `tag = pc div
/// hbt_size`); collisions with a still-occupied entry are skipped rather than
/// evicted, so a currently-hard branch cannot be bumped out by an aliasing
/// cold one.
#[derive(Debug)]
pub struct HardBranchTable {
    entries: Vec<HbtEntry>,
    ctr_max: u32,
    decay_period: u64,
    decay_amount: u32,
    /// Count of retirements that were actually applied to an entry (i.e. not
    /// skipped due to tag collision). Only this counter drives decay: a PC
    /// that never gets to claim its entry should not age out its occupant.
    retired_branch_count: u64,
}

impl HardBranchTable {
    /// Creates a new, zeroed HBT sized from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            entries: vec![HbtEntry::default(); config.hbt_size],
            ctr_max: config.hbt_ctr_max(),
            decay_period: config.hbt_decay_period,
            decay_amount: config.hbt_decay_amount,
            retired_branch_count: 0,
        }
    }

    fn index_and_tag(&self, pc: u64) -> (usize, u64) {
        let size = self.entries.len() as u64;
        ((pc % size) as usize, pc / size)
    }

    /// Updates HBT state for a retired branch. `mispred` should be
    /// `op.mispredicted || op.misfetched`.
    pub fn update(&mut self, pc: u64, mispred: bool) {
        let (index, tag) = self.index_and_tag(pc);
        let entry = &mut self.entries[index];

        if entry.tag != tag {
            if entry.counter == 0 {
                entry.tag = tag;
                entry.counter = 0;
            } else {
                trace!(
                    pc,
                    index, tag, owner_tag = entry.tag, "HBT update skipped: index occupied"
                );
                return;
            }
        }

        if mispred {
            entry.counter = (entry.counter + 1).min(self.ctr_max);
        }

        self.retired_branch_count += 1;
        if self.retired_branch_count % self.decay_period == 0 {
            self.decay();
        }
    }

    /// Convenience wrapper over [`Self::update`] taking a full retired branch `Op`.
    pub fn update_from_op(&mut self, op: &Op) {
        self.update(op.pc, op.mispredicted || op.misfetched);
    }

    fn decay(&mut self) {
        debug!(
            retired_branch_count = self.retired_branch_count,
            "HBT periodic decay"
        );
        for entry in &mut self.entries {
            entry.counter = entry.counter.saturating_sub(self.decay_amount);
        }
    }

    /// Returns whether the branch at `pc` is currently classified hard-to-predict.
    #[must_use]
    pub fn is_hard(&self, pc: u64) -> bool {
        let (index, tag) = self.index_and_tag(pc);
        let entry = &self.entries[index];
        entry.tag == tag && entry.counter == self.ctr_max
    }

    /// Returns the counter value for `pc`, or `0` if the entry is tagged to a
    /// different PC.
    #[must_use]
    pub fn counter(&self, pc: u64) -> u32 {
        let (index, tag) = self.index_and_tag(pc);
        let entry = &self.entries[index];
        if entry.tag == tag {
            entry.counter
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_rrb(rrb_size: usize) -> Config {
        Config {
            rrb_size,
            ..Config::default()
        }
    }

    #[test]
    fn saturates_on_repeated_mispredicts() {
        let mut hbt = HardBranchTable::new(&config_with_rrb(8));
        for _ in 0..31 {
            hbt.update(0x100, true);
        }
        assert_eq!(hbt.counter(0x100), 31);
        assert!(hbt.is_hard(0x100));
    }

    #[test]
    fn correct_predictions_do_not_increment() {
        let mut hbt = HardBranchTable::new(&config_with_rrb(8));
        hbt.update(0x100, true);
        hbt.update(0x100, false);
        hbt.update(0x100, false);
        assert_eq!(hbt.counter(0x100), 1);
    }

    #[test]
    fn decay_fires_every_thousand_counted_retirements() {
        let mut hbt = HardBranchTable::new(&config_with_rrb(8));
        for _ in 0..31 {
            hbt.update(0x100, true);
        }
        assert_eq!(hbt.counter(0x100), 31);

        // A different PC, decaying never to hard, drives the global counter.
        for _ in 0..1000 {
            hbt.update(0x200, false);
        }
        assert_eq!(hbt.counter(0x100), 16);
    }

    #[test]
    fn aliasing_skips_occupied_entries_without_counting() {
        let config = Config {
            hbt_size: 1,
            ..config_with_rrb(8)
        };
        let mut hbt = HardBranchTable::new(&config);
        hbt.update(0x000, true); // claims index 0, tag 0
        assert_eq!(hbt.counter(0x000), 1);

        // 0x1 aliases to the same index with a different tag; entry is occupied
        // (counter != 0), so the update is skipped entirely.
        hbt.update(0x001, true);
        assert_eq!(hbt.counter(0x000), 1);
        assert_eq!(hbt.counter(0x001), 0);
    }

    #[test]
    fn zero_counter_entries_are_reclaimed_by_new_tag() {
        let config = Config {
            hbt_size: 1,
            ..config_with_rrb(8)
        };
        let mut hbt = HardBranchTable::new(&config);
        hbt.update(0x000, false); // counter stays 0, tag becomes 0
        hbt.update(0x001, true); // counter is 0, so tag 1 reclaims it
        assert_eq!(hbt.counter(0x001), 1);
        assert_eq!(hbt.counter(0x000), 0);
    }
}

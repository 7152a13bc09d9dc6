//! The Lookup API and retirement driver: per-core context aggregation and
//! the sequencing that wires HBT, RRB, LIWS/BSE, DCC, BCC/EBTS, BWE and OOPR
//! together into the control flow a surrounding pipeline drives.
//!
//! One core's subsystems are eagerly allocated together in [`CoreState`] at
//! construction time, rather than built up piecemeal the way the original's
//! `calloc`-per-subsystem globals were. `hbt_init`/`rrb_init`/
//! `init_dep_chain_caches`/`init_on_off_path_cache` are kept as the external
//! entry points named by the surrounding pipeline's setup sequence, but here
//! they are idempotent reset hooks over an already-owned [`CoreState`]
//! rather than lazy allocators.

use tracing::{debug, info, trace};

use crate::bcc::{self, BlockChainCache, BlockChainEntry, EmptyBlockTagStore};
use crate::bse;
use crate::bwe::BackwardWalkEngine;
use crate::common::{CoreError, CoreResult, Op};
use crate::config::Config;
use crate::dcc::{DependencyChainCache, DependencyChainEntry};
use crate::hbt::HardBranchTable;
use crate::maintenance;
use crate::oopr::{OnOffPathCache, OnOffPathEntry};
use crate::rrb::{PushOutcome, RetirementRingBuffer};
use crate::stats::CoreStats;

/// One modeled CPU core's disjoint H2P analysis state. Never shared with any
/// other core.
#[derive(Debug)]
struct CoreState {
    hbt: HardBranchTable,
    rrb: RetirementRingBuffer,
    bwe: BackwardWalkEngine,
    dcc: DependencyChainCache,
    bcc: BlockChainCache,
    ebts: EmptyBlockTagStore,
    oopr: OnOffPathCache,
    stats: CoreStats,
}

impl CoreState {
    fn new(config: &Config, name: impl Into<String>) -> Self {
        Self {
            hbt: HardBranchTable::new(config),
            rrb: RetirementRingBuffer::new(config.rrb_size, name),
            bwe: BackwardWalkEngine::new(config.walk_latency),
            dcc: DependencyChainCache::new(config.dcc_size, config.max_chain_length),
            bcc: BlockChainCache::new(config.bcc_size, config.max_chain_length),
            ebts: EmptyBlockTagStore::new(config.ebts_size),
            oopr: OnOffPathCache::new(config.oopc_size, config.max_on_off_path_length),
            stats: CoreStats::default(),
        }
    }
}

/// The H2P branch analysis core: owns every modeled CPU core's disjoint
/// state and exposes the retirement driver and Lookup API.
#[derive(Debug)]
pub struct H2pCore {
    config: Config,
    cores: Vec<CoreState>,
    max_mem_live_ins: usize,
}

impl H2pCore {
    /// Validates `config` and allocates per-core state for every core up to
    /// `config.num_cores`, each named `core{n}`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: Config) -> CoreResult<Self> {
        config.validate()?;
        let cores = (0..config.num_cores)
            .map(|id| CoreState::new(&config, format!("core{id}")))
            .collect();
        let max_mem_live_ins = config.max_mem_live_ins;
        Ok(Self {
            config,
            cores,
            max_mem_live_ins,
        })
    }

    fn core(&self, core: usize) -> CoreResult<&CoreState> {
        self.cores.get(core).ok_or(CoreError::CoreIdOutOfBounds {
            core,
            num_cores: self.cores.len(),
        })
    }

    fn core_mut(&mut self, core: usize) -> CoreResult<&mut CoreState> {
        let num_cores = self.cores.len();
        self.cores
            .get_mut(core)
            .ok_or(CoreError::CoreIdOutOfBounds { core, num_cores })
    }

    /// Zeros the Hard Branch Table for every core, as if freshly constructed.
    pub fn hbt_init(&mut self) {
        info!("hbt_init: zeroing HBT for all cores");
        for (id, state) in self.cores.iter_mut().enumerate() {
            state.hbt = HardBranchTable::new(&self.config);
            trace!(core = id, "HBT zeroed");
        }
    }

    /// Re-creates the Retirement Ring Buffer and On/Off-Path cache for
    /// `core`, labeling the RRB with `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn rrb_init(&mut self, core: usize, name: impl Into<String>) -> CoreResult<()> {
        let config = self.config.clone();
        let state = self.core_mut(core)?;
        state.rrb = RetirementRingBuffer::new(config.rrb_size, name);
        state.oopr = OnOffPathCache::new(config.oopc_size, config.max_on_off_path_length);
        Ok(())
    }

    /// Re-creates the Dependency-Chain Cache, Block-Aligned Chain Cache,
    /// Empty-Block Tag Store, and Backward-Walk Engine for `core`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn init_dep_chain_caches(&mut self, core: usize) -> CoreResult<()> {
        let config = self.config.clone();
        let state = self.core_mut(core)?;
        state.dcc = DependencyChainCache::new(config.dcc_size, config.max_chain_length);
        state.bcc = BlockChainCache::new(config.bcc_size, config.max_chain_length);
        state.ebts = EmptyBlockTagStore::new(config.ebts_size);
        state.bwe = BackwardWalkEngine::new(config.walk_latency);
        Ok(())
    }

    /// Re-creates the On/Off-Path cache for `core`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn init_on_off_path_cache(&mut self, core: usize) -> CoreResult<()> {
        let config = self.config.clone();
        let state = self.core_mut(core)?;
        state.oopr = OnOffPathCache::new(config.oopc_size, config.max_on_off_path_length);
        Ok(())
    }

    /// Retires `op` on `core`: updates the HBT if `op` is a branch, pushes
    /// `op` onto the RRB (dropped if the BWE is walking), arms the BWE if the
    /// push succeeded and the pushed op is H2P and the engine was idle, and
    /// records an evicted H2P op into the OOPR before returning.
    ///
    /// `retire_cycle` is stamped onto any OOPR entry produced by this call,
    /// the way the surrounding pipeline's retirement stage would know the
    /// current cycle without the core itself tracking execution timing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn retire(&mut self, core: usize, op: Op, retire_cycle: u64) -> CoreResult<()> {
        let state = self.core_mut(core)?;
        state.stats.ops_retired += 1;

        if op.cf_type.is_control_flow() {
            state.hbt.update_from_op(&op);
            state.stats.branches_retired += 1;
            if op.is_hard {
                state.stats.h2p_retirements += 1;
            }
        }

        let frozen = state.bwe.is_walking();
        let is_hard = op.is_hard;
        let (outcome, evicted, remaining) = state.rrb.push(op, frozen);

        match outcome {
            PushOutcome::DroppedFrozen => {
                state.stats.rrb_pushes_dropped += 1;
            }
            PushOutcome::Appended | PushOutcome::AppendedAfterEviction => {
                if let Some(evicted_op) = evicted {
                    // H2P-ness is a property of the PC's current HBT history,
                    // not a flag frozen onto this op instance back when it
                    // was pushed: a branch can cross into H2P territory from
                    // later retirements at the same PC while this op is
                    // still sitting in the buffer waiting to be evicted.
                    if state.hbt.is_hard(evicted_op.pc) {
                        state.oopr.record(&evicted_op, &remaining, retire_cycle);
                        state.stats.oopr_records += 1;
                    }
                }
                if is_hard && !state.bwe.is_walking() {
                    let snapshot = state.rrb.snapshot();
                    debug!(core, snapshot_len = snapshot.len(), "arming BWE");
                    state.bwe.arm(snapshot);
                    state.stats.walks_armed += 1;
                }
            }
        }

        Ok(())
    }

    /// Advances the Backward-Walk Engine for `core` by one cycle. If the
    /// countdown has just expired, runs the backward slice extractor, writes
    /// the resulting slice into the DCC and BCC/EBTS, then resets the RRB
    /// and returns the engine to idle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn cycle_bwe(&mut self, core: usize) -> CoreResult<()> {
        let max_mem_live_ins = self.max_mem_live_ins;
        let state = self.core_mut(core)?;
        let Some(snapshot) = state.bwe.tick() else {
            return Ok(());
        };

        if let Some(slice) = bse::extract_slice(&snapshot, max_mem_live_ins) {
            let trigger = &snapshot[slice.trigger_idx];
            state.dcc.write(
                trigger,
                &snapshot,
                &slice.is_data_dependent,
                slice.first_dep,
                slice.trigger_idx,
            );
            state.stats.dcc_writes += 1;

            let before_bcc = state.bcc.len_valid();
            let before_ebts = state.ebts.len_valid();
            bcc::write_block_chains(
                &mut state.bcc,
                &mut state.ebts,
                &snapshot,
                &slice.is_data_dependent,
                slice.first_dep,
                slice.trigger_idx,
            );
            state.stats.bcc_merges += state.bcc.len_valid().saturating_sub(before_bcc) as u64;
            state.stats.ebts_empty_blocks +=
                state.ebts.len_valid().saturating_sub(before_ebts) as u64;

            debug!(core, trigger_pc = trigger.pc, "backward walk completed");
        }

        state.rrb.reset();
        state.bwe.complete();
        state.stats.walks_completed += 1;
        Ok(())
    }

    /// Clears `core`'s BCC masks/chains and EBTS entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn periodically_reset_caches(&mut self, core: usize) -> CoreResult<()> {
        let state = self.core_mut(core)?;
        maintenance::periodically_reset_caches(&mut state.bcc, &mut state.ebts);
        state.stats.maintenance_sweeps += 1;
        Ok(())
    }

    /// Returns whether the branch at `pc` is currently classified H2P on `core`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn hbt_is_hard(&self, core: usize, pc: u64) -> CoreResult<bool> {
        Ok(self.core(core)?.hbt.is_hard(pc))
    }

    /// Returns the HBT counter value for `pc` on `core` (`0` on tag miss).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn hbt_get_counter(&self, core: usize, pc: u64) -> CoreResult<u32> {
        Ok(self.core(core)?.hbt.counter(pc))
    }

    /// Returns the cached dependency chain for the H2P branch at `pc` on `core`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn get_dependency_chain(
        &self,
        core: usize,
        pc: u64,
    ) -> CoreResult<Option<&DependencyChainEntry>> {
        Ok(self.core(core)?.dcc.get(pc))
    }

    /// Returns the cached block-aligned chain for the basic block starting
    /// at `pc` on `core`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn get_dependency_chain_block(
        &self,
        core: usize,
        pc: u64,
    ) -> CoreResult<Option<&BlockChainEntry>> {
        Ok(self.core(core)?.bcc.get(pc))
    }

    /// Returns the cached on/off-path trace anchored on the H2P branch at
    /// `pc` on `core`, if one has been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn get_on_off_path(&self, core: usize, pc: u64) -> CoreResult<Option<&OnOffPathEntry>> {
        Ok(self.core(core)?.oopr.get(pc))
    }

    /// Returns whether the block starting at `pc` is tagged empty in `core`'s EBTS.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn ebts_is_empty_block(&self, core: usize, pc: u64) -> CoreResult<bool> {
        Ok(self.core(core)?.ebts.is_empty_block(pc))
    }

    /// Returns a copy of `core`'s accumulated statistics.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoreIdOutOfBounds`] if `core >= num_cores`.
    pub fn stats(&self, core: usize) -> CoreResult<CoreStats> {
        Ok(self.core(core)?.stats)
    }

    /// Number of configured cores.
    #[must_use]
    pub fn num_cores(&self) -> usize {
        self.cores.len()
    }
}

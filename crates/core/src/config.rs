//! Configuration for the H2P branch analysis core.
//!
//! Configuration is supplied as JSON (matching the workspace convention of
//! deserializing a config produced by an external driver) or via
//! [`Config::default`].

use serde::Deserialize;

/// Default configuration constants.
mod defaults {
    /// Number of disjoint per-core instances.
    pub const NUM_CORES: usize = 1;
    /// Retirement Ring Buffer capacity.
    pub const RRB_SIZE: usize = 256;
    /// Hard Branch Table entry count.
    pub const HBT_SIZE: usize = 1024;
    /// HBT saturating counter width in bits; implies `CTR_MAX = 2^K - 1`.
    pub const HBT_CTR_BITS: u32 = 5;
    /// Dependency-Chain Cache entry count.
    pub const DCC_SIZE: usize = 1024;
    /// Block-Aligned Chain Cache entry count.
    pub const BCC_SIZE: usize = 1024;
    /// Empty-Block Tag Store entry count.
    pub const EBTS_SIZE: usize = 256;
    /// On/Off-Path cache entry count.
    pub const OOPC_SIZE: usize = 1024;
    /// Maximum number of ops recorded in a single dependency chain.
    pub const MAX_CHAIN_LENGTH: usize = 64;
    /// Maximum number of ops recorded in a single on/off-path trace.
    pub const MAX_ON_OFF_PATH_LENGTH: usize = 256;
    /// Maximum number of distinct live memory addresses tracked by the LIWS.
    pub const MAX_MEM_LIVE_INS: usize = 16;
    /// Backward-Walk Engine countdown, in cycles.
    pub const WALK_LATENCY: u32 = 20;
    /// Branch retirements between HBT decay sweeps.
    pub const HBT_DECAY_PERIOD: u64 = 1000;
    /// Amount subtracted from every HBT counter at each decay sweep.
    pub const HBT_DECAY_AMOUNT: u32 = 15;
}

/// Root configuration for the H2P core.
///
/// # Examples
///
/// ```
/// use h2p_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.rrb_size, 256);
/// assert_eq!(config.hbt_ctr_max(), 31);
/// ```
///
/// Deserializing from JSON (typical external-driver usage):
///
/// ```
/// use h2p_core::config::Config;
///
/// let json = r#"{
///     "num_cores": 2,
///     "rrb_size": 8,
///     "hbt_size": 1024,
///     "hbt_ctr_bits": 5,
///     "dcc_size": 1024,
///     "bcc_size": 1024,
///     "ebts_size": 256,
///     "oopc_size": 1024,
///     "max_chain_length": 8,
///     "max_on_off_path_length": 256,
///     "max_mem_live_ins": 16,
///     "walk_latency": 0,
///     "hbt_decay_period": 1000,
///     "hbt_decay_amount": 15,
///     "log": { "debug_cycle_start": 0, "debug_cycle_stop": 0, "output_dir": null }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.num_cores, 2);
/// assert_eq!(config.rrb_size, 8);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of disjoint per-core instances.
    #[serde(default = "Config::default_num_cores")]
    pub num_cores: usize,
    /// Capacity of the Retirement Ring Buffer (no power-of-two requirement).
    #[serde(default = "Config::default_rrb_size")]
    pub rrb_size: usize,
    /// Hard Branch Table entry count.
    #[serde(default = "Config::default_hbt_size")]
    pub hbt_size: usize,
    /// HBT saturating counter width, in bits.
    #[serde(default = "Config::default_hbt_ctr_bits")]
    pub hbt_ctr_bits: u32,
    /// Dependency-Chain Cache entry count.
    #[serde(default = "Config::default_dcc_size")]
    pub dcc_size: usize,
    /// Block-Aligned Chain Cache entry count.
    #[serde(default = "Config::default_bcc_size")]
    pub bcc_size: usize,
    /// Empty-Block Tag Store entry count.
    #[serde(default = "Config::default_ebts_size")]
    pub ebts_size: usize,
    /// On/Off-Path cache entry count.
    #[serde(default = "Config::default_oopc_size")]
    pub oopc_size: usize,
    /// Maximum ops recorded in a single dependency chain (DCC and BCC entries).
    #[serde(default = "Config::default_max_chain_length")]
    pub max_chain_length: usize,
    /// Maximum ops recorded in a single on/off-path trace.
    #[serde(default = "Config::default_max_on_off_path_length")]
    pub max_on_off_path_length: usize,
    /// Maximum distinct live memory addresses tracked by the LIWS.
    #[serde(default = "Config::default_max_mem_live_ins")]
    pub max_mem_live_ins: usize,
    /// Backward-Walk Engine countdown, in cycles.
    #[serde(default = "Config::default_walk_latency")]
    pub walk_latency: u32,
    /// Branch retirements between HBT decay sweeps.
    #[serde(default = "Config::default_hbt_decay_period")]
    pub hbt_decay_period: u64,
    /// Amount subtracted from every HBT counter at each decay sweep.
    #[serde(default = "Config::default_hbt_decay_amount")]
    pub hbt_decay_amount: u32,
    /// Debug logging window and sink.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    fn default_num_cores() -> usize {
        defaults::NUM_CORES
    }
    fn default_rrb_size() -> usize {
        defaults::RRB_SIZE
    }
    fn default_hbt_size() -> usize {
        defaults::HBT_SIZE
    }
    fn default_hbt_ctr_bits() -> u32 {
        defaults::HBT_CTR_BITS
    }
    fn default_dcc_size() -> usize {
        defaults::DCC_SIZE
    }
    fn default_bcc_size() -> usize {
        defaults::BCC_SIZE
    }
    fn default_ebts_size() -> usize {
        defaults::EBTS_SIZE
    }
    fn default_oopc_size() -> usize {
        defaults::OOPC_SIZE
    }
    fn default_max_chain_length() -> usize {
        defaults::MAX_CHAIN_LENGTH
    }
    fn default_max_on_off_path_length() -> usize {
        defaults::MAX_ON_OFF_PATH_LENGTH
    }
    fn default_max_mem_live_ins() -> usize {
        defaults::MAX_MEM_LIVE_INS
    }
    fn default_walk_latency() -> u32 {
        defaults::WALK_LATENCY
    }
    fn default_hbt_decay_period() -> u64 {
        defaults::HBT_DECAY_PERIOD
    }
    fn default_hbt_decay_amount() -> u32 {
        defaults::HBT_DECAY_AMOUNT
    }

    /// Maximum value of the HBT saturating counter, derived from `hbt_ctr_bits`.
    #[must_use]
    pub const fn hbt_ctr_max(&self) -> u32 {
        (1u32 << self.hbt_ctr_bits) - 1
    }

    /// Validates size/bound parameters, returning a descriptive error on failure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::CoreError::InvalidConfig`] if any size parameter
    /// that must be positive is zero, or if a bitmask-backed bound (block length,
    /// chain length) exceeds 64 — the hard limit imposed by the 64-bit
    /// `dependency_mask`/`reg_vector` representations.
    pub fn validate(&self) -> Result<(), crate::common::CoreError> {
        use crate::common::CoreError::InvalidConfig;

        if self.num_cores == 0 {
            return Err(InvalidConfig("num_cores must be > 0".to_owned()));
        }
        if self.rrb_size == 0 {
            return Err(InvalidConfig("rrb_size must be > 0".to_owned()));
        }
        if self.hbt_size == 0 {
            return Err(InvalidConfig("hbt_size must be > 0".to_owned()));
        }
        if self.hbt_ctr_bits == 0 || self.hbt_ctr_bits > 32 {
            return Err(InvalidConfig(
                "hbt_ctr_bits must be in 1..=32".to_owned(),
            ));
        }
        if self.dcc_size == 0 || self.bcc_size == 0 || self.ebts_size == 0 || self.oopc_size == 0
        {
            return Err(InvalidConfig(
                "cache sizes (dcc/bcc/ebts/oopc) must be > 0".to_owned(),
            ));
        }
        if self.max_chain_length == 0 || self.max_chain_length > 64 {
            return Err(InvalidConfig(
                "max_chain_length must be in 1..=64 (bounded by the 64-bit dependency mask)"
                    .to_owned(),
            ));
        }
        if self.max_on_off_path_length == 0 {
            return Err(InvalidConfig(
                "max_on_off_path_length must be > 0".to_owned(),
            ));
        }
        if self.max_mem_live_ins == 0 {
            return Err(InvalidConfig("max_mem_live_ins must be > 0".to_owned()));
        }
        if self.hbt_decay_period == 0 {
            return Err(InvalidConfig("hbt_decay_period must be > 0".to_owned()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_cores: defaults::NUM_CORES,
            rrb_size: defaults::RRB_SIZE,
            hbt_size: defaults::HBT_SIZE,
            hbt_ctr_bits: defaults::HBT_CTR_BITS,
            dcc_size: defaults::DCC_SIZE,
            bcc_size: defaults::BCC_SIZE,
            ebts_size: defaults::EBTS_SIZE,
            oopc_size: defaults::OOPC_SIZE,
            max_chain_length: defaults::MAX_CHAIN_LENGTH,
            max_on_off_path_length: defaults::MAX_ON_OFF_PATH_LENGTH,
            max_mem_live_ins: defaults::MAX_MEM_LIVE_INS,
            walk_latency: defaults::WALK_LATENCY,
            hbt_decay_period: defaults::HBT_DECAY_PERIOD,
            hbt_decay_amount: defaults::HBT_DECAY_AMOUNT,
            log: LogConfig::default(),
        }
    }
}

/// Debug logging window and sink, matching the `DEBUG_CYCLE_START`/
/// `DEBUG_CYCLE_STOP`/`OUTPUT_DIR` options of the surrounding pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// First cycle (inclusive) for which windowed debug events are emitted.
    #[serde(default)]
    pub debug_cycle_start: u64,
    /// Last cycle (inclusive) for which windowed debug events are emitted.
    /// A value of `0` (the default) disables the window entirely.
    #[serde(default)]
    pub debug_cycle_stop: u64,
    /// Directory diagnostic log files would be written to, if file-based
    /// logging were enabled. The core itself only emits `tracing` events;
    /// this is surfaced for a driver (e.g. the CLI) to act on.
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl LogConfig {
    /// Whether windowed debug events should be emitted for the given cycle.
    #[must_use]
    pub const fn in_window(&self, cycle: u64) -> bool {
        self.debug_cycle_stop != 0
            && cycle >= self.debug_cycle_start
            && cycle <= self.debug_cycle_stop
    }
}

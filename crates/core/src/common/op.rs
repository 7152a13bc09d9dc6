//! The externally-supplied, already-retired operation record.
//!
//! `Op` is owned by the pipeline until it is handed to [`crate::engine::H2pCore::retire`].
//! Every value the core stores of an `Op` is a deep copy: the core never retains
//! a pointer into pipeline-owned storage, since the producing pipeline is free
//! to reuse or overwrite its own bookkeeping structures once an op retires.

use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) on register ids tracked by the live-in working set.
///
/// Register ids at or above this value are silently ignored by [`crate::liws::LiveInSet`].
/// This is an intentional simplification inherited from the 64-bit bit-vector
/// representation used to track liveness.
pub const TRACKED_REGISTER_SPACE: u32 = 64;

/// Broad instruction category, used only for classification/statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    /// Integer or floating-point arithmetic/logic operation.
    Alu,
    /// Control-flow operation (branch, jump, call, return).
    ControlFlow,
    /// Load from memory.
    Load,
    /// Store to memory.
    Store,
    /// System/CSR/privileged operation.
    System,
    /// Anything not otherwise classified.
    Other,
}

/// Control-flow kind of an op, distinguishing non-branches from the various
/// branch/jump flavors a backward walk or predictor might care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfType {
    /// Not a control-flow instruction. The distinguished "not a branch" variant.
    NotCf,
    /// Conditional direct branch.
    ConditionalBranch,
    /// Unconditional direct jump.
    UnconditionalJump,
    /// Indirect jump (register-relative).
    IndirectJump,
    /// Call instruction (pushes a return address).
    Call,
    /// Return instruction (pops a return address).
    Return,
}

impl CfType {
    /// Whether this op is any kind of control-flow instruction.
    #[must_use]
    pub const fn is_control_flow(self) -> bool {
        !matches!(self, Self::NotCf)
    }
}

/// Memory access kind of an op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemType {
    /// Op does not access memory.
    #[default]
    None,
    /// Op loads from memory.
    Load,
    /// Op stores to memory.
    Store,
}

/// A single retired operation, as handed to the core by the surrounding pipeline.
///
/// Only the fields consumed by the H2P core are modeled here; this is not a
/// full micro-op representation. `table_info`/`inst_info`
/// availability is modeled with [`Op::has_table_info`] and
/// [`Op::has_inst_info`] rather than by carrying the (simulator-internal)
/// structures themselves — the backward walk only needs to know whether they
/// were present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    /// Monotonically increasing id, unique per core.
    pub op_num: u64,
    /// Instruction address.
    pub pc: u64,
    /// Broad instruction category.
    pub op_type: OpType,
    /// Control-flow kind; `CfType::NotCf` for non-branches.
    pub cf_type: CfType,
    /// Memory access kind.
    pub mem_type: MemType,
    /// Virtual address, meaningful iff `mem_type != MemType::None`.
    pub va: u64,
    /// Memory access size in bytes, meaningful iff `mem_type != MemType::None`.
    pub mem_size: u32,
    /// Source register ids.
    pub srcs: Vec<u32>,
    /// Destination register ids.
    pub dests: Vec<u32>,
    /// Whether this op's direction/target was mispredicted.
    pub mispredicted: bool,
    /// Whether this op was misfetched (taken as control-flow when it wasn't, or vice versa).
    pub misfetched: bool,
    /// Hard-to-predict annotation, written by [`crate::hbt::HardBranchTable`] and
    /// read by the backward slice extractor and the surrounding pipeline.
    pub is_hard: bool,
    /// Whether `table_info` (static decode-time metadata) was available for this op.
    ///
    /// Malformed ops with this false are skipped by the backward walk.
    pub has_table_info: bool,
    /// Whether `inst_info` (per-dynamic-instance metadata) was available for this op.
    pub has_inst_info: bool,
}

impl Op {
    /// A placeholder op used only to pre-size ring-buffer storage before any
    /// real op has retired; never observed by a reader since `count` gates
    /// visibility in [`crate::rrb::RetirementRingBuffer`].
    pub(crate) fn placeholder() -> Self {
        Self {
            op_num: 0,
            pc: 0,
            op_type: OpType::Other,
            cf_type: CfType::NotCf,
            mem_type: MemType::None,
            va: 0,
            mem_size: 0,
            srcs: Vec::new(),
            dests: Vec::new(),
            mispredicted: false,
            misfetched: false,
            is_hard: false,
            has_table_info: false,
            has_inst_info: false,
        }
    }

    /// Whether this op is well-formed enough to participate in a backward walk.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.has_table_info && self.has_inst_info
    }

    /// Whether this op is a control-flow terminator (ends a basic block).
    #[must_use]
    pub const fn is_block_terminator(&self) -> bool {
        self.cf_type.is_control_flow()
    }
}

//! Small, well-formed `Op` constructors for building retirement traces.
//!
//! Every builder defaults `has_table_info`/`has_inst_info` to `true` (the
//! only well-formed state) and leaves the fields a given scenario doesn't
//! care about at their zero value.

use h2p_core::{CfType, MemType, Op, OpType};

/// A non-control-flow register-to-register op: reads `srcs`, writes `dests`.
#[must_use]
pub fn alu(op_num: u64, pc: u64, srcs: Vec<u32>, dests: Vec<u32>) -> Op {
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

/// A conditional branch reading `srcs`.
#[must_use]
pub fn branch(op_num: u64, pc: u64, srcs: Vec<u32>, is_hard: bool, mispredicted: bool) -> Op {
    Op {
        op_num,
        pc,
        op_type: OpType::ControlFlow,
        cf_type: CfType::ConditionalBranch,
        mem_type: MemType::None,
        va: 0,
        mem_size: 0,
        srcs,
        dests: vec![],
        mispredicted,
        misfetched: false,
        is_hard,
        has_table_info: true,
        has_inst_info: true,
    }
}

/// A store of `src` to `va`.
#[must_use]
pub fn store(op_num: u64, pc: u64, va: u64, src: u32) -> Op {
    Op {
        op_num,
        pc,
        op_type: OpType::Store,
        cf_type: CfType::NotCf,
        mem_type: MemType::Store,
        va,
        mem_size: 8,
        srcs: vec![src],
        dests: vec![],
        mispredicted: false,
        misfetched: false,
        is_hard: false,
        has_table_info: true,
        has_inst_info: true,
    }
}

/// A load of `va` into `dest`.
#[must_use]
pub fn load(op_num: u64, pc: u64, va: u64, dest: u32) -> Op {
    Op {
        op_num,
        pc,
        op_type: OpType::Load,
        cf_type: CfType::NotCf,
        mem_type: MemType::Load,
        va,
        mem_size: 8,
        srcs: vec![],
        dests: vec![dest],
        mispredicted: false,
        misfetched: false,
        is_hard: false,
        has_table_info: true,
        has_inst_info: true,
    }
}

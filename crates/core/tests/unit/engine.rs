//! Scenario tests (S1, S3, S4, S5) and cross-cutting invariants driven
//! entirely through [`H2pCore`]'s public API — no internal module is
//! touched directly.

use h2p_core::{Config, H2pCore};

use crate::common::builders::{alu, branch, load, store};

fn config(rrb_size: usize, walk_latency: u32) -> Config {
    Config {
        rrb_size,
        walk_latency,
        ..Config::default()
    }
}

#[test]
fn hbt_saturates_then_decays_s1() {
    let mut core = H2pCore::new(config(8, 0)).unwrap();

    for i in 0..31 {
        core.retire(0, branch(i, 0x100, vec![], false, true), 0)
            .unwrap();
    }
    assert_eq!(core.hbt_get_counter(0, 0x100).unwrap(), 31);
    assert!(core.hbt_is_hard(0, 0x100).unwrap());

    // 1000 branch retirements at a different PC drive exactly one HBT decay sweep.
    for i in 0..1000 {
        core.retire(0, branch(1000 + i, 0x200, vec![], false, false), 0)
            .unwrap();
    }
    assert_eq!(core.hbt_get_counter(0, 0x100).unwrap(), 16);
}

#[test]
fn store_to_load_exact_address_slice_s3() {
    let mut core = H2pCore::new(config(8, 0)).unwrap();

    core.retire(0, store(0, 0x3000, 0xF00, 1), 0).unwrap();
    core.retire(0, load(1, 0x3004, 0xF00, 2), 0).unwrap();
    core.retire(0, branch(2, 0x3008, vec![2], true, true), 0)
        .unwrap();
    core.cycle_bwe(0).unwrap();

    let entry = core.get_dependency_chain(0, 0x3008).unwrap().unwrap();
    assert_eq!(
        entry.chain.iter().map(|o| o.op_num).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn store_to_load_mismatched_address_excludes_store_s3() {
    let mut core = H2pCore::new(config(8, 0)).unwrap();

    core.retire(0, store(0, 0x3100, 0xF04, 1), 0).unwrap();
    core.retire(0, load(1, 0x3104, 0xF00, 2), 0).unwrap();
    core.retire(0, branch(2, 0x3108, vec![2], true, true), 0)
        .unwrap();
    core.cycle_bwe(0).unwrap();

    let entry = core.get_dependency_chain(0, 0x3108).unwrap().unwrap();
    assert_eq!(
        entry.chain.iter().map(|o| o.op_num).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn two_walks_through_the_same_block_or_merge_masks_s4() {
    let mut core = H2pCore::new(config(8, 0)).unwrap();

    // Walk 1: block BB at 0x400 (op0..op3), trigger at 0x500 depends on
    // op0 and op2 only. segment_blocks sees [op0,op1,op2,op3] as one block
    // (op3 is a non-triggering terminator that ends it), so BB is exactly
    // the 4-op block the scenario describes.
    core.retire(0, alu(0, 0x400, vec![], vec![1]), 0).unwrap();
    core.retire(0, alu(1, 0x404, vec![8], vec![9]), 0).unwrap();
    core.retire(0, alu(2, 0x408, vec![1], vec![2]), 0).unwrap();
    core.retire(0, branch(3, 0x40C, vec![], false, false), 0)
        .unwrap();
    core.retire(0, branch(4, 0x500, vec![2], true, true), 0)
        .unwrap();
    core.cycle_bwe(0).unwrap();

    let first = core.get_dependency_chain_block(0, 0x400).unwrap().unwrap();
    assert_eq!(first.dependency_mask, 0b0101);

    // Walk 2: a later dynamic instance of the same static block (same PCs),
    // this time with op1 and op2 dependent and op0 not. An earlier,
    // unrelated producer/terminator pair pushes first_dep back far enough
    // that BB is still segmented as its own block starting at 0x400.
    core.retire(0, alu(5, 0x200, vec![], vec![50]), 0).unwrap();
    core.retire(0, branch(6, 0x204, vec![], false, false), 0)
        .unwrap();
    core.retire(0, alu(7, 0x400, vec![], vec![10]), 0).unwrap();
    core.retire(0, alu(8, 0x404, vec![], vec![6]), 0).unwrap();
    core.retire(0, alu(9, 0x408, vec![6], vec![7]), 0).unwrap();
    core.retire(0, branch(10, 0x40C, vec![], false, false), 0)
        .unwrap();
    core.retire(0, branch(11, 0x600, vec![7, 50], true, true), 0)
        .unwrap();
    core.cycle_bwe(0).unwrap();

    let merged = core.get_dependency_chain_block(0, 0x400).unwrap().unwrap();
    assert_eq!(merged.dependency_mask, 0b0111);
    assert_eq!(merged.chain_len(), 3);
    assert_eq!(
        merged.chain.iter().map(|o| o.pc).collect::<Vec<_>>(),
        vec![0x400, 0x404, 0x408]
    );
}

#[test]
fn block_contributing_nothing_is_tagged_empty_s5() {
    let mut core = H2pCore::new(config(8, 0)).unwrap();

    // An earlier, unrelated producer anchors the window far enough back
    // that the block at 0x500 is considered and found to contribute
    // nothing, rather than simply falling outside the walk.
    core.retire(0, alu(0, 0x300, vec![], vec![5]), 0).unwrap();
    core.retire(0, branch(1, 0x304, vec![], false, false), 0)
        .unwrap();
    core.retire(0, alu(2, 0x500, vec![90], vec![91]), 0).unwrap();
    core.retire(0, alu(3, 0x504, vec![92], vec![93]), 0).unwrap();
    core.retire(0, branch(4, 0x508, vec![], false, false), 0)
        .unwrap();
    core.retire(0, branch(5, 0x600, vec![5], true, true), 0)
        .unwrap();
    core.cycle_bwe(0).unwrap();

    assert!(core.ebts_is_empty_block(0, 0x500).unwrap());
    assert!(core.get_dependency_chain_block(0, 0x500).unwrap().is_none());
}

#[test]
fn rrb_drops_pushes_while_bwe_is_walking() {
    let mut core = H2pCore::new(config(8, 5)).unwrap();
    core.retire(0, branch(0, 0x900, vec![], true, true), 0)
        .unwrap();
    core.retire(0, alu(1, 0x904, vec![], vec![]), 0).unwrap();
    core.retire(0, alu(2, 0x908, vec![], vec![]), 0).unwrap();

    let stats = core.stats(0).unwrap();
    assert_eq!(stats.rrb_pushes_dropped, 2);
    assert_eq!(stats.walks_armed, 1);
    assert_eq!(stats.walks_completed, 0);
}

#[test]
fn cores_are_disjoint() {
    let mut core = H2pCore::new(Config {
        num_cores: 2,
        rrb_size: 8,
        walk_latency: 0,
        ..Config::default()
    })
    .unwrap();

    for i in 0..31 {
        core.retire(0, branch(i, 0x100, vec![], false, true), 0)
            .unwrap();
    }
    assert!(core.hbt_is_hard(0, 0x100).unwrap());
    assert!(!core.hbt_is_hard(1, 0x100).unwrap());
    assert_eq!(core.stats(1).unwrap().ops_retired, 0);
}

//! Periodic maintenance — BCC mask/chain clearing and EBTS clearing, invoked
//! by the surrounding pipeline at a configurable period.
//!
//! HBT decay is *not* driven from here: it is internal to
//! [`crate::hbt::HardBranchTable::update`] and fires on a branch-retirement
//! schedule, not a maintenance-period schedule.

use tracing::info;

use crate::bcc::{BlockChainCache, EmptyBlockTagStore};

/// Clears every valid BCC entry's dependency mask and chain (tags are kept,
/// so a subsequent writer merges from zero again), and clears the EBTS
/// entirely.
pub fn periodically_reset_caches(bcc: &mut BlockChainCache, ebts: &mut EmptyBlockTagStore) {
    info!("periodic maintenance: clearing BCC masks and EBTS");
    bcc.clear_masks();
    ebts.clear();
}

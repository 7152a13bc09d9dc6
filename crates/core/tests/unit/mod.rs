//! End-to-end scenarios driven through [`h2p_core::H2pCore`].

/// HBT saturation/decay and dependency-slice caching scenarios.
pub mod engine;

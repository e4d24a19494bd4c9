//! # Respiratory gating
//!
//! Derivation of a binary inclusion mask from a respiratory trace
//! ([`threshold_mask`]) and lock-step filtering of the co-indexed k-space
//! arrays by that mask ([`partition`]).
//!
//! The mask lifecycle is deliberately short: it is computed once per
//! reconstruction run, consumed immediately by the partitioner, and
//! discarded. Both stages validate their inputs and fail fast with typed
//! errors before any gridding work starts.

pub mod partition;
pub mod threshold;

pub use partition::partition;
pub use threshold::{threshold_mask, GatingParams};

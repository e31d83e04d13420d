//! Low-level building blocks for custom selection policies.
//!
//! The pools used by `Selector` can be driven directly when a caller wants a
//! different cascade rule. Most users should prefer the top-level `Selector`.

pub use crate::pool::{
    CountEntry, CountOffer, CountPool, ScoreEntry, ScoreOffer, ScorePool, Slot,
};

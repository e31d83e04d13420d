//! Fixed-capacity candidate pools.
//!
//! Both pools hold a fixed number of slots that start out `Empty`. An empty
//! slot always ranks as the weakest occupant: below every filled slot in the
//! count pool and above every filled slot in the score pool. Each pool keeps
//! the index of its next eviction candidate and rescans linearly after every
//! replacement; ties resolve to the first slot in index order.

mod count;
mod score;

pub use count::{CountEntry, CountOffer, CountPool};
pub use score::{ScoreEntry, ScoreOffer, ScorePool};

/// A pool slot: either never filled or holding an entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Slot<T> {
    /// The slot has not been filled since the last reset.
    #[default]
    Empty,
    /// The slot holds a selected image.
    Filled(T),
}

impl<T> Slot<T> {
    /// Returns the entry if the slot is filled.
    pub fn as_filled(&self) -> Option<&T> {
        match self {
            Slot::Empty => None,
            Slot::Filled(entry) => Some(entry),
        }
    }

    /// Returns true if the slot was never filled.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    /// Converts the slot into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Slot::Empty => None,
            Slot::Filled(entry) => Some(entry),
        }
    }
}

/// Finds the index of the first slot for which no later slot is `better`.
///
/// `better(a, b)` must return true when `a` should replace `b` as the
/// eviction candidate; the strict comparison keeps the first occurrence.
fn first_extreme<T>(slots: &[Slot<T>], better: impl Fn(&Slot<T>, &Slot<T>) -> bool) -> usize {
    let mut best = 0usize;
    for (idx, slot) in slots.iter().enumerate().skip(1) {
        if better(slot, &slots[best]) {
            best = idx;
        }
    }
    best
}

fn empty_slots<T>(capacity: usize) -> Vec<Slot<T>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

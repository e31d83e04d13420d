//! Pool of images with the lowest average detection confidence.

use super::{empty_slots, first_extreme, Slot};

/// An image held by the score pool.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    /// Caller-provided image identifier.
    pub image_id: String,
    /// Average confidence of counted detections.
    pub average_score: f32,
}

/// Result of offering an image to the score pool.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreOffer {
    /// The image took the highest slot; `evicted` is its previous occupant.
    Admitted { evicted: Option<ScoreEntry> },
    /// The image did not undercut the highest slot and is handed back.
    Rejected(ScoreEntry),
}

/// Fixed-capacity pool retaining the lowest average scores seen so far.
///
/// The tracked "highest" slot is the worst retained entry and therefore the
/// next to be evicted.
#[derive(Clone, Debug)]
pub struct ScorePool {
    slots: Vec<Slot<ScoreEntry>>,
    highest_index: usize,
}

/// Empty slots rank above any filled slot.
fn higher(a: &Slot<ScoreEntry>, b: &Slot<ScoreEntry>) -> bool {
    match (a, b) {
        (Slot::Empty, Slot::Filled(_)) => true,
        (Slot::Filled(a), Slot::Filled(b)) => a.average_score > b.average_score,
        _ => false,
    }
}

impl ScorePool {
    /// Creates a pool with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity),
            highest_index: 0,
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of filled slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Returns all slots in index order.
    pub fn slots(&self) -> &[Slot<ScoreEntry>] {
        &self.slots
    }

    /// Returns the index of the slot with the maximum average score.
    pub fn highest_index(&self) -> usize {
        self.highest_index
    }

    /// Returns the maximum retained average score, or `None` while an empty
    /// slot is still the eviction candidate.
    pub fn highest_score(&self) -> Option<f32> {
        self.slots
            .get(self.highest_index)
            .and_then(Slot::as_filled)
            .map(|entry| entry.average_score)
    }

    /// Returns true if an image with `average_score` would displace a slot.
    ///
    /// Admission is strict: equal scores never evict. An empty slot admits any
    /// non-NaN score.
    pub fn admits(&self, average_score: f32) -> bool {
        match self.slots.get(self.highest_index) {
            None => false,
            Some(Slot::Empty) => !average_score.is_nan(),
            Some(Slot::Filled(highest)) => average_score < highest.average_score,
        }
    }

    /// Offers an image, replacing the highest slot when it is undercut.
    pub fn offer(&mut self, entry: ScoreEntry) -> ScoreOffer {
        if !self.admits(entry.average_score) {
            return ScoreOffer::Rejected(entry);
        }

        let slot = &mut self.slots[self.highest_index];
        let previous = std::mem::replace(slot, Slot::Filled(entry));
        self.highest_index = first_extreme(&self.slots, higher);
        ScoreOffer::Admitted {
            evicted: previous.into_option(),
        }
    }

    /// Iterates slot image ids in index order, `None` for empty slots.
    pub fn image_ids(&self) -> impl Iterator<Item = Option<&str>> {
        self.slots
            .iter()
            .map(|slot| slot.as_filled().map(|entry| entry.image_id.as_str()))
    }
}

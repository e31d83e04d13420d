//! Pool of images with the highest weighted counts.

use super::{empty_slots, first_extreme, Slot};

/// An image held by the count pool.
#[derive(Clone, Debug, PartialEq)]
pub struct CountEntry {
    /// Caller-provided image identifier.
    pub image_id: String,
    /// Weighted count of counted detections.
    pub weighted_count: f32,
    /// Average confidence, kept so the image can cascade into the score pool.
    pub average_score: f32,
}

/// Result of offering an image to the count pool.
#[derive(Clone, Debug, PartialEq)]
pub enum CountOffer {
    /// The image took the lowest slot; `evicted` is its previous occupant.
    Admitted { evicted: Option<CountEntry> },
    /// The image did not beat the lowest slot and is handed back.
    Rejected(CountEntry),
}

/// Fixed-capacity pool retaining the highest weighted counts seen so far.
#[derive(Clone, Debug)]
pub struct CountPool {
    slots: Vec<Slot<CountEntry>>,
    lowest_index: usize,
}

/// Empty slots rank below any filled slot.
fn lower(a: &Slot<CountEntry>, b: &Slot<CountEntry>) -> bool {
    match (a, b) {
        (Slot::Empty, Slot::Filled(_)) => true,
        (Slot::Filled(a), Slot::Filled(b)) => a.weighted_count < b.weighted_count,
        _ => false,
    }
}

impl CountPool {
    /// Creates a pool with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity),
            lowest_index: 0,
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
    pub fn slots(&self) -> &[Slot<CountEntry>] {
        &self.slots
    }

    /// Returns the index of the slot with the minimum weighted count.
    pub fn lowest_index(&self) -> usize {
        self.lowest_index
    }

    /// Returns the minimum weighted count; empty slots count as zero.
    pub fn lowest_count(&self) -> f32 {
        self.slots
            .get(self.lowest_index)
            .and_then(Slot::as_filled)
            .map_or(0.0, |entry| entry.weighted_count)
    }

    /// Returns true if an image with `weighted_count` would displace a slot.
    ///
    /// Admission is strict: equal counts never evict. An empty slot admits any
    /// positive count.
    pub fn admits(&self, weighted_count: f32) -> bool {
        match self.slots.get(self.lowest_index) {
            None => false,
            Some(Slot::Empty) => weighted_count > 0.0,
            Some(Slot::Filled(lowest)) => weighted_count > lowest.weighted_count,
        }
    }

    /// Offers an image, replacing the lowest slot when it is beaten.
    pub fn offer(&mut self, entry: CountEntry) -> CountOffer {
        if !self.admits(entry.weighted_count) {
            return CountOffer::Rejected(entry);
        }

        let slot = &mut self.slots[self.lowest_index];
        let previous = std::mem::replace(slot, Slot::Filled(entry));
        self.lowest_index = first_extreme(&self.slots, lower);
        CountOffer::Admitted {
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

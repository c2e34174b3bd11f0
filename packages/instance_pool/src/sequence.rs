//! Ordering of pool slots.
//!
//! Every slot has a position in the pool's sequence, expressed as a stamp. New slots and freshly
//! deactivated slots receive the next (largest) stamp, placing them at the tail. Activating a slot
//! does not change its stamp, so active and inactive slots interleave in the sequence.
//!
//! Instead of scanning a single list for the first slot in a given state, we keep two ordered
//! queues keyed by stamp - one for inactive slots and one for active slots. The front of each queue
//! is the first slot of that state in sequence order, and merging the two queues yields the full
//! sequence.

use std::collections::BTreeMap;

use itertools::Itertools;

/// Position of a slot in the sequence. Larger stamps are closer to the tail.
pub(crate) type Stamp = u64;

/// A slot removed from the sequence to satisfy a shrinking resize.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Evicted {
    Inactive(usize),
    Active(usize),
}

impl Evicted {
    #[must_use]
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Inactive(index) | Self::Active(index) => index,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SlotSequence {
    /// Stamp to entry index, for every inactive slot.
    inactive: BTreeMap<Stamp, usize>,

    /// Stamp to entry index, for every active slot.
    active: BTreeMap<Stamp, usize>,

    next_stamp: Stamp,
}

impl SlotSequence {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.inactive
            .len()
            .checked_add(self.active.len())
            .expect("slot count cannot exceed the range of usize because every slot is stored in memory")
    }

    #[must_use]
    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub(crate) fn inactive_len(&self) -> usize {
        self.inactive.len()
    }

    /// Appends a slot to the tail of the sequence in the inactive state.
    #[must_use]
    pub(crate) fn push_inactive(&mut self, index: usize) -> Stamp {
        let stamp = self.take_stamp();
        self.inactive.insert(stamp, index);
        stamp
    }

    /// The first inactive slot in sequence order, if any.
    #[must_use]
    pub(crate) fn first_inactive(&self) -> Option<(Stamp, usize)> {
        self.inactive
            .first_key_value()
            .map(|(stamp, index)| (*stamp, *index))
    }

    /// The first active slot in sequence order, if any. Because deactivation moves slots to the
    /// tail, this is the slot that has been active the longest.
    #[must_use]
    pub(crate) fn first_active(&self) -> Option<(Stamp, usize)> {
        self.active
            .first_key_value()
            .map(|(stamp, index)| (*stamp, *index))
    }

    /// Marks an inactive slot as active. The slot keeps its position in the sequence.
    ///
    /// # Panics
    ///
    /// Panics if no inactive slot has the given stamp.
    pub(crate) fn mark_active(&mut self, stamp: Stamp) {
        let index = self
            .inactive
            .remove(&stamp)
            .expect("only inactive slots can be activated");

        self.active.insert(stamp, index);
    }

    /// Marks a slot as inactive and moves it to the tail of the sequence, returning its new stamp.
    ///
    /// The slot may already be inactive, in which case it is only moved.
    ///
    /// # Panics
    ///
    /// Panics if no slot has the given stamp.
    #[must_use]
    pub(crate) fn requeue_inactive(&mut self, stamp: Stamp) -> Stamp {
        let index = self
            .active
            .remove(&stamp)
            .or_else(|| self.inactive.remove(&stamp))
            .expect("slot to deactivate must be present in the sequence");

        let new_stamp = self.take_stamp();
        self.inactive.insert(new_stamp, index);
        new_stamp
    }

    /// Removes the slot that should be destroyed first when the pool shrinks.
    ///
    /// Inactive slots go first, longest idle first. Only when no inactive slot remains do we
    /// evict active slots, starting with the one that has been active the longest.
    #[must_use]
    pub(crate) fn pop_eviction_candidate(&mut self) -> Option<Evicted> {
        if let Some((_, index)) = self.inactive.pop_first() {
            return Some(Evicted::Inactive(index));
        }

        self.active
            .pop_first()
            .map(|(_, index)| Evicted::Active(index))
    }

    /// Entry indexes of all slots, in sequence order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.inactive
            .iter()
            .merge_by(self.active.iter(), |a, b| a.0 < b.0)
            .map(|(_, index)| *index)
    }

    /// Entry indexes of active slots, in sequence order.
    pub(crate) fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.values().copied()
    }

    fn take_stamp(&mut self) -> Stamp {
        let stamp = self.next_stamp;

        self.next_stamp = self
            .next_stamp
            .checked_add(1)
            .expect("sequence stamps cannot be exhausted - that would take centuries of activity");

        stamp
    }
}

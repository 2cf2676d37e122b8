//! # Slot Arena
//!
//! Growable storage for one component kind.
//!
//! Free slots form an intrusive singly linked list threaded through the
//! vacant entries themselves, so `add` and `remove` are O(1) and an index
//! stays valid for as long as its slot is occupied. A watermark tracks the
//! highest occupied index so per-step passes never scan trailing capacity.

use tracing::trace;

use crate::ecs::EntityId;

/// Minimum number of slots appended when the free list runs dry.
const MIN_GROWTH: usize = 10;

/// One arena entry.
///
/// The free link only exists on vacant slots, so a slot can never be both
/// in use and on the free list.
#[derive(Clone, Debug)]
enum Slot<T> {
    /// Holds a live component owned by `owner`.
    Occupied {
        /// Owning entity
        owner: EntityId,
        /// Component state
        value: T,
    },
    /// Free; `next_free` is the next entry of the free list.
    Vacant {
        /// Next free slot, `None` terminates the list
        next_free: Option<usize>,
    },
}

/// Recycling component storage.
///
/// # Panics
///
/// Removing a vacant slot or indexing past the end is a contract violation
/// and panics. Reaching that through [`crate::EntityTable`] means the caller
/// removed a slot it did not own.
///
/// # Example
///
/// ```rust
/// use skirmish_core::{EntityId, SlotArena};
///
/// let mut arena: SlotArena<u32> = SlotArena::new();
/// let a = arena.add(EntityId::new(1), 10);
/// let b = arena.add(EntityId::new(2), 20);
/// assert_eq!(arena.remove(a), 10);
///
/// // Freed slots are handed out first.
/// assert_eq!(arena.add(EntityId::new(3), 30), a);
/// assert_eq!(arena.watermark(), Some(b));
/// ```
#[derive(Clone, Debug)]
pub struct SlotArena<T> {
    /// All slots, occupied or not.
    slots: Vec<Slot<T>>,
    /// Head of the free list.
    free_head: Option<usize>,
    /// Highest occupied index, `None` when empty.
    watermark: Option<usize>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotArena<T> {
    /// Creates an empty arena. Storage is allocated on first `add`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            watermark: None,
            len: 0,
        }
    }

    /// Creates an arena with `capacity` pre-linked free slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self::new();
        if capacity > 0 {
            arena.grow_by(capacity);
        }
        arena
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots, occupied or free.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Highest occupied index, if any.
    #[inline]
    #[must_use]
    pub const fn watermark(&self) -> Option<usize> {
        self.watermark
    }

    /// Number of indices a full pass has to visit.
    #[inline]
    #[must_use]
    pub fn scan_len(&self) -> usize {
        self.watermark.map_or(0, |w| w + 1)
    }

    /// Stores `value` for `owner` and returns its slot index.
    ///
    /// Grows by doubling (at least [`MIN_GROWTH`] slots) when no free slot
    /// is left.
    pub fn add(&mut self, owner: EntityId, value: T) -> usize {
        if self.free_head.is_none() {
            let additional = self.slots.len().max(MIN_GROWTH);
            self.grow_by(additional);
        }

        let Some(index) = self.free_head else {
            unreachable!("arena grew but free list is empty");
        };
        let next_free = match self.slots[index] {
            Slot::Vacant { next_free } => next_free,
            Slot::Occupied { .. } => panic!("free list head {index} is occupied"),
        };

        self.free_head = next_free;
        self.slots[index] = Slot::Occupied { owner, value };
        self.len += 1;
        if self.watermark.map_or(true, |w| index > w) {
            self.watermark = Some(index);
        }
        index
    }

    /// Frees `index` and returns the component that lived there.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or already free.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.slots.len(),
            "slot {index} out of range (capacity {})",
            self.slots.len()
        );
        assert!(
            matches!(self.slots[index], Slot::Occupied { .. }),
            "slot {index} removed twice"
        );

        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        let Slot::Occupied { value, .. } = std::mem::replace(&mut self.slots[index], vacant) else {
            unreachable!("slot {index} checked occupied");
        };
        self.free_head = Some(index);
        self.len -= 1;

        if self.watermark == Some(index) {
            self.watermark = self.slots[..index]
                .iter()
                .rposition(|slot| matches!(slot, Slot::Occupied { .. }));
        }
        value
    }

    /// True if `index` currently holds a component.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Occupied { .. }))
    }

    /// Component at `index`, `None` if the slot is free or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Mutable component at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Entity owning `index`.
    #[inline]
    #[must_use]
    pub fn owner(&self, index: usize) -> Option<EntityId> {
        match self.slots.get(index) {
            Some(Slot::Occupied { owner, .. }) => Some(*owner),
            _ => None,
        }
    }

    /// Occupied slots in index order, bounded by the watermark.
    pub fn iter(&self) -> impl Iterator<Item = (usize, EntityId, &T)> + '_ {
        self.slots[..self.scan_len()]
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { owner, value } => Some((index, *owner, value)),
                Slot::Vacant { .. } => None,
            })
    }

    /// Mutable occupied slots in index order, bounded by the watermark.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, EntityId, &mut T)> + '_ {
        let scan = self.scan_len();
        self.slots[..scan]
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { owner, value } => Some((index, *owner, value)),
                Slot::Vacant { .. } => None,
            })
    }

    /// Occupied indices, for passes that need `&mut` access to other state
    /// while visiting each slot.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.iter().map(|(index, _, _)| index).collect()
    }

    /// Length of the free list. Walks the list, meant for tests and stats.
    #[must_use]
    pub fn free_count(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.free_head;
        while let Some(index) = cursor {
            count += 1;
            cursor = match self.slots[index] {
                Slot::Vacant { next_free } => next_free,
                Slot::Occupied { .. } => panic!("occupied slot {index} on free list"),
            };
        }
        count
    }

    /// Appends `additional` vacant slots linked ahead of the current free list.
    fn grow_by(&mut self, additional: usize) {
        let start = self.slots.len();
        let end = start + additional;
        self.slots.reserve_exact(additional);
        for index in start..end {
            let next_free = if index + 1 < end {
                Some(index + 1)
            } else {
                self.free_head
            };
            self.slots.push(Slot::Vacant { next_free });
        }
        self.free_head = Some(start);
        trace!(from = start, to = end, "slot arena grown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(n: u64) -> EntityId {
        EntityId::new(n)
    }

    #[test]
    fn test_first_growth_is_ten() {
        let mut arena: SlotArena<u8> = SlotArena::new();
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.add(owner(1), 1), 0);
        assert_eq!(arena.capacity(), 10);
        assert_eq!(arena.free_count(), 9);
    }

    #[test]
    fn test_growth_doubles() {
        let mut arena: SlotArena<usize> = SlotArena::new();
        for i in 0..11 {
            arena.add(owner(i as u64), i);
        }
        assert_eq!(arena.capacity(), 20);
        for i in 11..21 {
            arena.add(owner(i as u64), i);
        }
        assert_eq!(arena.capacity(), 40);
        assert_eq!(arena.len(), 21);
        assert_eq!(arena.free_count(), 19);
    }

    #[test]
    fn test_remove_returns_value_and_recycles() {
        let mut arena: SlotArena<&str> = SlotArena::new();
        let a = arena.add(owner(1), "a");
        let b = arena.add(owner(2), "b");
        assert_eq!(arena.remove(a), "a");
        assert!(!arena.is_occupied(a));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.owner(b), Some(owner(2)));

        let c = arena.add(owner(3), "c");
        assert_eq!(c, a);
        assert_eq!(arena.get(c), Some(&"c"));
    }

    #[test]
    fn test_watermark_shrinks_backward() {
        let mut arena: SlotArena<u8> = SlotArena::new();
        let idx: Vec<usize> = (0..5).map(|i| arena.add(owner(i), 0)).collect();
        assert_eq!(arena.watermark(), Some(4));

        arena.remove(idx[2]);
        arena.remove(idx[3]);
        assert_eq!(arena.watermark(), Some(4));

        arena.remove(idx[4]);
        assert_eq!(arena.watermark(), Some(1));

        arena.remove(idx[0]);
        arena.remove(idx[1]);
        assert_eq!(arena.watermark(), None);
        assert_eq!(arena.iter().count(), 0);
    }

    #[test]
    fn test_iteration_skips_vacant() {
        let mut arena: SlotArena<u32> = SlotArena::new();
        for i in 0..6 {
            arena.add(owner(i), i as u32);
        }
        arena.remove(1);
        arena.remove(4);

        let seen: Vec<u32> = arena.iter().map(|(_, _, v)| *v).collect();
        assert_eq!(seen, vec![0, 2, 3, 5]);

        for (_, _, v) in arena.iter_mut() {
            *v *= 10;
        }
        assert_eq!(arena.get(5), Some(&50));
        assert_eq!(arena.indices(), vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_with_capacity_does_not_grow_early() {
        let mut arena: SlotArena<u8> = SlotArena::with_capacity(3);
        for i in 0..3 {
            arena.add(owner(i), 0);
        }
        assert_eq!(arena.capacity(), 3);
        arena.add(owner(4), 0);
        assert_eq!(arena.capacity(), 13);
    }

    #[test]
    #[should_panic(expected = "removed twice")]
    fn test_double_free_panics() {
        let mut arena: SlotArena<u8> = SlotArena::new();
        let a = arena.add(owner(1), 0);
        arena.remove(a);
        arena.remove(a);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let mut arena: SlotArena<u8> = SlotArena::new();
        arena.remove(3);
    }
}

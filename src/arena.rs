//! Chunked slot allocator backing the tree nodes.

use std::mem;
use std::ops::{Index, IndexMut};

/// A copyable reference to a slot of an `Arena<T>`.
///
/// Handles never outlive the arena they were issued by and are not exposed outside the crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk: usize,
    slot: usize,
}

enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// A single-type allocator that hands out `Handle`s instead of references.
///
/// Storage grows one chunk at a time and a chunk is never reallocated once created, so a value
/// stays at the same slot until it is freed. Freed slots are threaded into an intrusive free list
/// and reused most-recent-first.
pub struct Arena<T> {
    free_head: Option<Handle>,
    chunks: Vec<Vec<Slot<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    /// Constructs an empty arena holding `chunk_size` values per chunk. A chunk size of zero is
    /// treated as one.
    pub fn new(chunk_size: usize) -> Self {
        Arena {
            free_head: None,
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            capacity: 0,
        }
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.chunks.get(handle.chunk).and_then(|chunk| chunk.get(handle.slot))
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        self.chunks.get_mut(handle.chunk).and_then(|chunk| chunk.get_mut(handle.slot))
    }

    /// Stores `value` and returns the handle of its slot.
    pub fn allocate(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(handle) = self.free_head.take() {
            let slot = &mut self.chunks[handle.chunk][handle.slot];
            match mem::replace(slot, Slot::Occupied(value)) {
                Slot::Vacant(next) => self.free_head = next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            }
            return handle;
        }

        if self.len > self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }

        let chunk = self.chunks.len() - 1;
        let last = &mut self.chunks[chunk];
        last.push(Slot::Occupied(value));
        Handle {
            chunk,
            slot: last.len() - 1,
        }
    }

    /// Releases the slot behind `handle` and returns the value it held.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to an occupied slot.
    pub fn free(&mut self, handle: Handle) -> T {
        let next = self.free_head;
        let old = match self.slot_mut(handle) {
            Some(slot) => mem::replace(slot, Slot::Vacant(next)),
            None => panic!("attempted to free a handle outside of the arena: {:?}", handle),
        };
        match old {
            Slot::Occupied(value) => {
                self.len -= 1;
                self.free_head = Some(handle);
                value
            },
            Slot::Vacant(next) => {
                // restore the slot before reporting the defect
                if let Some(slot) = self.slot_mut(handle) {
                    *slot = Slot::Vacant(next);
                }
                panic!("attempted to free a vacant slot: {:?}", handle)
            },
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.slot(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slot_mut(handle) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Drops every stored value and releases all chunks.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.free_head = None;
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("dangling arena handle: {:?}", handle),
        }
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("dangling arena handle: {:?}", handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Handle};

    #[test]
    fn test_allocate_sequential() {
        let mut arena = Arena::new(1024);
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 0 });
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 1 });
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 2 });
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_allocate_multiple_chunks() {
        let mut arena = Arena::new(2);
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 0 });
        assert_eq!(arena.allocate(0), Handle { chunk: 0, slot: 1 });
        assert_eq!(arena.allocate(0), Handle { chunk: 1, slot: 0 });
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut arena = Arena::new(0);
        assert_eq!(arena.allocate('a'), Handle { chunk: 0, slot: 0 });
        assert_eq!(arena.allocate('b'), Handle { chunk: 1, slot: 0 });
    }

    #[test]
    fn test_free_reuses_slot() {
        let mut arena = Arena::new(4);
        let x = arena.allocate(1);
        let y = arena.allocate(2);
        assert_eq!(arena.free(x), 1);
        assert_eq!(arena.free(y), 2);
        assert_eq!(arena.len(), 0);

        // most recently freed first
        assert_eq!(arena.allocate(3), y);
        assert_eq!(arena.allocate(4), x);
        assert_eq!(arena[x], 4);
        assert_eq!(arena[y], 3);
    }

    #[test]
    fn test_free_does_not_grow_capacity() {
        let mut arena = Arena::new(1);
        let x = arena.allocate(0);
        arena.free(x);
        assert_eq!(arena.allocate(1), x);
        assert_eq!(arena.allocate(2), Handle { chunk: 1, slot: 0 });
    }

    #[test]
    #[should_panic]
    fn test_free_invalid_handle() {
        let mut arena: Arena<u32> = Arena::new(1024);
        arena.free(Handle { chunk: 0, slot: 0 });
    }

    #[test]
    #[should_panic]
    fn test_free_vacant_handle() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        arena.free(x);
        arena.free(x);
    }

    #[test]
    fn test_get_and_get_mut() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        *arena.get_mut(x).unwrap() += 5;
        assert_eq!(arena.get(x), Some(&5));
        arena[x] -= 1;
        assert_eq!(arena[x], 4);
    }

    #[test]
    fn test_get_vacant_or_invalid() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        assert_eq!(arena.get(Handle { chunk: 0, slot: 1 }), None);
        assert_eq!(arena.get(Handle { chunk: 3, slot: 0 }), None);
        arena.free(x);
        assert_eq!(arena.get(x), None);
        assert_eq!(arena.get_mut(x), None);
    }
}

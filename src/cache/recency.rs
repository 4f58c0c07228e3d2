//! Recency Index Module
//!
//! Tracks which keys are cached and their relative recency, independent of values.

use std::collections::HashMap;

/// Null link in the arena-backed list.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    key: Vec<u8>,
    prev: usize,
    next: usize,
}

// == Recency Index ==
/// Tracks access order for LRU eviction with O(1) touch and evict.
///
/// Nodes live in a `Vec` arena and are linked by index:
/// - `head` = Most recently used
/// - `tail` = Least recently used
///
/// Freed slots are recycled through `free`.
#[derive(Debug)]
pub struct RecencyIndex {
    /// Key -> arena slot
    slots: HashMap<Vec<u8>, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl Default for RecencyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index with room for `capacity` keys before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// Returns `true` if the key was not tracked before and has been inserted.
    pub fn touch(&mut self, key: &[u8]) -> bool {
        if self.promote(key) {
            return false;
        }

        let node = Node {
            key: key.to_vec(),
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.slots.insert(key.to_vec(), idx);
        self.push_front(idx);
        true
    }

    // == Promote ==
    /// Moves a tracked key to the most-recent position.
    ///
    /// Returns `false` and leaves the index untouched if the key is absent.
    pub fn promote(&mut self, key: &[u8]) -> bool {
        match self.slots.get(key) {
            Some(&idx) => {
                if self.head != idx {
                    self.unlink(idx);
                    self.push_front(idx);
                }
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the index is empty.
    pub fn evict_oldest(&mut self) -> Option<Vec<u8>> {
        if self.tail == NIL {
            return None;
        }

        let idx = self.tail;
        self.unlink(idx);
        let key = std::mem::take(&mut self.nodes[idx].key);
        self.slots.remove(&key);
        self.free.push(idx);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&[u8]> {
        (self.tail != NIL).then(|| self.nodes[self.tail].key.as_slice())
    }

    /// Iterates keys from most to least recently used.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let node = &self.nodes[cursor];
            cursor = node.next;
            Some(node.key.as_slice())
        })
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked, without changing its recency.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.slots.contains_key(key)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }
}

//! LRU Recency List Module
//!
//! Keeps cache entries in recency order for O(1) promotion and eviction.

use crate::cache::CacheEntry;

/// Slot index used in place of a null link.
const NIL: usize = usize::MAX;

/// A slot in the node arena. Free slots have `entry == None`.
#[derive(Debug)]
struct Node<V> {
    key: String,
    entry: Option<CacheEntry<V>>,
    /// Neighbour towards the most recently used end
    prev: usize,
    /// Neighbour towards the least recently used end
    next: usize,
}

// == Recency List ==
/// Intrusive doubly-linked list over an arena of nodes.
///
/// Entries are linked such that:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Callers address nodes by the slot index returned from [`push_front`],
/// which stays valid until the node is removed. Freed slots are recycled.
///
/// [`push_front`]: RecencyList::push_front
#[derive(Debug)]
pub struct RecencyList<V> {
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty recency list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Inserts a new entry as the most recently used and returns its slot.
    pub fn push_front(&mut self, key: String, entry: CacheEntry<V>) -> usize {
        let node = Node {
            key,
            entry: Some(entry),
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
        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Touch ==
    /// Marks a slot as recently used (moves it to the head).
    pub fn touch(&mut self, idx: usize) {
        if self.head == idx || !self.is_live(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks a slot and returns its key and entry.
    pub fn remove(&mut self, idx: usize) -> Option<(String, CacheEntry<V>)> {
        if !self.is_live(idx) {
            return None;
        }
        self.unlink(idx);
        let node = &mut self.nodes[idx];
        let entry = node.entry.take()?;
        let key = std::mem::take(&mut node.key);
        self.free.push(idx);
        self.len -= 1;
        Some((key, entry))
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn evict_oldest(&mut self) -> Option<(String, CacheEntry<V>)> {
        if self.tail == NIL {
            return None;
        }
        self.remove(self.tail)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.key(self.tail)
    }

    // == Accessors ==
    /// Key stored in a live slot.
    pub fn key(&self, idx: usize) -> Option<&str> {
        self.is_live(idx).then(|| self.nodes[idx].key.as_str())
    }

    /// Entry stored in a live slot.
    pub fn entry(&self, idx: usize) -> Option<&CacheEntry<V>> {
        self.nodes.get(idx)?.entry.as_ref()
    }

    /// Mutable entry stored in a live slot. Does not change recency.
    pub fn entry_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<V>> {
        self.nodes.get_mut(idx)?.entry.as_mut()
    }

    // == Iteration ==
    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.tail,
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every entry and releases the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    fn is_live(&self, idx: usize) -> bool {
        self.nodes
            .get(idx)
            .map_or(false, |node| node.entry.is_some())
    }

    fn link_front(&mut self, idx: usize) {
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

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

// == Iterator ==
/// Oldest-first iterator over `(key, entry)` pairs.
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    cursor: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a CacheEntry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.prev;
        node.entry.as_ref().map(|entry| (node.key.as_str(), entry))
    }
}

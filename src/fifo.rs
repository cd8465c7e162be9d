//! Fixed-capacity FIFO set
//!
//! [`Store`] remembers the most recent `capacity` distinct keys. Adding a key that is
//! already stored moves it to the newest position instead of inserting it again; adding a
//! new key to a full store evicts the oldest one. All operations are O(1).
//!
//! Entries live in an arena of nodes linked by index. Removed slots go on a free list and
//! are reused, so the arena never grows past `capacity`.
//!
//! ```rust
//! use ibtstream::fifo::Store;
//!
//! let mut seen = Store::new(2);
//! assert!(seen.add(1));
//! assert!(seen.add(2));
//! assert!(!seen.add(1)); // promoted, 2 is now oldest
//! assert!(seen.add(3)); // evicts 2
//! assert_eq!(seen.keys(), vec![1, 3]);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

/// Capacity used when zero is requested.
pub const DEFAULT_CAPACITY: usize = 10;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Node<K> {
    key: K,
    prev: usize,
    next: usize,
}

/// FIFO set of the last `capacity` distinct keys.
#[derive(Debug, Clone)]
pub struct Store<K> {
    nodes: Vec<Node<K>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K: Eq + Hash + Clone> Store<K> {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Record `key` as the newest entry.
    ///
    /// Returns `true` if the key was not stored. A stored key is moved to the newest
    /// position and `false` is returned.
    pub fn add(&mut self, key: K) -> bool {
        if let Some(&slot) = self.index.get(&key) {
            self.unlink(slot);
            self.push_back(slot);
            return false;
        }

        if self.index.len() >= self.capacity {
            let oldest = self.head;
            let evicted = self.nodes[oldest].key.clone();
            self.remove_slot(oldest);
            self.index.remove(&evicted);
        }

        let node = Node { key: key.clone(), prev: NIL, next: NIL };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.push_back(slot);
        self.index.insert(key, slot);
        true
    }

    /// Remove `key`; returns whether it was stored.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.remove_slot(slot);
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest stored key.
    pub fn first(&self) -> Option<&K> {
        self.nodes.get(self.head).map(|n| &n.key)
    }

    /// Newest stored key.
    pub fn last(&self) -> Option<&K> {
        self.nodes.get(self.tail).map(|n| &n.key)
    }

    /// Stored keys from oldest to newest.
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.len());
        let mut slot = self.head;
        while slot != NIL {
            out.push(self.nodes[slot].key.clone());
            slot = self.nodes[slot].next;
        }
        out
    }

    fn remove_slot(&mut self, slot: usize) {
        self.unlink(slot);
        self.free.push(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let Node { prev, next, .. } = self.nodes[slot];
        match prev {
            NIL => self.head = next,
            p => self.nodes[p].next = next,
        }
        match next {
            NIL => self.tail = prev,
            n => self.nodes[n].prev = prev,
        }
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }

    fn push_back(&mut self, slot: usize) {
        self.nodes[slot].prev = self.tail;
        self.nodes[slot].next = NIL;
        match self.tail {
            NIL => self.head = slot,
            t => self.nodes[t].next = slot,
        }
        self.tail = slot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[test]
    fn zero_capacity_falls_back_to_default() {
        assert_eq!(Store::<i32>::new(0).capacity(), DEFAULT_CAPACITY);
        assert_eq!(Store::<i32>::new(3).capacity(), 3);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut store = Store::new(3);
        for key in 1..=4 {
            assert!(store.add(key));
        }
        assert_eq!(store.len(), 3);
        assert!(!store.exists(&1));
        assert_eq!(store.keys(), vec![2, 3, 4]);
        assert_eq!(store.first(), Some(&2));
        assert_eq!(store.last(), Some(&4));
    }

    #[test]
    fn re_adding_promotes_instead_of_duplicating() {
        let mut store = Store::new(3);
        store.add("a");
        store.add("b");
        store.add("c");
        assert!(!store.add("a"));
        assert_eq!(store.keys(), vec!["b", "c", "a"]);

        store.add("d");
        assert_eq!(store.keys(), vec!["c", "a", "d"]);
    }

    #[test]
    fn delete_frees_slots_for_reuse() {
        let mut store = Store::new(2);
        store.add(10);
        store.add(20);
        assert!(store.delete(&10));
        assert!(!store.delete(&10));
        assert_eq!(store.keys(), vec![20]);

        store.add(30);
        store.add(40);
        assert_eq!(store.keys(), vec![30, 40]);
        assert!(store.nodes.len() <= 2);

        assert!(store.delete(&30));
        assert!(store.delete(&40));
        assert!(store.is_empty());
        assert_eq!(store.first(), None);
        assert_eq!(store.keys(), Vec::<i32>::new());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Delete(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..12).prop_map(Op::Add), (0u8..12).prop_map(Op::Delete)]
    }

    proptest! {
        #[test]
        fn matches_a_naive_queue(capacity in 1usize..6, ops in prop::collection::vec(op(), 0..64)) {
            let mut store = Store::new(capacity);
            let mut model: VecDeque<u8> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Add(key) => {
                        let was_new = !model.contains(&key);
                        model.retain(|k| *k != key);
                        if was_new && model.len() >= capacity {
                            model.pop_front();
                        }
                        model.push_back(key);
                        prop_assert_eq!(store.add(key), was_new);
                    }
                    Op::Delete(key) => {
                        let existed = model.contains(&key);
                        model.retain(|k| *k != key);
                        prop_assert_eq!(store.delete(&key), existed);
                    }
                }
                prop_assert_eq!(store.keys(), model.iter().copied().collect::<Vec<_>>());
                prop_assert!(store.nodes.len() <= capacity);
            }
        }
    }
}

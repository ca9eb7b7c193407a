//! Memo for combined queries keyed by their resolved form.

use super::combined::CombinedQuery;
use std::collections::{HashMap, VecDeque};

/// Stores evaluated combined probabilities with an LRU eviction policy.
#[derive(Debug)]
pub struct OddsCache {
    entries: HashMap<CombinedQuery, f64>,
    order: VecDeque<CombinedQuery>,
    capacity: usize,
}

impl OddsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a query and marks it as most recently used.
    pub fn get(&mut self, key: &CombinedQuery) -> Option<f64> {
        let value = *self.entries.get(key)?;
        self.touch(key);
        Some(value)
    }

    pub fn insert(&mut self, key: CombinedQuery, probability: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), probability).is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }
        self.evict_if_needed();
    }

    fn touch(&mut self, key: &CombinedQuery) {
        if let Some(position) = self.order.iter().position(|existing| existing == key) {
            if let Some(existing) = self.order.remove(position) {
                self.order.push_back(existing);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        while self.capacity > 0 && self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

//! Monotonic request generations: only the newest request's response applies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Earlier generations become stale.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// A started request for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: String,
    pub generation: u64,
}

/// Latest generation per key. Generations come from one counter shared by
/// all keys and are never reused, even after a key is forgotten.
#[derive(Debug, Default)]
pub struct KeyedGenerations {
    counter: u64,
    latest: HashMap<String, u64>,
}

impl KeyedGenerations {
    pub fn begin(&mut self, key: &str) -> Ticket {
        self.counter += 1;
        self.latest.insert(key.to_string(), self.counter);
        Ticket {
            key: key.to_string(),
            generation: self.counter,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.generation)
    }

    pub fn forget(&mut self, key: &str) {
        self.latest.remove(key);
    }

    pub fn forget_all(&mut self) {
        self.latest.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_generation_is_current() {
        let counter = RequestGeneration::new();
        let first = counter.next();
        let second = counter.next();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn keys_are_independent() {
        let mut gens = KeyedGenerations::default();
        let a1 = gens.begin("a");
        let b1 = gens.begin("b");
        let a2 = gens.begin("a");
        assert!(!gens.is_current(&a1));
        assert!(gens.is_current(&a2));
        assert!(gens.is_current(&b1));
        gens.forget("b");
        assert!(!gens.is_current(&b1));
    }

    #[test]
    fn forgotten_key_never_reissues_a_generation() {
        let mut gens = KeyedGenerations::default();
        let before = gens.begin("a");
        gens.forget("a");
        let after = gens.begin("a");
        assert!(after.generation > before.generation);
        assert!(!gens.is_current(&before));

        gens.forget_all();
        let again = gens.begin("a");
        assert_ne!(again.generation, after.generation);
        assert!(!gens.is_current(&after));
    }
}

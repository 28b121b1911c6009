use std::collections::HashSet;
use std::hash::Hash;

/// Tracks actions that are waiting on a collaborator so a second activation of the
/// same origin can be suppressed until the first one completes.
#[derive(Debug)]
pub struct SingleFlight<K> {
    in_flight: HashSet<K>,
}

impl<K> Default for SingleFlight<K> {
    fn default() -> Self {
        Self {
            in_flight: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash> SingleFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `key` is already outstanding.
    pub fn begin(&mut self, key: K) -> bool {
        self.in_flight.insert(key)
    }

    pub fn finish(&mut self, key: &K) -> bool {
        self.in_flight.remove(key)
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.contains(key)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_begin_is_rejected_until_finish() {
        let mut flights = SingleFlight::new();
        assert!(flights.begin("connect"));
        assert!(!flights.begin("connect"));
        assert!(flights.begin("search"));
        assert!(flights.finish(&"connect"));
        assert!(!flights.finish(&"connect"));
        assert!(flights.begin("connect"));
        assert_eq!(flights.len(), 2);
    }
}

use std::collections::VecDeque;
use crate::address::NUM_SETS;
use crate::cache::CacheSet;

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// Age counters live in the cache blocks themselves and are maintained by the cache, so a policy
/// only needs its own state if it wants to track something else
pub trait ReplacementPolicy {
    /// Updates the policy when a line is installed into a set
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `index`: The set the line was installed into
    /// * `way`: The way within the set which now holds the line
    ///
    /// returns: ()
    fn update_on_install(&mut self, _index: usize, _way: usize) {}

    /// Picks the way to refill within a set on a miss
    ///
    /// Empty ways must always be preferred over evicting a valid line, and the first empty way in
    /// ascending order is used
    ///
    /// # Arguments
    ///
    /// * `index`: The set index
    /// * `set`: The blocks of that set, with ages already bumped for the current access
    ///
    /// returns: usize
    fn get_victim(&mut self, index: usize, set: &CacheSet) -> usize;

    /// Forgets all state, called when the cache is flushed
    fn reset(&mut self) {}
}

fn first_empty_way(set: &CacheSet) -> Option<usize> {
    set.iter().position(|block| !block.valid)
}

#[derive(Default, Debug)]
/// Evicts the line with the greatest age counter, ties going to the lowest way
///
/// This needs no state of its own, it reads the ages the cache keeps per block
pub struct AgeCounter;

impl ReplacementPolicy for AgeCounter {
    fn get_victim(&mut self, _index: usize, set: &CacheSet) -> usize {
        if let Some(way) = first_empty_way(set) {
            return way;
        }
        let mut max_age = set[0].age;
        let mut max_way = 0;
        // Only strictly greater ages replace the running maximum, so ties stay on the lowest way
        let mut way = 1;
        while way < set.len() {
            if set[way].age > max_age {
                max_age = set[way].age;
                max_way = way;
            }
            way += 1;
        }
        max_way
    }
}

/// Keeps an explicit install-ordered list of ways per set, evicting the front of the list
///
/// Ages are bumped uniformly for the whole set and reset on install, so the oldest age is always
/// the earliest surviving install. This gives the same victims as `AgeCounter` without scanning
/// the ages
#[derive(Debug)]
pub struct InstallOrder {
    install_order: Vec<VecDeque<usize>>,
}

impl InstallOrder {
    pub fn new() -> Self {
        Self {
            install_order: vec![VecDeque::new(); NUM_SETS],
        }
    }
}

impl Default for InstallOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for InstallOrder {
    fn update_on_install(&mut self, index: usize, way: usize) {
        let order = &mut self.install_order[index];
        order.retain(|w| *w != way);
        order.push_back(way);
    }

    fn get_victim(&mut self, index: usize, set: &CacheSet) -> usize {
        if let Some(way) = first_empty_way(set) {
            return way;
        }
        // A full set has had every way installed at least once since the last reset
        self.install_order[index].front().copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        self.install_order.iter_mut().for_each(VecDeque::clear);
    }
}

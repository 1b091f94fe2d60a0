use crate::address::{BLOCK_SIZE, NUM_SETS, NUM_WAYS};
use crate::memory::MemoryBlock;
use crate::replacement_policies::{AgeCounter, InstallOrder, ReplacementPolicy};

/// A single cache line. Lives in one (way, set) cell for the whole run and is refilled in place
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CacheBlock {
    pub data: [u16; BLOCK_SIZE],
    pub tag: usize,
    pub valid: bool,
    /// Number of misses to this block's set since it was installed
    pub age: u64,
}

impl CacheBlock {
    pub const EMPTY: CacheBlock = CacheBlock {
        data: [0; BLOCK_SIZE],
        tag: 0,
        valid: false,
        age: 0,
    };
}

/// The ways of one set
pub type CacheSet = [CacheBlock; NUM_WAYS];

/// A generic trait for caches
///
/// Lets the simulator drive any `Cache<R>` through `GenericCache` without caring which replacement
/// policy is in use. Callers are expected to decode addresses themselves, every method takes the
/// tag and set index directly
pub trait CacheTrait {
    /// Looks for a valid line with the given tag in a set, scanning ways 0 to 7
    ///
    /// # Arguments
    ///
    /// * `tag`: The tag of the address
    /// * `index`: The set index of the address
    ///
    /// returns: Option<usize>, the way holding the tag
    fn find(&self, tag: usize, index: usize) -> Option<usize>;

    /// Increments the age of every valid line in a set
    ///
    /// Must be called once per miss, before the refill, so the refilled line ends up younger
    /// than all of its set-mates
    fn bump_ages(&mut self, index: usize);

    /// Asks the replacement policy which way of a set to refill
    fn select_victim(&mut self, index: usize) -> usize;

    /// Copies a memory block into a cell, overwriting whatever was there
    ///
    /// # Arguments
    ///
    /// * `block`: The memory block being cached
    /// * `tag`: The number of that memory block
    /// * `way`: The way to refill, usually from `select_victim`
    /// * `index`: The set to refill
    ///
    /// returns: ()
    fn install(&mut self, block: &MemoryBlock, tag: usize, way: usize, index: usize);

    /// Gets the block stored at a cell
    fn block(&self, way: usize, index: usize) -> &CacheBlock;

    /// Overwrites one word of a resident line
    fn write_word(&mut self, way: usize, index: usize, offset: usize, value: u16);

    /// Invalidates every line and clears the replacement policy
    fn reset(&mut self);

    /// Gets the number of lines which have never been filled since the last reset. Useful for
    /// analysing cache performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// The set-associative cache, parameterised by a replacement policy
///
/// The geometry is fixed at `NUM_WAYS` x `NUM_SETS`, cells are stored set-major so a lookup only
/// touches one contiguous set
pub struct Cache<R: ReplacementPolicy> {
    sets: Vec<CacheSet>,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(policy: R) -> Self {
        Self {
            sets: vec![[CacheBlock::EMPTY; NUM_WAYS]; NUM_SETS],
            replacement_policy: policy,
        }
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn find(&self, tag: usize, index: usize) -> Option<usize> {
        self.sets[index]
            .iter()
            .position(|block| block.valid && block.tag == tag)
    }

    fn bump_ages(&mut self, index: usize) {
        for block in self.sets[index].iter_mut().filter(|b| b.valid) {
            block.age += 1;
        }
    }

    fn select_victim(&mut self, index: usize) -> usize {
        self.replacement_policy.get_victim(index, &self.sets[index])
    }

    fn install(&mut self, block: &MemoryBlock, tag: usize, way: usize, index: usize) {
        let line = &mut self.sets[index][way];
        line.data = *block;
        line.tag = tag;
        line.valid = true;
        line.age = 0;
        self.replacement_policy.update_on_install(index, way);
    }

    fn block(&self, way: usize, index: usize) -> &CacheBlock {
        &self.sets[index][way]
    }

    fn write_word(&mut self, way: usize, index: usize, offset: usize, value: u16) {
        self.sets[index][way].data[offset] = value;
    }

    fn reset(&mut self) {
        self.sets.iter_mut().flatten().for_each(|block| *block = CacheBlock::EMPTY);
        self.replacement_policy.reset();
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.sets.iter().flatten().filter(|b| !b.valid).count()
    }
}

/// Enum for both replacement policies provided by the library
///
/// Explicitly branching on the implementations lets the compiler see the concrete types and
/// inline the policy, which a `dyn CacheTrait` would hide
pub enum GenericCache {
    AgeCounter(Cache<AgeCounter>),
    InstallOrder(Cache<InstallOrder>),
}

impl From<Cache<AgeCounter>> for GenericCache {
    fn from(value: Cache<AgeCounter>) -> Self {
        Self::AgeCounter(value)
    }
}

impl From<Cache<InstallOrder>> for GenericCache {
    fn from(value: Cache<InstallOrder>) -> Self {
        Self::InstallOrder(value)
    }
}

impl CacheTrait for GenericCache {
    fn find(&self, tag: usize, index: usize) -> Option<usize> {
        match self {
            GenericCache::AgeCounter(c) => c.find(tag, index),
            GenericCache::InstallOrder(c) => c.find(tag, index),
        }
    }

    fn bump_ages(&mut self, index: usize) {
        match self {
            GenericCache::AgeCounter(c) => c.bump_ages(index),
            GenericCache::InstallOrder(c) => c.bump_ages(index),
        }
    }

    fn select_victim(&mut self, index: usize) -> usize {
        match self {
            GenericCache::AgeCounter(c) => c.select_victim(index),
            GenericCache::InstallOrder(c) => c.select_victim(index),
        }
    }

    fn install(&mut self, block: &MemoryBlock, tag: usize, way: usize, index: usize) {
        match self {
            GenericCache::AgeCounter(c) => c.install(block, tag, way, index),
            GenericCache::InstallOrder(c) => c.install(block, tag, way, index),
        }
    }

    fn block(&self, way: usize, index: usize) -> &CacheBlock {
        match self {
            GenericCache::AgeCounter(c) => c.block(way, index),
            GenericCache::InstallOrder(c) => c.block(way, index),
        }
    }

    fn write_word(&mut self, way: usize, index: usize, offset: usize, value: u16) {
        match self {
            GenericCache::AgeCounter(c) => c.write_word(way, index, offset, value),
            GenericCache::InstallOrder(c) => c.write_word(way, index, offset, value),
        }
    }

    fn reset(&mut self) {
        match self {
            GenericCache::AgeCounter(c) => c.reset(),
            GenericCache::InstallOrder(c) => c.reset(),
        }
    }

    fn get_uninitialised_line_count(&self) -> usize {
        match self {
            GenericCache::AgeCounter(c) => c.get_uninitialised_line_count(),
            GenericCache::InstallOrder(c) => c.get_uninitialised_line_count(),
        }
    }
}

use rand::Rng;
use crate::address::{BLOCK_SIZE, NUM_MEMORY_BLOCKS};

/// A block of backing memory
pub type MemoryBlock = [u16; BLOCK_SIZE];

/// The memory sitting behind the cache. Always holds exactly `NUM_MEMORY_BLOCKS` blocks
///
/// Blocks are addressed by tag, so only the first 64 are ever reached by an access and addresses
/// sharing a tag share a memory block regardless of their set index. Indices are never checked
/// beyond the slice bounds, the decoder can only produce valid ones
pub struct BackingMemory {
    blocks: Vec<MemoryBlock>,
}

impl BackingMemory {
    /// Creates a memory filled with random words
    pub fn new<G: Rng>(rng: &mut G) -> Self {
        let mut memory = Self {
            blocks: vec![[0; BLOCK_SIZE]; NUM_MEMORY_BLOCKS],
        };
        memory.reset(rng);
        memory
    }

    /// Refills every word with a value drawn uniformly from `[0, 65536)`
    pub fn reset<G: Rng>(&mut self, rng: &mut G) {
        for block in self.blocks.iter_mut() {
            rng.fill(&mut block[..]);
        }
    }

    pub fn read_word(&self, block: usize, offset: usize) -> u16 {
        self.blocks[block][offset]
    }

    pub fn write_word(&mut self, block: usize, offset: usize, value: u16) {
        self.blocks[block][offset] = value;
    }

    /// Gets a whole block, used when refilling a cache line
    pub fn block(&self, block: usize) -> &MemoryBlock {
        &self.blocks[block]
    }
}

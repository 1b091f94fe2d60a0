/// Number of bits in a simulated address
pub const ADDRESS_BITS: u32 = 16;

/// Highest valid address, addresses are word-addressed so this is also the highest word
pub const MAX_ADDRESS: u64 = (1 << ADDRESS_BITS) - 1;

/// Number of 16-bit words held by each memory and cache block
pub const BLOCK_SIZE: usize = 32;

/// Number of sets in the cache
pub const NUM_SETS: usize = 32;

/// Number of ways in each set
pub const NUM_WAYS: usize = 8;

/// Number of blocks making up the backing memory
pub const NUM_MEMORY_BLOCKS: usize = 1024;

const OFFSET_BITS: u32 = BLOCK_SIZE.trailing_zeros();
const INDEX_BITS: u32 = NUM_SETS.trailing_zeros();

/// An address split into the parts used to locate it in the cache
///
/// The tag doubles as the number of the backing memory block a line is filled from
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DecodedAddress {
    pub tag: usize,
    pub index: usize,
    pub offset: usize,
}

impl DecodedAddress {
    /// Reassembles the linear address
    pub fn address(&self) -> u16 {
        ((self.tag << (INDEX_BITS + OFFSET_BITS)) | (self.index << OFFSET_BITS) | self.offset) as u16
    }
}

/// Splits an address into its tag, set index and word offset
///
/// With 32-word blocks and 32 sets this is 5 offset bits, 5 index bits and the remaining 6 bits
/// as the tag:
///
/// ```text
///   tag     index  offset
/// |------|-----|-----|
///  15  10 9   5 4   0
/// ```
///
/// # Examples
///
/// ```
/// use assoccache::address::decode;
/// let decoded = decode(0x1A3E);
/// assert_eq!((decoded.tag, decoded.index, decoded.offset), (6, 17, 30));
/// ```
pub fn decode(address: u16) -> DecodedAddress {
    let address = address as usize;
    DecodedAddress {
        offset: address % BLOCK_SIZE,
        index: (address / BLOCK_SIZE) % NUM_SETS,
        tag: address / (BLOCK_SIZE * NUM_SETS),
    }
}

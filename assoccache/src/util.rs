use std::fmt::Write;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::address::{BLOCK_SIZE, MAX_ADDRESS, NUM_MEMORY_BLOCKS, NUM_SETS};

/// Gets addresses which all land in the same set but belong to different memory blocks
///
/// # Arguments
///
/// * `index`: The set the addresses map to
/// * `offset`: The word offset within each block
/// * `count`: How many distinct tags to produce, at most `NUM_MEMORY_BLOCKS / NUM_SETS`
///
/// returns: Vec<u64>
pub fn same_set_addresses(index: usize, offset: usize, count: usize) -> Vec<u64> {
    (0..count.min(NUM_MEMORY_BLOCKS / NUM_SETS))
        .map(|tag| ((tag * NUM_SETS + index) * BLOCK_SIZE + offset) as u64)
        .collect()
}

/// Generates a random instruction script for benchmarks and tests
///
/// Accesses are drawn from a small pool of hot addresses most of the time so there is a mix of hits
/// and misses. Every so often a miss rate report is requested, flushes are rare
///
/// # Arguments
///
/// * `seed`: Seed for the generator, the same seed always gives the same script
/// * `len`: The number of lines
///
/// returns: String
pub fn generate_script(seed: u64, len: usize) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let hot: Vec<u64> = (0..64).map(|_| rng.gen_range(0..=MAX_ADDRESS)).collect();
    let mut script = String::with_capacity(len * 12);
    for _ in 0..len {
        let address = if rng.gen_bool(0.8) {
            (hot[rng.gen_range(0..hot.len())] + rng.gen_range(0..4)).min(MAX_ADDRESS)
        } else {
            rng.gen_range(0..=MAX_ADDRESS)
        };
        // Writing to a String can't fail
        let _ = match rng.gen_range(0..100) {
            0 => writeln!(script, "FLUSH"),
            1..=4 => writeln!(script, "MR"),
            5..=34 => writeln!(script, "W {},{}", address, rng.gen_range(0..=u8::MAX)),
            _ => writeln!(script, "R {}", address),
        };
    }
    script
}

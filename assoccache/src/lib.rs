//! # AssocCache
//!
//! AssocCache simulates an 8-way set-associative cache of 32 sets in front of a fixed backing
//! memory of 1024 blocks, and measures its hit and miss rate over a script of byte reads and
//! writes to a 16-bit address space
//!
//! The cache evicts by age, writes go through to memory, and write misses don't allocate. The
//! geometry is fixed, but the cache is parameterised by its replacement policy so alternative
//! policies can be swapped in and compared

/// Contains the address decoder and the fixed cache geometry
pub mod address;

/// Contains the implementation of the cache, and a utility enum for the provided policies
pub mod cache;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the error types for accesses, scripts and configuration
pub mod error;

/// Contains the decoder for instruction script lines
pub mod instruction;

/// Contains a reader for script files
pub mod io;

/// Contains the backing memory
pub mod memory;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator, which owns the cache, memory and statistics and runs scripts
pub mod simulator;

/// Contains the hit/miss counters and the serialisable simulation result
pub mod stats;

#[cfg(test)]
mod test;

/// Contains utilities for generating scripts for tests and benchmarks.
pub mod util;

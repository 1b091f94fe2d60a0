use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace, warn};
use crate::address::{decode, DecodedAddress, MAX_ADDRESS};
use crate::cache::{Cache, CacheTrait, GenericCache};
use crate::config::{ParseMode, ReplacementPolicyConfig, SimulatorConfig};
use crate::error::{AccessError, ScriptError};
use crate::instruction::{format_miss_rate, parse_line, Instruction};
use crate::memory::BackingMemory;
use crate::replacement_policies::{AgeCounter, InstallOrder};
use crate::stats::{SimulationResult, StatsTracker};

/// The simulator owns all of the simulated state: the cache, the memory behind it and the hit/miss
/// counters. Every access runs to completion before the next starts.
///
/// Writes go straight to memory. A write hit also updates the cached copy, a write miss doesn't
/// allocate a line, so memory is always current and evicting a line never loses data.
pub struct Simulator {
    cache: GenericCache,
    memory: BackingMemory,
    stats: StatsTracker,
    rng: StdRng,
    parse_mode: ParseMode,
    simulation_time: Duration,
}

impl Simulator {
    /// Creates a new, already initialised, simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A simulator configuration, usually resulting from parsing JSON
    ///
    /// returns: Simulator
    pub fn new(config: &SimulatorConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cache = match config.replacement_policy {
            ReplacementPolicyConfig::AgeCounter => GenericCache::from(Cache::new(AgeCounter)),
            ReplacementPolicyConfig::InstallOrder => GenericCache::from(Cache::new(InstallOrder::new())),
        };
        Self {
            cache,
            memory: BackingMemory::new(&mut rng),
            stats: StatsTracker::default(),
            rng,
            parse_mode: config.parse_mode,
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Fills memory with fresh random words, invalidates every cache line and zeroes the counters
    pub fn init(&mut self) {
        debug!("Initialising memory, cache and statistics");
        self.memory.reset(&mut self.rng);
        self.cache.reset();
        self.stats = StatsTracker::default();
    }

    /// Reads the word at an address, refilling a line on a miss
    pub fn read_word(&mut self, address: u64) -> Result<u16, AccessError> {
        let DecodedAddress { tag, index, offset } = validate_address(address)?;
        let way = match self.cache.find(tag, index) {
            Some(way) => {
                trace!(address, way, index, "Read hit");
                self.stats.record_hit();
                way
            }
            None => {
                trace!(address, index, "Read miss");
                self.stats.record_miss();
                self.refill(tag, index)
            }
        };
        Ok(self.cache.block(way, index).data[offset])
    }

    /// Reads the byte at an address. This is the low byte of the stored word
    pub fn read_byte(&mut self, address: u64) -> Result<u8, AccessError> {
        Ok(self.read_word(address)? as u8)
    }

    /// Writes a byte to memory, and to the cached line if the address is resident
    ///
    /// A write miss is counted but leaves the cache untouched
    pub fn write_byte(&mut self, address: u64, value: u64) -> Result<(), AccessError> {
        let DecodedAddress { tag, index, offset } = validate_address(address)?;
        let value = u8::try_from(value).map_err(|_| AccessError::InvalidValue(value.to_string()))? as u16;
        self.memory.write_word(tag, offset, value);
        match self.cache.find(tag, index) {
            Some(way) => {
                trace!(address, way, index, "Write hit");
                self.stats.record_hit();
                self.cache.write_word(way, index, offset, value);
            }
            None => {
                trace!(address, index, "Write miss");
                self.stats.record_miss();
            }
        }
        Ok(())
    }

    pub fn miss_rate(&self) -> f64 {
        self.stats.miss_rate()
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn cache(&self) -> &GenericCache {
        &self.cache
    }

    pub fn memory(&self) -> &BackingMemory {
        &self.memory
    }

    /// Checks whether the line holding an address is cached, without touching any state
    pub fn is_resident(&self, address: u64) -> Result<bool, AccessError> {
        let DecodedAddress { tag, index, .. } = validate_address(address)?;
        Ok(self.cache.find(tag, index).is_some())
    }

    /// Runs a single instruction, returning the miss rate for `MR`
    pub fn execute(&mut self, instruction: Instruction) -> Result<Option<f64>, AccessError> {
        match instruction {
            Instruction::Flush => self.init(),
            Instruction::Read { address } => {
                self.read_byte(address)?;
            }
            Instruction::Write { address, value } => self.write_byte(address, value)?,
            Instruction::MissRate => return Ok(Some(self.miss_rate())),
        }
        Ok(None)
    }

    /// Runs an instruction script, one instruction per line, writing each `MR` report to `out`
    ///
    /// It supports being called multiple times, and will update the time taken to simulate
    /// accordingly. The state carries over between calls, only `FLUSH` resets it
    ///
    /// # Arguments
    ///
    /// * `script`: The script to run
    /// * `out`: Where miss rate reports are written
    ///
    /// returns: Result<SimulationResult, ScriptError>, the counters after the last line
    pub fn simulate<R: BufRead, W: Write>(&mut self, script: R, out: &mut W) -> Result<SimulationResult, ScriptError> {
        let start = Instant::now();
        // Runs that stop early still count towards the simulation time
        let outcome = self.run_script(script, out);
        self.simulation_time += start.elapsed();
        outcome?;
        Ok(SimulationResult::from(&self.stats))
    }

    fn run_script<R: BufRead, W: Write>(&mut self, script: R, out: &mut W) -> Result<(), ScriptError> {
        for (number, line) in script.split(b'\n').enumerate() {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let number = number + 1;
            let outcome = match parse_line(&line) {
                Some(decoded) => decoded.and_then(|instruction| self.execute(instruction)),
                None if self.parse_mode == ParseMode::Strict && !line.trim().is_empty() => {
                    return Err(ScriptError::Malformed { line: number, text: line.trim().to_string() });
                }
                None => {
                    debug!(line = number, "Skipping unrecognised line {:?}", line.trim());
                    continue;
                }
            };
            match outcome {
                Ok(Some(miss_rate)) => writeln!(out, "{}", format_miss_rate(miss_rate))?,
                Ok(None) => {}
                Err(source) if self.parse_mode == ParseMode::Strict => {
                    return Err(ScriptError::Access { line: number, source });
                }
                Err(e) => warn!(line = number, "Skipping instruction: {e}"),
            }
        }
        Ok(())
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of cache lines which are currently empty
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.cache.get_uninitialised_line_count()
    }

    // Ages are bumped before the victim is chosen, so the refilled line is the youngest in its set
    fn refill(&mut self, tag: usize, index: usize) -> usize {
        self.cache.bump_ages(index);
        let way = self.cache.select_victim(index);
        let victim = self.cache.block(way, index);
        if victim.valid {
            trace!(index, way, evicted_tag = victim.tag, age = victim.age, "Evicting line");
        }
        self.cache.install(self.memory.block(tag), tag, way, index);
        way
    }
}

fn validate_address(address: u64) -> Result<DecodedAddress, AccessError> {
    if address > MAX_ADDRESS {
        return Err(AccessError::InvalidAddress(address.to_string()));
    }
    Ok(decode(address as u16))
}

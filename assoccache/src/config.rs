use std::fs::File;
use std::io::BufReader;
use serde::Deserialize;
use crate::error::ConfigError;

/// A simulator configuration. The cache geometry is fixed, so this only covers how a run behaves
#[derive(Debug, Default, Deserialize)]
pub struct SimulatorConfig {
    /// Seed for the random memory contents. Seeded from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub replacement_policy: ReplacementPolicyConfig,
    #[serde(default = "ParseMode::default")]
    pub parse_mode: ParseMode,
}

impl SimulatorConfig {
    /// Reads a JSON configuration from a file
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// The replacement policy - age counters, or an install-ordered list. Defaults to age counters.
///
/// Both evict the same lines, the list just avoids scanning ages
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(alias = "age")]
    AgeCounter,
    #[serde(alias = "fifo")]
    InstallOrder,
}

impl Default for ReplacementPolicyConfig {
    fn default() -> Self {
        ReplacementPolicyConfig::AgeCounter
    }
}

/// How the interpreter treats lines it can't run. Defaults to lenient.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub enum ParseMode {
    /// Unrecognised lines and rejected accesses are skipped
    #[serde(alias = "lenient")]
    Lenient,
    /// Unrecognised lines and rejected accesses stop the run
    #[serde(alias = "strict")]
    Strict,
}

impl Default for ParseMode {
    fn default() -> Self {
        ParseMode::Lenient
    }
}

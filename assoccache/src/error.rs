use std::io;
use thiserror::Error;

/// Raised when a read or write is issued with operands the simulated hardware can't represent
///
/// The operand is kept as written, script operands may be negative or too large for any integer
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AccessError {
    #[error("address {0} is outside the 16-bit address space")]
    InvalidAddress(String),
    #[error("value {0} doesn't fit in a byte")]
    InvalidValue(String),
}

/// Errors produced while running an instruction script
///
/// Malformed lines and rejected accesses only surface in strict mode, the lenient interpreter
/// skips them
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unrecognised instruction {text:?}")]
    Malformed { line: usize, text: String },
    #[error("line {line}: {source}")]
    Access {
        line: usize,
        #[source]
        source: AccessError,
    },
    #[error("couldn't read the script: {0}")]
    Io(#[from] io::Error),
}

/// Errors loading a simulator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't open the config file at path {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("couldn't parse the config file: {0}")]
    Parse(#[from] serde_json::Error),
}

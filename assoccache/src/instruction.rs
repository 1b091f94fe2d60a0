use lazy_static::lazy_static;
use regex::Regex;
use crate::error::AccessError;

lazy_static! {
    static ref READ_PATTERN: Regex = Regex::new(r"^R\s+(?P<address>-?\d+)$").unwrap();
    static ref WRITE_PATTERN: Regex =
        Regex::new(r"^W\s+(?P<address>-?\d+)\s*,\s*(?P<value>-?\d+)$").unwrap();
}

/// One decoded line of an instruction script
///
/// Operands are kept wide so range checking against the address space and the byte range is left
/// to the simulator
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// `FLUSH`, re-initialises memory, cache and statistics
    Flush,
    /// `R <address>`
    Read { address: u64 },
    /// `W <address>,<value>`
    Write { address: u64, value: u64 },
    /// `MR`, reports the miss rate
    MissRate,
}

/// Decodes a single script line
///
/// Returns `None` for anything that isn't an instruction. A recognised read or write whose
/// operand is negative or too large for `u64` can never be in range, so it is decoded to the
/// matching `AccessError` rather than treated as unrecognised
///
/// Surrounding whitespace (including the line terminator) is ignored. Operands are decimal
///
/// # Examples
///
/// ```
/// use assoccache::error::AccessError;
/// use assoccache::instruction::{parse_line, Instruction};
/// assert_eq!(parse_line("W 1030, 7\n"), Some(Ok(Instruction::Write { address: 1030, value: 7 })));
/// assert_eq!(parse_line("R -1"), Some(Err(AccessError::InvalidAddress("-1".to_string()))));
/// assert_eq!(parse_line("READ 4"), None);
/// ```
pub fn parse_line(line: &str) -> Option<Result<Instruction, AccessError>> {
    let line = line.trim();
    match line {
        "FLUSH" => return Some(Ok(Instruction::Flush)),
        "MR" => return Some(Ok(Instruction::MissRate)),
        _ => {}
    }
    if let Some(captures) = READ_PATTERN.captures(line) {
        return Some(parse_operand(&captures["address"], AccessError::InvalidAddress)
            .map(|address| Instruction::Read { address }));
    }
    if let Some(captures) = WRITE_PATTERN.captures(line) {
        let write = parse_operand(&captures["address"], AccessError::InvalidAddress).and_then(|address| {
            let value = parse_operand(&captures["value"], AccessError::InvalidValue)?;
            Ok(Instruction::Write { address, value })
        });
        return Some(write);
    }
    None
}

fn parse_operand(text: &str, invalid: fn(String) -> AccessError) -> Result<u64, AccessError> {
    text.parse().map_err(|_| invalid(text.to_string()))
}

/// Formats a miss rate the way the `MR` instruction reports it
pub fn format_miss_rate(miss_rate: f64) -> String {
    format!("Miss rate: {miss_rate:.6}")
}

use std::error::Error;
use crate::address::{decode, BLOCK_SIZE, MAX_ADDRESS, NUM_SETS, NUM_WAYS};
use crate::cache::CacheTrait;
use crate::config::{ParseMode, ReplacementPolicyConfig, SimulatorConfig};
use crate::error::{AccessError, ScriptError};
use crate::simulator::Simulator;
use crate::stats::SimulationResult;
use crate::util::{generate_script, same_set_addresses};

fn seeded(seed: u64) -> Simulator {
    Simulator::new(&SimulatorConfig {
        seed: Some(seed),
        ..Default::default()
    })
}

fn run(simulator: &mut Simulator, script: &str) -> Result<(SimulationResult, String), Box<dyn Error>> {
    let mut out = Vec::new();
    let result = simulator.simulate(script.as_bytes(), &mut out)?;
    Ok((result, String::from_utf8(out)?))
}

#[test]
fn decomposition_reassembles_every_address() {
    for address in 0..=MAX_ADDRESS as u16 {
        let decoded = decode(address);
        assert!(decoded.offset < BLOCK_SIZE);
        assert!(decoded.index < NUM_SETS);
        assert!(decoded.tag < 64);
        assert_eq!(decoded.tag * 1024 + decoded.index * 32 + decoded.offset, address as usize);
        assert_eq!(decoded.address(), address);
    }
}

#[test]
fn cold_read_misses_then_hits() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(1);
    let first = simulator.read_byte(40_000)?;
    assert_eq!((simulator.stats().hits(), simulator.stats().misses()), (0, 1));
    let second = simulator.read_byte(40_000)?;
    assert_eq!((simulator.stats().hits(), simulator.stats().misses()), (1, 1));
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn read_returns_low_byte_of_memory_word() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(2);
    let decoded = decode(12_345);
    let word = simulator.memory().read_word(decoded.tag, decoded.offset);
    assert_eq!(simulator.read_word(12_345)?, word);
    assert_eq!(simulator.read_byte(12_345)?, word as u8);
    Ok(())
}

#[test]
fn write_then_read_returns_value() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(3);
    // Not resident
    simulator.write_byte(5000, 17)?;
    assert_eq!(simulator.read_byte(5000)?, 17);
    // Resident
    simulator.write_byte(5001, 200)?;
    assert_eq!(simulator.read_byte(5001)?, 200);
    assert_eq!(simulator.read_word(5001)?, 200);
    Ok(())
}

#[test]
fn write_hit_updates_cache_and_memory() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(4);
    simulator.read_byte(300)?;
    simulator.write_byte(301, 99)?;
    assert_eq!((simulator.stats().hits(), simulator.stats().misses()), (1, 1));
    let decoded = decode(301);
    assert_eq!(simulator.memory().read_word(decoded.tag, decoded.offset), 99);
    let way = simulator.cache().find(decoded.tag, decoded.index).ok_or("line should be resident")?;
    assert_eq!(simulator.cache().block(way, decoded.index).data[decoded.offset], 99);
    Ok(())
}

#[test]
fn write_miss_does_not_allocate() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(5);
    simulator.write_byte(2048, 1)?;
    assert!(!simulator.is_resident(2048)?);
    assert_eq!(simulator.stats().misses(), 1);
    assert_eq!(simulator.get_uninitialised_line_count(), NUM_WAYS * NUM_SETS);
    // The write went to memory, so the later fill picks it up
    assert_eq!(simulator.read_byte(2048)?, 1);
    assert_eq!(simulator.stats().misses(), 2);
    Ok(())
}

#[test]
fn empty_ways_fill_before_eviction() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(6);
    let addresses = same_set_addresses(9, 3, NUM_WAYS + 1);
    for address in &addresses[..NUM_WAYS] {
        simulator.read_byte(*address)?;
    }
    for address in &addresses[..NUM_WAYS] {
        assert!(simulator.is_resident(*address)?);
    }
    // Way 0 was filled first, so it is the oldest
    let ages: Vec<u64> = (0..NUM_WAYS).map(|way| simulator.cache().block(way, 9).age).collect();
    assert_eq!(ages, vec![7, 6, 5, 4, 3, 2, 1, 0]);

    simulator.read_byte(addresses[NUM_WAYS])?;
    assert!(!simulator.is_resident(addresses[0])?);
    assert!(simulator.is_resident(addresses[NUM_WAYS])?);
    assert_eq!(simulator.cache().block(0, 9).tag, decode(addresses[NUM_WAYS] as u16).tag);
    assert_eq!(simulator.cache().block(0, 9).age, 0);
    assert_eq!(simulator.cache().block(1, 9).age, 7);
    assert_eq!(simulator.stats().misses(), 9);
    Ok(())
}

#[test]
fn hits_do_not_refresh_age() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(7);
    let addresses = same_set_addresses(0, 0, NUM_WAYS + 1);
    for address in &addresses[..NUM_WAYS] {
        simulator.read_byte(*address)?;
    }
    // Hitting the oldest line leaves it the oldest
    simulator.read_byte(addresses[0])?;
    simulator.read_byte(addresses[NUM_WAYS])?;
    assert!(!simulator.is_resident(addresses[0])?);
    assert!(simulator.is_resident(addresses[1])?);
    Ok(())
}

#[test]
fn eviction_follows_install_order_across_policies() -> Result<(), Box<dyn Error>> {
    let script: String = same_set_addresses(31, 31, 20)
        .iter()
        .cycle()
        .take(200)
        .enumerate()
        .map(|(i, a)| format!("R {}\n", (*a + (i as u64 % 7) * 1024 * 3) % (MAX_ADDRESS + 1)))
        .collect();
    let mut results = Vec::new();
    for policy in [ReplacementPolicyConfig::AgeCounter, ReplacementPolicyConfig::InstallOrder] {
        let mut simulator = Simulator::new(&SimulatorConfig {
            seed: Some(8),
            replacement_policy: policy,
            ..Default::default()
        });
        let (result, _) = run(&mut simulator, &script)?;
        let tags: Vec<usize> = (0..NUM_WAYS).map(|way| simulator.cache().block(way, 31).tag).collect();
        results.push((result, tags));
    }
    assert_eq!(results[0], results[1]);
    Ok(())
}

#[test]
fn miss_rate_of_two_blocks() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(9);
    let (result, out) = run(&mut simulator, "R 0\nR 0\nR 1024\nMR\n")?;
    assert_eq!(result, SimulationResult { hits: 1, misses: 2, miss_rate: 2.0 / 3.0 });
    assert_eq!(out, "Miss rate: 0.666667\n");
    Ok(())
}

#[test]
fn neighbouring_words_share_a_line() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(10);
    let (result, _) = run(&mut simulator, "R 0\nR 0\nR 1\n")?;
    assert_eq!((result.hits, result.misses), (2, 1));
    Ok(())
}

#[test]
fn miss_rate_is_zero_before_any_access() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(11);
    let (_, out) = run(&mut simulator, "MR\n")?;
    assert_eq!(out, "Miss rate: 0.000000\n");
    assert_eq!(simulator.miss_rate(), 0.0);
    Ok(())
}

#[test]
fn flush_resets_everything() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(12);
    let (_, out) = run(&mut simulator, "R 10\nR 10\nW 10,5\nMR\nFLUSH\nMR\nR 10\nMR\n")?;
    assert_eq!(out, "Miss rate: 0.333333\nMiss rate: 0.000000\nMiss rate: 1.000000\n");
    assert_eq!(simulator.get_uninitialised_line_count(), NUM_WAYS * NUM_SETS - 1);
    Ok(())
}

#[test]
fn flush_redraws_memory() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(13);
    let before: Vec<u16> = (0..1024).map(|block| simulator.memory().read_word(block, 0)).collect();
    simulator.init();
    let after: Vec<u16> = (0..1024).map(|block| simulator.memory().read_word(block, 0)).collect();
    assert_ne!(before, after);
    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> Result<(), Box<dyn Error>> {
    let mut a = seeded(14);
    let mut b = seeded(14);
    for address in [0, 77, 1024, 65535] {
        assert_eq!(a.read_word(address)?, b.read_word(address)?);
    }
    Ok(())
}

#[test]
fn out_of_range_operands_are_rejected() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(15);
    assert_eq!(simulator.read_byte(65536), Err(AccessError::InvalidAddress("65536".to_string())));
    assert_eq!(simulator.write_byte(70_000, 1), Err(AccessError::InvalidAddress("70000".to_string())));
    assert_eq!(simulator.write_byte(12, 256), Err(AccessError::InvalidValue("256".to_string())));
    assert_eq!(simulator.is_resident(1 << 20), Err(AccessError::InvalidAddress("1048576".to_string())));
    // Rejected accesses leave no trace
    assert_eq!(simulator.stats().accesses(), 0);
    assert_eq!(simulator.read_byte(65535)?, simulator.read_byte(65535)?);
    Ok(())
}

#[test]
fn lenient_mode_skips_bad_lines() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(16);
    let script = "# comment\nR 5\nREAD 5\n\nW 5,300\nR 99999\nW 5 7\nR 5\r\nMR\n";
    let (result, out) = run(&mut simulator, script)?;
    assert_eq!((result.hits, result.misses), (1, 1));
    assert_eq!(out, "Miss rate: 0.500000\n");
    Ok(())
}

#[test]
fn strict_mode_reports_malformed_lines() {
    let mut simulator = Simulator::new(&SimulatorConfig {
        seed: Some(17),
        parse_mode: ParseMode::Strict,
        ..Default::default()
    });
    let err = simulator.simulate("R 1\n\nR two\n".as_bytes(), &mut std::io::sink()).unwrap_err();
    match err {
        ScriptError::Malformed { line, text } => {
            assert_eq!(line, 3);
            assert_eq!(text, "R two");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn strict_mode_reports_rejected_accesses() {
    let mut simulator = Simulator::new(&SimulatorConfig {
        seed: Some(18),
        parse_mode: ParseMode::Strict,
        ..Default::default()
    });
    let err = simulator.simulate("W 1,2\nW 1,1000\n".as_bytes(), &mut std::io::sink()).unwrap_err();
    match err {
        ScriptError::Access { line, source } => {
            assert_eq!(line, 2);
            assert_eq!(source, AccessError::InvalidValue("1000".to_string()));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn generated_script_counts_every_access() -> Result<(), Box<dyn Error>> {
    let script = generate_script(19, 5_000);
    let mut simulator = seeded(19);
    let (result, out) = run(&mut simulator, &script)?;
    let lines: Vec<&str> = script.lines().collect();
    let last_flush = lines.iter().rposition(|l| *l == "FLUSH").map_or(0, |i| i + 1);
    let accesses = lines[last_flush..].iter().filter(|l| l.starts_with("R ") || l.starts_with("W ")).count();
    assert_eq!((result.hits + result.misses) as usize, accesses);
    assert_eq!(out.lines().count(), script.lines().filter(|l| *l == "MR").count());
    Ok(())
}

#[test]
fn config_accepts_aliases() -> Result<(), Box<dyn Error>> {
    let config: SimulatorConfig = serde_json::from_str(r#"{"seed": 3, "replacement_policy": "fifo", "parse_mode": "strict"}"#)?;
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.replacement_policy, ReplacementPolicyConfig::InstallOrder);
    assert_eq!(config.parse_mode, ParseMode::Strict);
    let config: SimulatorConfig = serde_json::from_str("{}")?;
    assert_eq!(config.seed, None);
    assert_eq!(config.replacement_policy, ReplacementPolicyConfig::AgeCounter);
    assert_eq!(config.parse_mode, ParseMode::Lenient);
    Ok(())
}

fn strict(seed: u64) -> Simulator {
    Simulator::new(&SimulatorConfig {
        seed: Some(seed),
        parse_mode: ParseMode::Strict,
        ..Default::default()
    })
}

#[test]
fn strict_mode_names_unrepresentable_operands() {
    for (script, expected) in [
        ("R -1\n", AccessError::InvalidAddress("-1".to_string())),
        ("R 99999999999999999999999\n", AccessError::InvalidAddress("99999999999999999999999".to_string())),
        ("W 5,-3\n", AccessError::InvalidValue("-3".to_string())),
        ("W -5,3\n", AccessError::InvalidAddress("-5".to_string())),
    ] {
        let mut simulator = strict(20);
        match simulator.simulate(script.as_bytes(), &mut std::io::sink()) {
            Err(ScriptError::Access { line, source }) => {
                assert_eq!(line, 1);
                assert_eq!(source, expected, "{script:?}");
            }
            other => panic!("unexpected result {other:?} for {script:?}"),
        }
        assert_eq!(simulator.stats().accesses(), 0);
    }
}

#[test]
fn lenient_mode_skips_unrepresentable_operands() -> Result<(), Box<dyn Error>> {
    let mut simulator = seeded(21);
    let (result, _) = run(&mut simulator, "R -1\nW 5,-3\nR 99999999999999999999999\nR 5\n")?;
    assert_eq!((result.hits, result.misses), (0, 1));
    Ok(())
}

#[test]
fn failed_runs_still_count_towards_execution_time() {
    let mut simulator = strict(22);
    let script = format!("{}R two\n", "R 1\n".repeat(20_000));
    assert!(simulator.simulate(script.as_bytes(), &mut std::io::sink()).is_err());
    assert_eq!(simulator.stats().accesses(), 20_000);
    assert!(*simulator.get_execution_time() > std::time::Duration::ZERO);
}

//! Human-readable strategy exports and RFI range dumps.
//!
//! These are diagnostics consumed by external viewers, not part of the
//! training contract.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::cfr::StrategyTable;
use crate::error::SolverError;
use crate::game::{Position, Street};

/// Per-street info-set counts for a table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreetCounts {
    pub preflop: usize,
    pub flop: usize,
    pub turn: usize,
    pub river: usize,
}

/// Count info sets per street by inspecting key fields.
#[must_use]
pub fn street_counts(table: &StrategyTable) -> StreetCounts {
    let mut counts = StreetCounts::default();
    for key in table.keys() {
        match key.split('|').nth(1) {
            Some("PREFLOP") => counts.preflop += 1,
            Some("FLOP") => counts.flop += 1,
            Some("TURN") => counts.turn += 1,
            Some("RIVER") => counts.river += 1,
            _ => {}
        }
    }
    counts
}

/// Write an ASCII table of every info set and its average strategy,
/// sorted by key. `filter` restricts output to keys containing the
/// given substring.
///
/// # Errors
///
/// Propagates I/O failures.
pub fn write_average_strategies<W: Write>(
    table: &StrategyTable,
    writer: &mut W,
    filter: Option<&str>,
) -> Result<(), SolverError> {
    let mut keys = table.keys();
    keys.sort();

    writeln!(writer, "Total info sets: {}", keys.len())?;
    let counts = street_counts(table);
    writeln!(
        writer,
        "Preflop: {}  Flop: {}  Turn: {}  River: {}",
        counts.preflop, counts.flop, counts.turn, counts.river
    )?;
    writeln!(writer)?;

    for key in keys {
        if let Some(pattern) = filter {
            if !key.contains(pattern) {
                continue;
            }
        }
        writeln!(writer, "{key}")?;
        let average = table.average(&key);
        let mut rows: Vec<_> = average.into_iter().collect();
        rows.sort_by_key(|(action, _)| (action.tag(), action.amount()));
        for (action, probability) in rows {
            let label = action.to_string();
            writeln!(writer, "    {label:<14} {probability:.4}")?;
        }
    }
    Ok(())
}

/// Write the strategy export to a file.
///
/// # Errors
///
/// Propagates I/O failures.
pub fn export_strategy_file<P: AsRef<Path>>(
    table: &StrategyTable,
    path: P,
    filter: Option<&str>,
) -> Result<(), SolverError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_average_strategies(table, &mut writer, filter)
}

/// Raise-first-in frequency per preflop bucket for one seat: the summed
/// BET/RAISE probability at info sets with an empty action history.
#[must_use]
pub fn rfi_frequencies(table: &StrategyTable, seat: Position) -> FxHashMap<u32, f64> {
    let mut frequencies = FxHashMap::default();
    for key in table.keys() {
        let mut fields = key.split('|');
        let (Some(position), Some(street), Some(bucket), Some(history)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if position != seat.label() || street != Street::Preflop.label() || !history.is_empty() {
            continue;
        }
        let Ok(bucket) = bucket.parse::<u32>() else {
            continue;
        };
        let raise_mass: f64 = table
            .average(&key)
            .iter()
            .filter(|(action, _)| action.is_aggressive())
            .map(|(_, &p)| p)
            .sum();
        frequencies.insert(bucket, raise_mass);
    }
    frequencies
}

/// Write RFI range files for the button and small blind.
///
/// Each file lists every preflop bucket with its raise-first-in
/// frequency as a percentage.
///
/// # Errors
///
/// Propagates I/O failures.
pub fn write_rfi_ranges<P: AsRef<Path>>(
    table: &StrategyTable,
    preflop_buckets: u32,
    btn_path: P,
    sb_path: P,
) -> Result<(), SolverError> {
    log::info!("extracting RFI ranges over {preflop_buckets} preflop buckets");
    for (seat, path) in [
        (Position::Btn, btn_path.as_ref()),
        (Position::Sb, sb_path.as_ref()),
    ] {
        let frequencies = rfi_frequencies(table, seat);
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "# {} RFI range ({preflop_buckets} preflop buckets)",
            seat.label()
        )?;
        for bucket in 0..preflop_buckets {
            let frequency = frequencies.get(&bucket).copied().unwrap_or(0.0);
            writeln!(writer, "Bucket {bucket}: {:.1}%", frequency * 100.0)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;

    fn sample_table() -> StrategyTable {
        let table = StrategyTable::new();
        // BTN open node: raises 70%.
        table.add_to_sum("BTN|PREFLOP|0|", Action::Fold, 0.3);
        table.add_to_sum("BTN|PREFLOP|0|", Action::Raise(250), 0.7);
        // SB after a BTN fold: not an RFI-empty history.
        table.add_to_sum("SB|PREFLOP|2|BTN:f", Action::Call(50), 1.0);
        // SB open node, always folds.
        table.add_to_sum("SB|PREFLOP|1|", Action::Fold, 2.0);
        // One postflop node.
        table.add_to_sum("BB|FLOP|4|BTN:c100/BB:x", Action::Check, 1.0);
        table
    }

    #[test]
    fn street_counts_parse_keys() {
        let counts = street_counts(&sample_table());
        assert_eq!(counts.preflop, 3);
        assert_eq!(counts.flop, 1);
        assert_eq!(counts.turn, 0);
    }

    #[test]
    fn export_lists_sorted_keys_with_probabilities() {
        let mut out = Vec::new();
        write_average_strategies(&sample_table(), &mut out, None).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total info sets: 4"));
        let btn = text.find("BTN|PREFLOP|0|").unwrap();
        let sb = text.find("SB|PREFLOP|1|").unwrap();
        assert!(btn < sb, "keys must be sorted");
        assert!(text.contains("RAISE 2.50     0.7000"));
    }

    #[test]
    fn export_filter_restricts_output() {
        let mut out = Vec::new();
        write_average_strategies(&sample_table(), &mut out, Some("FLOP")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("BB|FLOP|4|"));
        assert!(!text.contains("BTN|PREFLOP|0|\n"));
    }

    #[test]
    fn rfi_only_counts_empty_history_nodes() {
        let table = sample_table();
        let btn = rfi_frequencies(&table, Position::Btn);
        assert!((btn[&0] - 0.7).abs() < 1e-12);

        let sb = rfi_frequencies(&table, Position::Sb);
        assert!((sb[&1] - 0.0).abs() < 1e-12);
        assert!(!sb.contains_key(&2), "non-empty history must be excluded");
    }

    #[test]
    fn rfi_files_cover_every_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let btn = dir.path().join("btn.txt");
        let sb = dir.path().join("sb.txt");
        write_rfi_ranges(&sample_table(), 3, &btn, &sb).unwrap();

        let btn_text = std::fs::read_to_string(&btn).unwrap();
        assert!(btn_text.contains("Bucket 0: 70.0%"));
        assert!(btn_text.contains("Bucket 1: 0.0%"));
        assert!(btn_text.contains("Bucket 2: 0.0%"));

        let sb_text = std::fs::read_to_string(&sb).unwrap();
        assert!(sb_text.starts_with("# SB RFI range"));
    }
}

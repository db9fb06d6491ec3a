use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pressquote_core::config::AppConfig;
use pressquote_core::{
    BoardInputs, PricingSettings, ProcessEntry, ProcessId, ProcessKind, ProcessList,
    QuantityInputs, QuotationSnapshot,
};
use serde::Deserialize;

/// On-disk quotation form. Process ids and order numbers are optional:
/// missing ids are generated and cards are numbered by `order`, then by
/// position in the file.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    board: BoardInputs,
    #[serde(default)]
    quantities: QuantityInputs,
    #[serde(default)]
    processes: Vec<ProcessFileEntry>,
    settings: Option<PricingSettings>,
}

#[derive(Debug, Deserialize)]
struct ProcessFileEntry {
    id: Option<String>,
    order: Option<u32>,
    #[serde(flatten)]
    kind: ProcessKind,
}

pub fn load_snapshot(path: &Path, config: &AppConfig) -> Result<QuotationSnapshot> {
    Ok(into_snapshot(read_snapshot_file(path)?, config))
}

/// Loads the snapshot without normalizing: cards keep their file position
/// and any `order` given in the file, so gaps and duplicates stay visible
/// to validation. Cards without an `order` take their 1-based position.
pub fn load_snapshot_as_written(path: &Path, config: &AppConfig) -> Result<QuotationSnapshot> {
    let file = read_snapshot_file(path)?;
    let processes = file
        .processes
        .into_iter()
        .zip(1u32..)
        .map(|(entry, position)| ProcessEntry {
            id: entry.id.map(ProcessId).unwrap_or_else(ProcessId::generate),
            order: entry.order.unwrap_or(position),
            kind: entry.kind,
        })
        .collect();

    Ok(QuotationSnapshot {
        board: file.board,
        quantities: file.quantities,
        processes,
        settings: file.settings.unwrap_or_else(|| config.default_settings()),
    })
}

fn read_snapshot_file(path: &Path) -> Result<SnapshotFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read snapshot file `{}`", path.display()))?;

    let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let file: SnapshotFile = if is_json {
        serde_json::from_str(&raw)
            .with_context(|| format!("could not parse JSON snapshot `{}`", path.display()))?
    } else {
        toml::from_str(&raw)
            .with_context(|| format!("could not parse TOML snapshot `{}`", path.display()))?
    };

    Ok(file)
}

fn into_snapshot(file: SnapshotFile, config: &AppConfig) -> QuotationSnapshot {
    let mut indexed: Vec<(usize, ProcessFileEntry)> =
        file.processes.into_iter().enumerate().collect();
    indexed.sort_by_key(|(position, entry)| (entry.order.unwrap_or(u32::MAX), *position));

    let entries = indexed
        .into_iter()
        .map(|(_, entry)| ProcessEntry {
            id: entry.id.map(ProcessId).unwrap_or_else(ProcessId::generate),
            order: 0,
            kind: entry.kind,
        })
        .collect();

    QuotationSnapshot {
        board: file.board,
        quantities: file.quantities,
        processes: ProcessList::from_entries(entries).into_entries(),
        settings: file.settings.unwrap_or_else(|| config.default_settings()),
    }
}

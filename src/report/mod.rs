// src/report/mod.rs
//
// Purchasing report ingestion: one normalized table per source workbook,
// concatenated across entities into a single schema-aligned table ready
// for persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::normalize::{canonical_column, dedupe_columns};
use crate::sheet::header::{self, HeaderScan};
use crate::sheet::{self, cell_to_value, RawSheet};
use crate::table::{dates, NormalizedTable, Value};

/// Canonical name of the provenance column attached to every row.
pub const ENTITY_COLUMN: &str = "entity_source_file";

/// Columns coerced to datetimes after concatenation. The list is fixed:
/// these are the only date-bearing fields the downstream consumers read.
pub const DATE_COLUMNS: &[&str] = &[
    "pr_date_submitted",
    "po_create_date",
    "po_delivery_date",
    "po_approved_date",
];

/// One aggregator input: a workbook path and the business-unit tag its
/// rows are annotated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSource {
    pub file: PathBuf,
    pub entity: String,
}

/// Per-file outcome recorded in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub entity: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Loaded { rows: usize, header: HeaderScan },
    Skipped { reason: String },
}

/// Diagnostic record of one aggregation run. The header heuristic cannot
/// validate its own guesses, so this is the only place a wrong guess
/// becomes visible (a file loading zero rows, an unexpected fallback).
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub files: Vec<FileOutcome>,
    pub total_rows: usize,
    pub columns: Vec<String>,
}

impl IngestSummary {
    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Skipped { .. }))
            .count()
    }
}

/// Normalize one grid into a tagged table.
///
/// The header row is located heuristically; rows above it are discarded as
/// preamble, the header's labels are canonicalized and de-duplicated, and
/// everything below becomes data rows. A header row at or beyond the end
/// of the grid yields an empty table rather than an error.
pub fn read_sheet(sheet: &RawSheet, entity: &str) -> (NormalizedTable, HeaderScan) {
    let scan = header::locate(&sheet.rows);
    if scan.row >= sheet.rows.len() {
        let mut table = NormalizedTable::default();
        tag_entity(&mut table, entity);
        return (table, scan);
    }

    let raw_labels: Vec<String> = sheet.rows[scan.row]
        .iter()
        .map(|c| cell_to_value(c).to_string())
        .collect();
    let canonical: Vec<String> = raw_labels.iter().map(|l| canonical_column(l)).collect();
    let mut table = NormalizedTable::new(dedupe_columns(&canonical));

    for row in &sheet.rows[scan.row + 1..] {
        table.push_row(row.iter().map(cell_to_value).collect());
    }
    tag_entity(&mut table, entity);
    (table, scan)
}

/// Attach (or overwrite) the entity provenance column.
fn tag_entity(table: &mut NormalizedTable, entity: &str) {
    let idx = match table.column_index(ENTITY_COLUMN) {
        Some(idx) => idx,
        None => {
            table.columns.push(ENTITY_COLUMN.to_string());
            for row in &mut table.rows {
                row.push(Value::Null);
            }
            table.columns.len() - 1
        }
    };
    table.map_column(idx, |_| Value::Str(entity.to_string()));
}

/// Load one report workbook (first sheet) into a normalized table.
pub fn read_report(path: &Path, entity: &str) -> Result<(NormalizedTable, HeaderScan)> {
    let resolved = sheet::resolve_path(path);
    let sheets = sheet::load_workbook(&resolved)
        .with_context(|| format!("reading report {}", resolved.display()))?;
    match sheets.into_iter().next() {
        Some(first) => Ok(read_sheet(&first, entity)),
        None => {
            let mut table = NormalizedTable::default();
            tag_entity(&mut table, entity);
            let scan = HeaderScan {
                row: header::FALLBACK_HEADER_ROW,
                keyword_hits: 0,
                fell_back: true,
            };
            Ok((table, scan))
        }
    }
}

/// Ingest every report source into one table.
///
/// Files are processed strictly in input order. A missing file is skipped
/// before any parse attempt; a parse failure is logged with its context
/// chain and skipped; neither aborts the batch. Surviving tables are
/// concatenated as an outer union by column name, then date columns are
/// coerced and remaining mixed-type columns stringified so the result has
/// a serialization-stable schema. An empty source list yields an empty
/// table with no columns.
pub fn aggregate(sources: &[ReportSource]) -> (NormalizedTable, IngestSummary) {
    let mut combined = NormalizedTable::default();
    let mut files = Vec::with_capacity(sources.len());

    for source in sources {
        let resolved = sheet::resolve_path(&source.file);
        if !resolved.exists() {
            warn!("file not found: {}", resolved.display());
            files.push(FileOutcome {
                file: resolved.display().to_string(),
                entity: source.entity.clone(),
                status: FileStatus::Skipped {
                    reason: "file not found".to_string(),
                },
            });
            continue;
        }
        match read_report(&resolved, &source.entity) {
            Ok((table, scan)) => {
                info!(
                    "loaded {} rows from {} as {}",
                    table.len(),
                    resolved.display(),
                    source.entity
                );
                files.push(FileOutcome {
                    file: resolved.display().to_string(),
                    entity: source.entity.clone(),
                    status: FileStatus::Loaded {
                        rows: table.len(),
                        header: scan,
                    },
                });
                combined.append(table);
            }
            Err(e) => {
                error!("failed to read {}: {:?}", resolved.display(), e);
                files.push(FileOutcome {
                    file: resolved.display().to_string(),
                    entity: source.entity.clone(),
                    status: FileStatus::Skipped {
                        reason: format!("{:#}", e),
                    },
                });
            }
        }
    }

    coerce_date_columns(&mut combined);
    stringify_mixed_columns(&mut combined);

    let summary = IngestSummary {
        files,
        total_rows: combined.len(),
        columns: combined.columns.clone(),
    };
    (combined, summary)
}

/// Parse the known date columns, coercing anything unparseable to null.
/// Typed datetime cells pass through; bare numbers are nulled rather than
/// guessed at as Excel serials.
fn coerce_date_columns(table: &mut NormalizedTable) {
    for col in DATE_COLUMNS {
        if let Some(idx) = table.column_index(col) {
            table.map_column(idx, |v| match v {
                Value::DateTime(dt) => Value::DateTime(dt),
                Value::Str(s) => match dates::parse_datetime(&s) {
                    Some(dt) => Value::DateTime(dt),
                    None => Value::Null,
                },
                _ => Value::Null,
            });
        }
    }
}

enum ColumnKind {
    Numeric,
    DateTime,
    Text,
}

fn classify(table: &NormalizedTable, idx: usize) -> ColumnKind {
    let non_null = || table.column_values(idx).filter(|v| !v.is_null());
    if non_null().all(|v| v.as_num().is_some()) {
        ColumnKind::Numeric
    } else if non_null().all(|v| v.as_datetime().is_some()) {
        ColumnKind::DateTime
    } else {
        ColumnKind::Text
    }
}

/// Convert every column that is not purely numeric and not purely datetime
/// to strings. Nulls stay null; a nullable string column is still
/// serialization-stable.
fn stringify_mixed_columns(table: &mut NormalizedTable) {
    for idx in 0..table.columns.len() {
        if matches!(classify(table, idx), ColumnKind::Text) {
            table.map_column(idx, |v| match v {
                Value::Null => Value::Null,
                other => Value::Str(other.to_string()),
            });
        }
    }
}

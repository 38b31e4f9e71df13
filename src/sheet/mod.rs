// src/sheet/mod.rs
//
// Workbook loading. Everything above this module works on dense
// in-memory grids; calamine types do not leak past `RawSheet` and
// `cell_to_value`.

pub mod header;

#[cfg(test)]
pub(crate) mod fixture;

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook, open_workbook_auto, Data, DataType, Range, Reader, Xlsx};
use tracing::warn;

use crate::table::Value;

/// One worksheet materialized as a dense grid at absolute coordinates.
///
/// `rows[r][c]` is the cell at sheet row `r`, column `c`, counted from the
/// sheet origin. Leading and interior gaps are padded with `Data::Empty`,
/// so positional offsets (card layout columns, header row indices) stay
/// meaningful regardless of where the used range starts.
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Data>>,
}

impl RawSheet {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Data> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Trimmed display text of a cell. `None` for out-of-range or empty
    /// cells, so blank and missing cells look the same to label matching.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<String> {
        let cell = self.cell(row, col)?;
        if matches!(cell, Data::Empty) {
            return None;
        }
        Some(cell_to_value(cell).to_string().trim().to_string())
    }
}

/// Map a calamine cell onto the pipeline value model. Formula errors read
/// as null, matching how the exports treat them (broken cells, not data).
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Str(s.clone()),
        Data::Float(f) => Value::Num(*f),
        Data::Int(i) => Value::Int(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => Value::DateTime(dt),
            None => Value::Null,
        },
        Data::DurationIso(s) => Value::Str(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

/// Resolve a file path against its directory case-insensitively.
///
/// Exact match wins; otherwise the parent directory is scanned for a
/// file name that matches ignoring case. An unresolvable path is returned
/// unchanged so the subsequent open fails with the caller's context.
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let target = match path.file_name() {
        Some(name) => name.to_string_lossy().to_lowercase(),
        None => return path.to_path_buf(),
    };
    if let Ok(entries) = fs::read_dir(parent) {
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().to_lowercase() == target {
                return parent.join(entry.file_name());
            }
        }
    }
    path.to_path_buf()
}

/// Open a workbook and materialize every sheet.
///
/// Strict XLSX parsing is tried first; if opening or reading fails the
/// whole load is retried with format auto-detection, which also covers
/// legacy `.xls` exports. The strict failure is logged, not returned, so
/// a fallback-readable file still loads.
pub fn load_workbook(path: &Path) -> Result<Vec<RawSheet>> {
    let strict = open_workbook::<Xlsx<_>, _>(path)
        .map_err(anyhow::Error::from)
        .and_then(read_all_sheets);
    match strict {
        Ok(sheets) => Ok(sheets),
        Err(e) => {
            warn!(
                "strict xlsx read failed for {}, retrying with auto-detect: {:#}",
                path.display(),
                e
            );
            let wb = open_workbook_auto(path)
                .with_context(|| format!("opening workbook {}", path.display()))?;
            read_all_sheets(wb)
        }
    }
}

fn read_all_sheets<R>(mut wb: R) -> Result<Vec<RawSheet>>
where
    R: Reader<BufReader<File>>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let names = wb.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = wb
            .worksheet_range(&name)
            .with_context(|| format!("reading sheet {:?}", name))?;
        sheets.push(RawSheet {
            rows: materialize(&range),
            name,
        });
    }
    Ok(sheets)
}

/// Expand a used range into a dense grid anchored at the sheet origin.
fn materialize(range: &Range<Data>) -> Vec<Vec<Data>> {
    let (end_row, end_col) = match range.end() {
        Some(end) => end,
        None => return Vec::new(),
    };
    let mut rows = Vec::with_capacity(end_row as usize + 1);
    for r in 0..=end_row {
        let mut row = Vec::with_capacity(end_col as usize + 1);
        for c in 0..=end_col {
            row.push(range.get_value((r, c)).cloned().unwrap_or(Data::Empty));
        }
        rows.push(row);
    }
    rows
}

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use tracing::info;

use crate::table::NormalizedTable;
use crate::vendor::{VendorRecord, CSV_HEADERS};

/// Write vendor records to one CSV file with title-case headers.
///
/// Serde emits the header row from the record's field renames; an empty
/// batch gets an explicit header so consumers always find the schema.
pub fn write_vendors(records: &[VendorRecord], path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = Writer::from_path(&tmp_path)
            .with_context(|| format!("creating temporary file `{}`", tmp_path.display()))?;
        if records.is_empty() {
            writer
                .write_record(CSV_HEADERS)
                .context("writing vendor csv header")?;
        }
        for record in records {
            writer
                .serialize(record)
                .context("serializing vendor record")?;
        }
        writer.flush().context("flushing vendor csv")?;
    }
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "renaming `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    info!("wrote {} vendor records to {}", records.len(), path.display());
    Ok(())
}

/// Write the aggregated report table as CSV under its canonical headers.
///
/// Cells are written in their display form, so nulls become empty fields
/// and datetimes keep the `YYYY-MM-DD HH:MM:SS` shape. A table with no
/// columns produces an empty file.
pub fn write_table(table: &NormalizedTable, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = Writer::from_path(&tmp_path)
            .with_context(|| format!("creating temporary file `{}`", tmp_path.display()))?;
        if !table.columns.is_empty() {
            writer
                .write_record(&table.columns)
                .context("writing report csv header")?;
            for row in &table.rows {
                writer
                    .write_record(row.iter().map(|value| value.to_string()))
                    .context("writing report csv row")?;
            }
        }
        writer.flush().context("flushing report csv")?;
    }
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "renaming `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    info!("wrote {} report rows to {}", table.len(), path.display());
    Ok(())
}

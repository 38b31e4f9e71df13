use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Builder, StringBuilder, TimestampMicrosecondBuilder},
    datatypes::{DataType as ArrowDataType, Field, Schema as ArrowSchema, TimeUnit},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::table::{NormalizedTable, Value};

enum ColumnType {
    Float,
    Timestamp,
    Utf8,
}

/// Pick the narrowest Arrow type each column fits. After the aggregator's
/// stringification pass every column is purely numeric, purely datetime or
/// purely text (nulls aside); the scan also covers tables that never went
/// through that pass.
fn column_type(table: &NormalizedTable, idx: usize) -> ColumnType {
    let non_null = || table.column_values(idx).filter(|v| !v.is_null());
    if non_null().all(|v| v.as_num().is_some()) {
        ColumnType::Float
    } else if non_null().all(|v| v.as_datetime().is_some()) {
        ColumnType::Timestamp
    } else {
        ColumnType::Utf8
    }
}

fn build_column(table: &NormalizedTable, idx: usize, ty: &ColumnType) -> ArrayRef {
    match ty {
        ColumnType::Float => {
            let mut builder = Float64Builder::with_capacity(table.len());
            for value in table.column_values(idx) {
                match value.as_num() {
                    Some(n) => builder.append_value(n),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Timestamp => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(table.len());
            for value in table.column_values(idx) {
                match value.as_datetime() {
                    Some(dt) => builder.append_value(dt.and_utc().timestamp_micros()),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        ColumnType::Utf8 => {
            let mut builder = StringBuilder::new();
            for value in table.column_values(idx) {
                match value {
                    Value::Null => builder.append_null(),
                    other => builder.append_value(other.to_string()),
                }
            }
            Arc::new(builder.finish())
        }
    }
}

/// Write an aggregated table to one Snappy-compressed Parquet file.
///
/// Every field is nullable; an empty table (even one with no columns at
/// all) still produces a valid file so downstream readers see a schema
/// instead of a missing artifact.
pub fn write_table(table: &NormalizedTable, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());
    for (idx, name) in table.columns.iter().enumerate() {
        let ty = column_type(table, idx);
        let data_type = match ty {
            ColumnType::Float => ArrowDataType::Float64,
            ColumnType::Timestamp => ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
            ColumnType::Utf8 => ArrowDataType::Utf8,
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(build_column(table, idx, &ty));
    }
    let schema = Arc::new(ArrowSchema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.len()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)
        .context("building record batch")?;

    let tmp_path = path.with_extension("parquet.tmp");
    let tmp_file = File::create(&tmp_path)
        .with_context(|| format!("creating temporary file `{}`", tmp_path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(tmp_file), schema, Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "renaming `{}` to `{}`",
            tmp_path.display(),
            path.display()
        )
    })?;
    info!(
        "wrote {} rows x {} columns to {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(())
}

// src/manifest.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use serde::Deserialize;
use tracing::warn;

use crate::report::ReportSource;
use crate::vendor::layout::CardLayout;

/// Run configuration, loaded from a YAML file.
///
/// Every field has a default mirroring the known entity exports, so a run
/// without a manifest processes the standard four report files against the
/// current directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Report workbooks and the entity tag their rows are annotated with.
    pub reports: Vec<ReportSource>,
    /// Glob pattern matched against vendor master workbooks.
    pub vendor_glob: String,
    /// Aggregated report output (Parquet).
    pub report_output: PathBuf,
    /// CSV rendering of the same aggregated table.
    pub report_csv_output: PathBuf,
    /// Vendor record output (CSV).
    pub vendor_output: PathBuf,
    /// Optional JSON ingest summary for run diagnostics.
    pub summary_output: Option<PathBuf>,
    /// Card layout override for alternate vendor export layouts.
    pub card_layout: Option<CardLayout>,
}

impl Default for Manifest {
    fn default() -> Self {
        let source = |file: &str, entity: &str| ReportSource {
            file: PathBuf::from(file),
            entity: entity.to_string(),
        };
        Manifest {
            reports: vec![
                source("MEPL.xlsx", "MEPL"),
                source("MLPL.xlsx", "MLPL"),
                source("mmw.xlsx", "MMW"),
                source("mmpl.xlsx", "MMPL"),
            ],
            vendor_glob: "vendors/*.xlsx".to_string(),
            report_output: PathBuf::from("p2p_data.parquet"),
            report_csv_output: PathBuf::from("reports.csv"),
            vendor_output: PathBuf::from("vendors.csv"),
            summary_output: None,
            card_layout: None,
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        let manifest: Manifest = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Re-anchor every relative path (inputs, glob, outputs) at `base`.
    /// Absolute paths are left alone.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        for source in &mut self.reports {
            if source.file.is_relative() {
                source.file = base.join(&source.file);
            }
        }
        if Path::new(&self.vendor_glob).is_relative() {
            self.vendor_glob = format!("{}/{}", base.display(), self.vendor_glob);
        }
        if self.report_output.is_relative() {
            self.report_output = base.join(&self.report_output);
        }
        if self.report_csv_output.is_relative() {
            self.report_csv_output = base.join(&self.report_csv_output);
        }
        if self.vendor_output.is_relative() {
            self.vendor_output = base.join(&self.vendor_output);
        }
        if let Some(out) = &self.summary_output {
            if out.is_relative() {
                self.summary_output = Some(base.join(out));
            }
        }
        self
    }

    /// Expand the vendor glob into a sorted file list. A pattern matching
    /// nothing is an empty batch, not an error.
    pub fn vendor_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let entries = glob(&self.vendor_glob)
            .with_context(|| format!("invalid vendor glob `{}`", self.vendor_glob))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("cannot read glob entry: {:?}", e),
            }
        }
        files.sort();
        Ok(files)
    }
}

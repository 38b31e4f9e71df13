use anyhow::{Context, Result};
use p2pingest::{
    manifest::Manifest,
    report, sink,
    vendor::{self, layout::DEFAULT_LAYOUT},
};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,p2pingest=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) load run manifest ────────────────────────────────────────
    let args: Vec<String> = env::args().collect();
    let manifest = match args.get(1) {
        Some(arg) => {
            let path = PathBuf::from(arg);
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Manifest::load(&path)?.rooted_at(&base)
        }
        None => Manifest::default(),
    };

    let outputs = [
        Some(&manifest.report_output),
        Some(&manifest.report_csv_output),
        Some(&manifest.vendor_output),
        manifest.summary_output.as_ref(),
    ];
    for out in outputs.into_iter().flatten() {
        if let Some(parent) = out.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
    }

    // ─── 3) aggregate purchasing reports ─────────────────────────────
    let (table, summary) = report::aggregate(&manifest.reports);
    info!(
        "aggregated {} rows across {} columns ({} files skipped)",
        summary.total_rows,
        summary.columns.len(),
        summary.skipped_count()
    );
    sink::parquet::write_table(&table, &manifest.report_output)?;
    sink::csv::write_table(&table, &manifest.report_csv_output)?;

    // ─── 4) extract vendor master records ────────────────────────────
    let layout = manifest.card_layout.as_ref().unwrap_or(&DEFAULT_LAYOUT);
    let vendor_files = manifest.vendor_files()?;
    info!(
        "{} vendor files matched `{}`",
        vendor_files.len(),
        manifest.vendor_glob
    );
    let records = vendor::extract_all(&vendor_files, layout);
    sink::csv::write_vendors(&records, &manifest.vendor_output)?;

    // ─── 5) optional run summary ─────────────────────────────────────
    if let Some(path) = &manifest.summary_output {
        let mut text = serde_json::to_string_pretty(&summary)?;
        text.push('\n');
        fs::write(path, text)
            .with_context(|| format!("writing ingest summary {}", path.display()))?;
        info!("wrote ingest summary to {}", path.display());
    }

    info!(
        "done: {} report rows, {} vendor records",
        summary.total_rows,
        records.len()
    );
    Ok(())
}

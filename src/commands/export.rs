use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calview_core::csv::export_csv;
use calview_core::date_range::ExportRange;
use calview_core::viewer::Viewer;

/// Write the events starting within `from..=to` as CSV.
///
/// The file is named after the range and written into `output_dir`
/// (current directory by default), or printed when `stdout` is set.
pub fn run(viewer: Viewer, from: &str, to: &str, output_dir: Option<PathBuf>, stdout: bool) -> Result<()> {
    let range = ExportRange::parse(from, to)?;
    let csv = export_csv(viewer.events(), &range);

    if stdout {
        println!("{}", csv);
        return Ok(());
    }

    let dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
    let path = write_export(&dir, &range, &csv)?;
    let count = viewer.events().iter().filter(|e| range.includes(e)).count();

    println!("Exported {} events to {}", count, path.display());
    Ok(())
}

fn write_export(dir: &Path, range: &ExportRange, csv: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory at {}", dir.display()))?;

    let path = dir.join(range.file_name());
    std::fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

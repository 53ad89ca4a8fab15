use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};

use crate::error::Result;
use crate::transform::{DestinationRow, HEADERS};

/// Write the header and one fully-quoted record per row. Returns the row count.
pub fn write_rows(path: &Path, rows: &[DestinationRow]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    Ok(rows.len())
}

/// `<dir>/<stem>_with_ids<.ext>` next to the primary output.
pub fn with_ids_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match output.extension() {
        Some(ext) => format!("{stem}_with_ids.{}", ext.to_string_lossy()),
        None => format!("{stem}_with_ids"),
    };
    output.with_file_name(file_name)
}

//! Serialization of extraction results to JSON or a delimited sheet.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::common::constants::{CANONICAL_FIELDS, FORMAT_CSV, FORMAT_JSON, FORMAT_TSV};
use crate::common::error::{ExtractError, Result};
use crate::page::PageExtraction;
use crate::pipeline::CanonicalProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => FORMAT_JSON,
            ExportFormat::Csv => FORMAT_CSV,
            ExportFormat::Tsv => FORMAT_TSV,
        }
    }

    /// Cell separator for delimited formats
    pub fn separator(&self) -> Option<char> {
        match self {
            ExportFormat::Json => None,
            ExportFormat::Csv => Some(','),
            ExportFormat::Tsv => Some('\t'),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            FORMAT_JSON => Ok(ExportFormat::Json),
            FORMAT_CSV => Ok(ExportFormat::Csv),
            FORMAT_TSV => Ok(ExportFormat::Tsv),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single delimited row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// The profile sheet: canonical header, then one row per record.
pub fn write_profiles<W: Write>(mut w: W, profiles: &[CanonicalProfile], sep: char) -> io::Result<()> {
    write_row(&mut w, &CANONICAL_FIELDS, sep)?;
    for profile in profiles {
        write_row(&mut w, &profile.values(), sep)?;
    }
    Ok(())
}

pub fn write_json<W: Write, T: Serialize>(w: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(w, value)?;
    Ok(())
}

/// `extracted_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_file_name(format: ExportFormat, now: DateTime<Local>) -> String {
    format!("extracted_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Render a page bundle in the given format. Delimited formats carry only
/// the profile sheet.
pub fn render_page(page: &PageExtraction, format: ExportFormat) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    match format.separator() {
        None => {
            write_json(&mut buf, page)?;
            buf.push(b'\n');
        }
        Some(sep) => {
            let profiles = page
                .report
                .as_ref()
                .map(|r| r.profiles.as_slice())
                .unwrap_or_default();
            write_profiles(&mut buf, profiles, sep)?;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a page bundle to `path`, or to a timestamped file in `dir` when no
/// path is given. Returns the path written.
pub fn export_to_path(
    page: &PageExtraction,
    format: ExportFormat,
    path: Option<&Path>,
    dir: &Path,
) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => dir.join(default_file_name(format, Local::now())),
    };
    let mut writer = BufWriter::new(File::create(&target)?);
    writer.write_all(render_page(page, format)?.as_bytes())?;
    writer.flush()?;
    info!(path = %target.display(), format = format.extension(), "export written");
    Ok(target)
}

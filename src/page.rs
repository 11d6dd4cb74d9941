//! Page-level extraction: the profile report plus the raw data types a
//! caller can ask for alongside it.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::common::error::{ExtractError, Result};
use crate::document::{self, nearest_ancestor, row_cells};
use crate::pipeline::{ExtractionReport, ProfileExtractor};

static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("valid image selector"));
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("valid table selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("valid row selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Profiles,
    Emails,
    Images,
    Tables,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Profiles,
        DataType::Emails,
        DataType::Images,
        DataType::Tables,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Profiles => "profiles",
            DataType::Emails => "emails",
            DataType::Images => "images",
            DataType::Tables => "tables",
        }
    }

    /// Parse a comma-separated selection. Blank input selects everything;
    /// repeats are dropped, first mention keeps its position.
    pub fn parse_list(list: &str) -> Result<Vec<DataType>> {
        let mut selected = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let data_type: DataType = item.parse()?;
            if !selected.contains(&data_type) {
                selected.push(data_type);
            }
        }
        if selected.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        Ok(selected)
    }
}

impl FromStr for DataType {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "profiles" | "profile" => Ok(DataType::Profiles),
            "emails" | "email" => Ok(DataType::Emails),
            "images" | "image" => Ok(DataType::Images),
            "tables" | "table" => Ok(DataType::Tables),
            other => Err(ExtractError::Config(format!(
                "unknown data type '{}', expected one of profiles, emails, images, tables",
                other
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One table as rows of cell text
pub type TableRows = Vec<Vec<String>>;

/// Result bundle for a page; only requested data types are present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ExtractionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableRows>>,
}

pub fn extract_page(extractor: &ProfileExtractor, html: &str, types: &[DataType]) -> PageExtraction {
    let doc = document::parse(html);
    let mut page = PageExtraction::default();

    for data_type in types {
        match data_type {
            DataType::Profiles => page.report = Some(extractor.extract_document(&doc)),
            DataType::Emails => page.emails = Some(collect_emails(extractor, html)),
            DataType::Images => page.images = Some(collect_images(&doc)),
            DataType::Tables => page.tables = Some(collect_tables(&doc)),
        }
    }

    debug!(
        emails = page.emails.as_ref().map_or(0, Vec::len),
        images = page.images.as_ref().map_or(0, Vec::len),
        tables = page.tables.as_ref().map_or(0, Vec::len),
        "page extraction complete"
    );
    page
}

/// Unique addresses anywhere in the raw markup, sorted
fn collect_emails(extractor: &ProfileExtractor, html: &str) -> Vec<String> {
    extractor
        .patterns()
        .emails(html)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn collect_images(doc: &Html) -> Vec<String> {
    doc.select(&IMAGE_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rows belong to their nearest table, so nested tables are reported separately.
fn collect_tables(doc: &Html) -> Vec<TableRows> {
    doc.select(&TABLE_SELECTOR)
        .map(|table| {
            table
                .select(&ROW_SELECTOR)
                .filter(|row| nearest_ancestor(row, "table").map(|t| t.id()) == Some(table.id()))
                .map(|row| row_cells(&row))
                .filter(|cells| !cells.is_empty())
                .collect()
        })
        .collect()
}

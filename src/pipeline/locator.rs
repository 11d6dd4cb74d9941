use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::config::ThresholdConfig;
use crate::document::{
    block_text, inline_text, is_tag, nearest_ancestor, parent_element, row_cells, word_count,
};
use crate::pipeline::candidate::{CandidateBlock, Tier};
use crate::pipeline::inference::normalize_key;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("valid table selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static HEADER_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th, thead td").expect("valid header selector"));
static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, li, tr").expect("valid container selector"));

/// Anchors whose nearest block is one of these would swallow the whole page
const PAGE_ROOTS: &[&str] = &["html", "body"];

/// Produces candidate blocks for each locator tier.
#[derive(Debug, Clone)]
pub struct CandidateLocator {
    thresholds: ThresholdConfig,
}

impl CandidateLocator {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn locate(&self, document: &Html, tier: Tier) -> Vec<CandidateBlock> {
        let blocks = match tier {
            Tier::Anchor => self.anchor_blocks(document),
            Tier::TableRow => self.table_rows(document),
            Tier::GenericContainer => {
                self.container_blocks(document, tier, self.thresholds.min_generic_words)
            }
            Tier::Unfiltered => {
                self.container_blocks(document, tier, self.thresholds.min_fallback_words)
            }
        };
        debug!(tier = %tier, count = blocks.len(), "located candidates");
        blocks
    }

    /// Tier A: the nearest block around every link with readable text.
    fn anchor_blocks(&self, document: &Html) -> Vec<CandidateBlock> {
        let mut seen = HashSet::new();
        let mut blocks = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let href = match anchor.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() => href,
                _ => continue,
            };
            let link_text = inline_text(anchor);
            if link_text.chars().count() < self.thresholds.min_link_text_chars {
                trace!(href, "link text too short");
                continue;
            }

            let Some(mut ancestor) = parent_element(&anchor) else {
                continue;
            };
            if is_tag(&ancestor, "a") {
                match parent_element(&ancestor) {
                    Some(grandparent) => ancestor = grandparent,
                    None => continue,
                }
            }
            if PAGE_ROOTS.iter().any(|root| is_tag(&ancestor, root)) {
                continue;
            }
            if !seen.insert(ancestor.id()) {
                continue;
            }

            let text = block_text(ancestor);
            if text.is_empty() {
                continue;
            }
            blocks.push(CandidateBlock::new(Tier::Anchor, text).with_link(href));
        }

        blocks
    }

    /// Tier B: every data row of every table, keyed by column header.
    fn table_rows(&self, document: &Html) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();

        for table in document.select(&TABLE_SELECTOR) {
            let owned_by_table =
                |el: &ElementRef| nearest_ancestor(el, "table").map(|t| t.id()) == Some(table.id());

            let mut headers: Vec<String> = table
                .select(&HEADER_CELL_SELECTOR)
                .filter(|cell| owned_by_table(cell))
                .map(inline_text)
                .collect();

            let mut rows: Vec<ElementRef> = table
                .select(&ROW_SELECTOR)
                .filter(|row| owned_by_table(row))
                .filter(|row| !in_table_head(row))
                .collect();

            if headers.is_empty() {
                if rows.is_empty() {
                    continue;
                }
                headers = row_cells(&rows.remove(0));
            }

            let context = headers
                .iter()
                .filter(|h| !h.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");

            for row in rows {
                let cells = row_cells(&row);
                if cells.iter().all(|c| c.is_empty()) {
                    continue;
                }

                let keyed: Vec<(String, String)> = cells
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (column_key(&headers, i), value.clone()))
                    .collect();
                let text = cells
                    .iter()
                    .filter(|c| !c.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n");

                blocks.push(
                    CandidateBlock::new(Tier::TableRow, text)
                        .with_cells(keyed)
                        .with_context(context.clone()),
                );
            }
        }

        blocks
    }

    /// Tier C and the unfiltered fallback: containers above a word count.
    fn container_blocks(&self, document: &Html, tier: Tier, min_words: usize) -> Vec<CandidateBlock> {
        document
            .select(&CONTAINER_SELECTOR)
            .filter_map(|element| {
                let text = block_text(element);
                if word_count(&text) > min_words {
                    Some(CandidateBlock::new(tier, text))
                } else {
                    None
                }
            })
            .collect()
    }
}

fn in_table_head(row: &ElementRef) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_tag(el, "table"))
        .any(|el| is_tag(&el, "thead"))
}

/// Header-derived key for column `index`, or `field_<n>` (1-based) without one.
fn column_key(headers: &[String], index: usize) -> String {
    headers
        .get(index)
        .map(|h| normalize_key(h))
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| format!("field_{}", index + 1))
}

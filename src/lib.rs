pub mod common;
pub mod config;
pub mod document;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod page;
pub mod pipeline;
pub mod renderer;
pub mod vocabulary;

pub use common::{ExtractError, Result};
pub use config::ExtractorConfig;
pub use page::{extract_page, DataType, PageExtraction};
pub use pipeline::{CanonicalProfile, ExtractionReport, ProfileExtractor, Tier};

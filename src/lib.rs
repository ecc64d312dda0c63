//! Multi-strategy product extraction from hostile e-commerce HTML.
//!
//! Given the raw text and parsed DOM of an already-fetched product-detail
//! page, recovers a normalized [`ProductRecord`](record::ProductRecord):
//! - embedded-JSON location inside inline-script payloads
//! - ordered per-field strategy fallback (DOM selector / regex / JSON path)
//! - image harvesting with normalization, validation, and dedup
//! - record assembly with explicit per-field defaults and provenance
//!
//! Fetching, persistence, and anti-bot evasion are the caller's concern.

pub mod config;
pub mod document;
pub mod error;
pub mod extractors;
pub mod record;

pub use config::{ExtractionStrategy, ExtractorConfig, FieldPipeline, ImageHarvestConfig};
pub use document::{page_has_blocking_marker, RawDocument};
pub use error::ExtractError;
pub use extractors::{extract_product, FieldResult};
pub use record::{ExtractionOutcome, ProductRecord, Provenance};

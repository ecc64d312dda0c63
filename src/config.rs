//! Extraction configuration.
//!
//! Everything site-specific lives here as plain data: per-field strategy
//! lists, image allow/deny lists, defaults, and the keyword vocabularies used
//! for derived data. Supporting a new source site means adding configuration,
//! not code paths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One named rule for producing a candidate value for one semantic field.
///
/// Strategies are pure functions of a document and are tried in list order
/// until one yields a validated, non-empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionStrategy {
    /// Select the first matching element and read its text content, or the
    /// named attribute when `attr` is set.
    #[serde(rename_all = "camelCase")]
    DomSelector {
        selector: String,
        #[serde(default)]
        attr: Option<String>,
    },
    /// Run a pattern against the raw page text. Returns the named capture
    /// group, group 1 when the pattern has capture groups, or else the whole
    /// match.
    #[serde(rename_all = "camelCase")]
    Regex {
        pattern: String,
        #[serde(default)]
        group: Option<usize>,
    },
    /// Locate the balanced object following `marker` in the raw text, parse
    /// it as strict JSON, and navigate `path` (dot notation; segments may be
    /// object keys or array indices).
    #[serde(rename_all = "camelCase")]
    EmbeddedJson { marker: String, path: String },
}

impl ExtractionStrategy {
    /// Identifier recorded as provenance when this strategy wins.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionStrategy::DomSelector { .. } => "domSelector",
            ExtractionStrategy::Regex { .. } => "regex",
            ExtractionStrategy::EmbeddedJson { .. } => "embeddedJson",
        }
    }
}

/// Ordered strategy list for one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldPipeline {
    #[serde(default)]
    pub strategies: Vec<ExtractionStrategy>,
}

impl FieldPipeline {
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }
}

/// Multi-value DOM selectors for the size and color variant axes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantConfig {
    #[serde(default)]
    pub size_selectors: Vec<String>,
    #[serde(default)]
    pub color_selectors: Vec<String>,
}

/// Image harvesting sources, allow/deny lists, and the placeholder sequence
/// substituted when every source comes up empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHarvestConfig {
    /// Elements whose src/data-src/data-image attributes are harvested.
    #[serde(default = "default_image_selectors")]
    pub selectors: Vec<String>,
    /// Only scripts containing one of these tokens are scanned for URLs.
    #[serde(default)]
    pub script_markers: Vec<String>,
    /// Asset-host suffixes a normalized URL must belong to.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    #[serde(default = "default_image_extensions")]
    pub allowed_extensions: Vec<String>,
    /// UI-asset tokens that disqualify a URL outright.
    #[serde(default = "default_excluded_tokens")]
    pub excluded_tokens: Vec<String>,
    /// Emitted instead of an empty list; downstream flags the record.
    #[serde(default)]
    pub placeholders: Vec<String>,
}

impl Default for ImageHarvestConfig {
    fn default() -> Self {
        Self {
            selectors: default_image_selectors(),
            script_markers: Vec::new(),
            allowed_domains: Vec::new(),
            allowed_extensions: default_image_extensions(),
            excluded_tokens: default_excluded_tokens(),
            placeholders: Vec::new(),
        }
    }
}

fn default_image_selectors() -> Vec<String> {
    vec!["img".to_string()]
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp", "gif"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_tokens() -> Vec<String> {
    [
        "icon", "logo", "avatar", "placeholder", "spinner", "sprite", "1x1", "blank",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Explicit per-field defaults. Downstream persistence treats absence as
/// "not evaluated", so every record field carries one of these when all
/// strategies miss rather than being left undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDefaults {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub shipping_fee: f64,
    #[serde(default)]
    pub weight: f64,
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            name: default_name(),
            category: default_category(),
            seller: String::new(),
            price: 0.0,
            shipping_fee: 0.0,
            weight: 0.0,
        }
    }
}

fn default_name() -> String {
    "Unknown Product".to_string()
}

fn default_category() -> String {
    "unclassified".to_string()
}

/// Maps a category to the name keywords that suggest it. Rules are checked
/// in order; the first rule with a matching keyword wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Full extraction configuration for one source site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorConfig {
    #[serde(default)]
    pub title: FieldPipeline,
    #[serde(default)]
    pub price: FieldPipeline,
    #[serde(default)]
    pub seller: FieldPipeline,
    #[serde(default)]
    pub weight: FieldPipeline,
    #[serde(default)]
    pub shipping_fee: FieldPipeline,
    /// Free-form attribute pipelines, keyed by attribute name. Attributes
    /// whose pipelines all miss are absent from the record's map.
    #[serde(default)]
    pub attributes: BTreeMap<String, FieldPipeline>,
    #[serde(default)]
    pub variants: VariantConfig,
    #[serde(default)]
    pub images: ImageHarvestConfig,
    #[serde(default)]
    pub defaults: ProductDefaults,
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
    /// Fixed vocabulary checked against the name for derived tags.
    #[serde(default)]
    pub tag_vocabulary: Vec<String>,
    /// Known blocking markers, for the fetch layer's redirect screening.
    #[serde(default)]
    pub blocked_markers: Vec<String>,
}

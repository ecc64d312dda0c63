//! Ordered-fallback field extraction.
//!
//! One semantic field, one ordered strategy list: each strategy is tried
//! against the document until one yields a validated, non-empty candidate.
//! "Field not found" is never an error here — exhausted lists resolve to a
//! miss and the configured default applies at assembly. Only structural
//! locator failures are recorded, as diagnostics for strategy maintenance.

use regex::Regex;
use scraper::Selector;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ExtractionStrategy;
use crate::document::RawDocument;
use crate::error::ExtractError;

use super::embedded_json::{extract_object, navigate_path};

/// Outcome of running one field's strategy list.
///
/// Invariant: `strategy_used` is `Some` exactly when `value` is. Construct
/// through [`FieldResult::hit`]/[`FieldResult::miss`] to preserve it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldResult<T> {
    pub value: Option<T>,
    pub strategy_used: Option<String>,
}

impl<T> FieldResult<T> {
    pub fn hit(value: T, strategy: &str) -> Self {
        Self {
            value: Some(value),
            strategy_used: Some(strategy.to_string()),
        }
    }

    pub fn miss() -> Self {
        Self {
            value: None,
            strategy_used: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.value.is_some()
    }

    /// Resolve to the extracted value or the caller-supplied default.
    pub fn resolve(self, default: T) -> (T, Option<String>) {
        match self.value {
            Some(v) => (v, self.strategy_used),
            None => (default, None),
        }
    }
}

/// Try `strategies` in order and return the first validated non-empty string
/// together with the winning strategy's identifier.
///
/// Structural failures (unbalanced or unparsable embedded objects) are
/// logged, pushed onto `diagnostics`, and treated as a failed candidate so
/// later strategies still get their turn.
pub fn extract_field(
    field: &str,
    doc: &RawDocument,
    strategies: &[ExtractionStrategy],
    diagnostics: &mut Vec<ExtractError>,
) -> FieldResult<String> {
    for strategy in strategies {
        match run_strategy(doc, strategy) {
            Ok(Some(value)) => {
                debug!(field, strategy = strategy.kind(), "field extracted");
                return FieldResult::hit(value, strategy.kind());
            }
            Ok(None) => continue,
            Err(e) => {
                warn!(field, strategy = strategy.kind(), error = %e, "structural extraction failure");
                diagnostics.push(e);
            }
        }
    }
    FieldResult::miss()
}

/// Numeric variant of [`extract_field`]: a successful string match is
/// additionally cleaned of everything but digits and the first decimal
/// point. A match that does not clean into a valid number is treated as a
/// miss for that strategy, falling through to the next one.
pub fn extract_numeric_field(
    field: &str,
    doc: &RawDocument,
    strategies: &[ExtractionStrategy],
    diagnostics: &mut Vec<ExtractError>,
) -> FieldResult<f64> {
    for strategy in strategies {
        match run_strategy(doc, strategy) {
            Ok(Some(raw)) => match clean_numeric(&raw) {
                Some(n) => {
                    debug!(field, strategy = strategy.kind(), value = n, "numeric field extracted");
                    return FieldResult::hit(n, strategy.kind());
                }
                None => {
                    debug!(field, strategy = strategy.kind(), raw, "candidate not numeric");
                    continue;
                }
            },
            Ok(None) => continue,
            Err(e) => {
                warn!(field, strategy = strategy.kind(), error = %e, "structural extraction failure");
                diagnostics.push(e);
            }
        }
    }
    FieldResult::miss()
}

/// Run one strategy. `Ok(None)` is a plain miss; errors are structural.
fn run_strategy(
    doc: &RawDocument,
    strategy: &ExtractionStrategy,
) -> Result<Option<String>, ExtractError> {
    match strategy {
        ExtractionStrategy::DomSelector { selector, attr } => {
            Ok(select_first(doc, selector, attr.as_deref()))
        }
        ExtractionStrategy::Regex { pattern, group } => Ok(match_regex(doc.raw(), pattern, *group)),
        ExtractionStrategy::EmbeddedJson { marker, path } => {
            let Some(parsed) = extract_object(doc.raw(), marker)? else {
                return Ok(None);
            };
            Ok(navigate_path(&parsed, path).and_then(value_to_string))
        }
    }
}

fn select_first(doc: &RawDocument, selector_str: &str, attr: Option<&str>) -> Option<String> {
    // An invalid selector is a configuration defect, not a page defect;
    // skip the strategy rather than abort the field.
    let Ok(selector) = Selector::parse(selector_str) else {
        warn!(selector = selector_str, "invalid CSS selector in strategy list");
        return None;
    };

    let element = doc.dom().select(&selector).next()?;
    let text = match attr {
        Some(name) => element.value().attr(name)?.to_string(),
        None => element.text().collect::<String>(),
    };
    non_empty(text.trim())
}

fn match_regex(raw: &str, pattern: &str, group: Option<usize>) -> Option<String> {
    let Ok(re) = Regex::new(pattern) else {
        warn!(pattern, "invalid regex in strategy list");
        return None;
    };

    let caps = re.captures(raw)?;
    let m = match group {
        Some(g) => caps.get(g)?,
        // Prefer the first capture group when the pattern declares one.
        None if caps.len() > 1 => caps.get(1)?,
        None => caps.get(0)?,
    };
    non_empty(m.as_str().trim())
}

/// Strip everything except digits and the first decimal point, then parse.
pub fn clean_numeric(raw: &str) -> Option<f64> {
    let mut cleaned = String::new();
    let mut seen_point = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_point {
            seen_point = true;
            cleaned.push(c);
        }
    }
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.trim()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// All matching elements' trimmed text, first-seen order, duplicates
/// collapsed. Used for multi-value axes like sizes and colors.
pub fn select_all_text(doc: &RawDocument, selector_str: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector_str) else {
        warn!(selector = selector_str, "invalid CSS selector in variant config");
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for element in doc.dom().select(&selector) {
        let text = element.text().collect::<String>().trim().to_string();
        if !text.is_empty() && seen.insert(text.clone()) {
            out.push(text);
        }
    }
    out
}

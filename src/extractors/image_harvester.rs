//! Product image harvesting, normalization, and deduplication.
//!
//! Candidates come from three independent sources: element attributes,
//! inline-script bodies gated by a marker token, and og/twitter meta tags.
//! Every candidate is canonicalized (https, query stripped, vendor variant
//! suffixes collapsed) so the same underlying asset reached through different
//! URL variants deduplicates to one entry, then validated against the
//! configured allow/deny lists. First-seen order is preserved.

use std::collections::HashSet;

use regex::Regex;
use scraper::Selector;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ImageHarvestConfig;
use crate::document::RawDocument;

/// Where an image candidate was observed. Transient; exists only while
/// harvesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSource {
    DomSrc,
    DomDataAttr,
    EmbeddedJson,
    MetaTag,
}

#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub raw_url: String,
    pub source: ImageSource,
}

/// Attributes read off elements matched by the configured selectors.
const DOM_URL_ATTRS: [(&str, ImageSource); 3] = [
    ("src", ImageSource::DomSrc),
    ("data-src", ImageSource::DomDataAttr),
    ("data-image", ImageSource::DomDataAttr),
];

/// Harvest, normalize, validate, and deduplicate product image URLs.
///
/// Returns the surviving canonical URLs in first-seen order. An empty result
/// means no source produced a valid product image; the caller substitutes
/// the configured placeholder sequence and flags the record.
pub fn harvest_images(doc: &RawDocument, config: &ImageHarvestConfig) -> Vec<String> {
    let candidates = collect_candidates(doc, config);
    debug!(count = candidates.len(), "image candidates collected");

    let mut seen: HashSet<String> = HashSet::new();
    let mut images = Vec::new();

    for candidate in candidates {
        let Some(canonical) = normalize_url(&candidate.raw_url, doc.origin(), config) else {
            continue;
        };
        if !passes_validation(&canonical, config) {
            continue;
        }
        if seen.insert(canonical.clone()) {
            images.push(canonical);
        }
    }

    debug!(count = images.len(), "images after validation and dedup");
    images
}

fn collect_candidates(doc: &RawDocument, config: &ImageHarvestConfig) -> Vec<ImageCandidate> {
    let mut candidates = Vec::new();

    // Source (a): element attributes.
    for selector_str in &config.selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            warn!(selector = selector_str, "invalid CSS selector in image config");
            continue;
        };
        for element in doc.dom().select(&selector) {
            for (attr, source) in DOM_URL_ATTRS {
                if let Some(value) = element.value().attr(attr) {
                    if !value.trim().is_empty() {
                        candidates.push(ImageCandidate {
                            raw_url: value.trim().to_string(),
                            source,
                        });
                    }
                }
            }
        }
    }

    // Source (b): URLs inside marked inline scripts.
    if !config.script_markers.is_empty() {
        if let Some(url_re) = image_url_regex(&config.allowed_extensions) {
            let script_selector = Selector::parse("script").unwrap();
            for element in doc.dom().select(&script_selector) {
                let body = element.text().collect::<String>();
                if !config.script_markers.iter().any(|m| body.contains(m.as_str())) {
                    continue;
                }
                for m in url_re.find_iter(&body) {
                    // Script payloads escape slashes as \/ routinely.
                    let raw = m.as_str().replace("\\/", "/");
                    candidates.push(ImageCandidate {
                        raw_url: raw,
                        source: ImageSource::EmbeddedJson,
                    });
                }
            }
        }
    }

    // Source (c): og:image / twitter:image meta tags.
    let meta_selector = Selector::parse(
        r#"meta[property="og:image"], meta[name="twitter:image"], meta[property="twitter:image"]"#,
    )
    .unwrap();
    for element in doc.dom().select(&meta_selector) {
        if let Some(content) = element.value().attr("content") {
            if !content.trim().is_empty() {
                candidates.push(ImageCandidate {
                    raw_url: content.trim().to_string(),
                    source: ImageSource::MetaTag,
                });
            }
        }
    }

    candidates
}

/// URL-shaped substrings ending in an allowed image extension.
fn image_url_regex(extensions: &[String]) -> Option<Regex> {
    if extensions.is_empty() {
        return None;
    }
    let exts = extensions
        .iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|");
    // Tolerates escaped slashes inside JSON string values.
    let pattern = format!(r#"(?i)(?:https?:)?(?:\\/\\/|//)[^\s"'<>,()]+?\.(?:{exts})"#);
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "image extension list produced an invalid pattern");
            None
        }
    }
}

/// Canonicalize one raw candidate. `None` drops the candidate.
fn normalize_url(raw: &str, origin: Option<&Url>, config: &ImageHarvestConfig) -> Option<String> {
    let mut s = raw.trim().to_string();

    // Query string and fragment never distinguish assets.
    if let Some(cut) = s.find(['?', '#']) {
        s.truncate(cut);
    }

    if let Some(rest) = s.strip_prefix("//") {
        s = format!("https://{rest}");
    } else if s.starts_with('/') {
        // Root-relative: only resolvable when the document knows its origin.
        let base = origin?;
        s = base.join(&s).ok()?.to_string();
    } else if let Some(rest) = s.strip_prefix("http://") {
        s = format!("https://{rest}");
    } else if !s.starts_with("https://") {
        return None;
    }

    // Collapse vendor compressed-variant suffixes: abc.jpg_.webp and
    // abc.jpg_400x400.jpg both refer to the asset abc.jpg.
    if let Some(re) = variant_suffix_regex(&config.allowed_extensions) {
        s = re.replace(&s, "$1").to_string();
    }

    Some(s)
}

fn variant_suffix_regex(extensions: &[String]) -> Option<Regex> {
    if extensions.is_empty() {
        return None;
    }
    let exts = extensions
        .iter()
        .map(|e| regex::escape(e))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(\.(?:{exts}))_[A-Za-z0-9._\-]*$")).ok()
}

/// All three predicates must pass: allow-listed host, supported extension,
/// no UI-asset exclusion token.
fn passes_validation(canonical: &str, config: &ImageHarvestConfig) -> bool {
    let Ok(parsed) = Url::parse(canonical) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let domain_ok = config.allowed_domains.is_empty()
        || config
            .allowed_domains
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{d}")));
    if !domain_ok {
        return false;
    }

    let lower = canonical.to_ascii_lowercase();
    let extension_ok = config
        .allowed_extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_ascii_lowercase())));
    if !extension_ok {
        return false;
    }

    !config
        .excluded_tokens
        .iter()
        .any(|token| !token.is_empty() && lower.contains(&token.to_ascii_lowercase()))
}

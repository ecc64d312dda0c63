//! The assembled product record and the merge that produces it.
//!
//! Assembly is a pure single-pass merge: every input is already resolved to
//! a value or its documented default before it gets here, so this stage has
//! no failure modes. Derived data (category guess, tags) comes from keyword
//! checks against configured vocabularies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::CategoryRule;
use crate::error::ExtractError;

/// Normalized output of one extraction run. Every field is either a
/// successfully extracted value or an explicit default — downstream
/// persistence treats absence as "not evaluated" rather than "confirmed
/// empty", so nothing here is ever left implicitly undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    pub images: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub price: f64,
    pub shipping_fee: f64,
    pub seller: String,
    pub weight: f64,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
}

/// Which strategy produced each field's final value; `None` marks fields
/// that fell back to their default. Quality metrics are computed from this.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub name: Option<String>,
    pub price: Option<String>,
    pub seller: Option<String>,
    pub weight: Option<String>,
    pub shipping_fee: Option<String>,
    /// Strategy per extracted attribute; missed attributes are absent.
    pub attributes: BTreeMap<String, String>,
    /// True when the harvest came up empty and the placeholder sequence was
    /// substituted.
    pub images_defaulted: bool,
}

/// One extraction run's full result: the record, per-field provenance, and
/// any structural failures observed along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub record: ProductRecord,
    pub provenance: Provenance,
    pub diagnostics: Vec<ExtractError>,
}

/// First category rule with a keyword present in the lowercased name wins.
pub fn guess_category(name: &str, rules: &[CategoryRule]) -> Option<String> {
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|kw| !kw.is_empty() && lower.contains(&kw.to_lowercase()))
        })
        .map(|rule| rule.category.clone())
}

/// Vocabulary words present in the lowercased name, in vocabulary order.
pub fn derive_tags(name: &str, vocabulary: &[String]) -> Vec<String> {
    let lower = name.to_lowercase();
    vocabulary
        .iter()
        .filter(|word| !word.is_empty() && lower.contains(&word.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<CategoryRule> {
        vec![
            CategoryRule {
                category: "apparel".to_string(),
                keywords: vec!["shirt".to_string(), "jacket".to_string()],
            },
            CategoryRule {
                category: "footwear".to_string(),
                keywords: vec!["shoe".to_string(), "sneaker".to_string()],
            },
        ]
    }

    #[test]
    fn test_category_guess_first_match_wins() {
        assert_eq!(
            guess_category("Vintage Denim Jacket", &rules()),
            Some("apparel".to_string())
        );
        // Matches both rule sets; rule order decides.
        assert_eq!(
            guess_category("Shirt with sneaker print", &rules()),
            Some("apparel".to_string())
        );
        assert_eq!(guess_category("Ceramic Mug", &rules()), None);
    }

    #[test]
    fn test_tags_follow_vocabulary_order() {
        let vocab = vec![
            "waterproof".to_string(),
            "vintage".to_string(),
            "denim".to_string(),
        ];
        assert_eq!(
            derive_tags("Vintage Denim Jacket", &vocab),
            vec!["vintage", "denim"]
        );
        assert!(derive_tags("Plain Tee", &vocab).is_empty());
    }
}

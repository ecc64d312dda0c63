//! Extraction engine.
//!
//! Each module covers one stage of the pipeline; [`extract_product`] runs
//! them all against one document and assembles the normalized record.

mod embedded_json;
mod field_matcher;
mod image_harvester;

pub use embedded_json::{extract_object, locate_object, navigate_path, parse_loose};
pub use field_matcher::{
    clean_numeric, extract_field, extract_numeric_field, select_all_text, FieldResult,
};
pub use image_harvester::{harvest_images, ImageCandidate, ImageSource};

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ExtractorConfig;
use crate::document::RawDocument;
use crate::record::{derive_tags, guess_category, ExtractionOutcome, ProductRecord, Provenance};

/// Run the full pipeline for one page: per-field strategy fallback, image
/// harvesting, and record assembly with explicit defaults.
///
/// Never fails: a page yielding zero usable fields still produces a record
/// full of the configured defaults, with provenance and diagnostics telling
/// the caller how little was actually extracted.
pub fn extract_product(doc: &RawDocument, config: &ExtractorConfig) -> ExtractionOutcome {
    let mut diagnostics = Vec::new();

    let name = extract_field("name", doc, &config.title.strategies, &mut diagnostics);
    let price = extract_numeric_field("price", doc, &config.price.strategies, &mut diagnostics);
    let seller = extract_field("seller", doc, &config.seller.strategies, &mut diagnostics);
    let weight = extract_numeric_field("weight", doc, &config.weight.strategies, &mut diagnostics);
    let shipping_fee = extract_numeric_field(
        "shipping_fee",
        doc,
        &config.shipping_fee.strategies,
        &mut diagnostics,
    );

    let mut attributes = BTreeMap::new();
    let mut attribute_provenance = BTreeMap::new();
    for (key, pipeline) in &config.attributes {
        let result = extract_field(key, doc, &pipeline.strategies, &mut diagnostics);
        if let (Some(value), Some(strategy)) = (result.value, result.strategy_used) {
            attributes.insert(key.clone(), value);
            attribute_provenance.insert(key.clone(), strategy);
        }
    }

    let sizes = collect_variants(doc, &config.variants.size_selectors);
    let colors = collect_variants(doc, &config.variants.color_selectors);

    let harvested = harvest_images(doc, &config.images);
    let images_defaulted = harvested.is_empty();
    let images = if images_defaulted {
        config.images.placeholders.clone()
    } else {
        harvested
    };

    let defaults = &config.defaults;
    let (name, name_strategy) = name.resolve(defaults.name.clone());
    let (price, price_strategy) = price.resolve(defaults.price);
    let (seller, seller_strategy) = seller.resolve(defaults.seller.clone());
    let (weight, weight_strategy) = weight.resolve(defaults.weight);
    let (shipping_fee, shipping_strategy) = shipping_fee.resolve(defaults.shipping_fee);

    let category =
        guess_category(&name, &config.category_rules).unwrap_or_else(|| defaults.category.clone());
    let tags = derive_tags(&name, &config.tag_vocabulary);

    debug!(
        name = %name,
        images = images.len(),
        diagnostics = diagnostics.len(),
        "product record assembled"
    );

    ExtractionOutcome {
        record: ProductRecord {
            name,
            category,
            images,
            attributes,
            price,
            shipping_fee,
            seller,
            weight,
            sizes,
            colors,
            tags,
        },
        provenance: Provenance {
            name: name_strategy,
            price: price_strategy,
            seller: seller_strategy,
            weight: weight_strategy,
            shipping_fee: shipping_strategy,
            attributes: attribute_provenance,
            images_defaulted,
        },
        diagnostics,
    }
}

/// Union of all selector hits for one variant axis, first-seen order.
fn collect_variants(doc: &RawDocument, selectors: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for selector in selectors {
        for value in select_all_text(doc, selector) {
            if seen.insert(value.clone()) {
                out.push(value);
            }
        }
    }
    out
}

//! Embedded-object location inside inline-script payloads.
//!
//! Product data on hostile pages usually lives as a JSON blob assigned to a
//! global inside a larger, non-JSON JavaScript statement. Given a marker
//! token (e.g. `window.runParams`), the locator scans forward to the first
//! `{` and extracts the smallest balanced object, ignoring braces inside
//! string literals. The result is handed to strict `serde_json`; loose
//! JavaScript literals can be repaired with [`parse_loose`] as a second step.

use serde_json::Value;

use crate::error::ExtractError;

/// Locate the balanced `{...}` object following the first occurrence of
/// `marker` in `text`.
///
/// Returns `Ok(None)` when the marker is absent or no opening brace follows
/// it. Returns [`ExtractError::MalformedEmbeddedObject`] when an object
/// opens but brace depth never returns to zero before end-of-text — a broken
/// structural assumption worth logging, distinct from a plain miss.
pub fn locate_object<'a>(text: &'a str, marker: &str) -> Result<Option<&'a str>, ExtractError> {
    let Some(marker_at) = text.find(marker) else {
        return Ok(None);
    };
    let after = &text[marker_at + marker.len()..];
    let Some(brace_at) = after.find('{') else {
        return Ok(None);
    };
    let body = &after[brace_at..];

    // Three-field scan state: quote context, pending escape, brace depth.
    // The escape flag is consumed before the quote check so that an escaped
    // backslash followed by a quote toggles string state correctly.
    let mut in_string: Option<char> = None;
    let mut escape_next = false;
    let mut depth: u32 = 0;

    for (i, c) in body.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match in_string {
            Some(quote) => match c {
                '\\' => escape_next = true,
                _ if c == quote => in_string = None,
                _ => {}
            },
            None => match c {
                '"' | '\'' => in_string = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Some(&body[..i + c.len_utf8()]));
                    }
                }
                _ => {}
            },
        }
    }

    Err(ExtractError::MalformedEmbeddedObject {
        marker: marker.to_string(),
    })
}

/// Locate and strictly parse the object following `marker`.
///
/// Distinguishes all three outcomes: `Ok(None)` when nothing was found,
/// [`ExtractError::MalformedEmbeddedObject`] when the scan never closed, and
/// [`ExtractError::UnparsableExtractedObject`] when a balanced substring
/// existed but was not valid JSON.
pub fn extract_object(text: &str, marker: &str) -> Result<Option<Value>, ExtractError> {
    let Some(candidate) = locate_object(text, marker)? else {
        return Ok(None);
    };
    match serde_json::from_str(candidate) {
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ExtractError::UnparsableExtractedObject {
            marker: marker.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Repair a raw JavaScript object literal into parseable JSON.
///
/// Handles the three syntaxes that break strict parsing in practice: single
/// quotes, trailing commas, and unquoted keys. Intended as the caller-chosen
/// fallback after [`ExtractError::UnparsableExtractedObject`].
pub fn parse_loose(raw: &str) -> Result<Value, serde_json::Error> {
    if let Ok(v) = serde_json::from_str(raw) {
        return Ok(v);
    }

    let mut json_str = raw.replace('\'', "\"");

    let trailing_comma = regex::Regex::new(r",\s*([}\]])").unwrap();
    json_str = trailing_comma.replace_all(&json_str, "$1").to_string();

    let unquoted_key = regex::Regex::new(r#"([{,]\s*)(\w+)\s*:"#).unwrap();
    json_str = unquoted_key.replace_all(&json_str, r#"$1"$2":"#).to_string();

    serde_json::from_str(&json_str)
}

/// Navigate a dot path inside a parsed value. Segments are tried as object
/// keys first, then as array indices. `None` when any segment is missing.
pub fn navigate_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match current.get(segment) {
            Some(v) => v,
            None => {
                let idx = segment.parse::<usize>().ok()?;
                current.get(idx)?
            }
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locates_object_after_marker() {
        let text = r#"window.ctx = {"result":{"data":{"subject":"Test Shirt"}}};"#;
        let found = locate_object(text, "window.ctx").unwrap().unwrap();
        assert_eq!(found, r#"{"result":{"data":{"subject":"Test Shirt"}}}"#);

        let parsed: Value = serde_json::from_str(found).unwrap();
        assert_eq!(parsed["result"]["data"]["subject"], "Test Shirt");
    }

    #[test]
    fn test_smallest_balanced_object_in_iife() {
        let text = r#"var x = (function(){ return 1; })(); window.runParams = {"a":{"b":2}}; init();"#;
        let found = locate_object(text, "window.runParams").unwrap().unwrap();
        assert_eq!(found, r#"{"a":{"b":2}}"#);
    }

    #[test]
    fn test_braces_inside_strings_do_not_affect_depth() {
        // Unbalanced brace counts inside the string value.
        let text = r#"cfg = {"note": "use {curly}} braces {{{", "n": 1}"#;
        let found = locate_object(text, "cfg").unwrap().unwrap();
        assert_eq!(found, r#"{"note": "use {curly}} braces {{{", "n": 1}"#);
        assert!(serde_json::from_str::<Value>(found).is_ok());
    }

    #[test]
    fn test_single_quoted_strings_shield_braces() {
        let text = r#"data = {'note': 'a } b', 'k': {'v': 1}} trailing"#;
        let found = locate_object(text, "data").unwrap().unwrap();
        assert_eq!(found, r#"{'note': 'a } b', 'k': {'v': 1}}"#);
    }

    #[test]
    fn test_escaped_backslash_before_quote() {
        // The string value ends in an escaped backslash; the quote after it
        // must close the string, and the brace after that must close the
        // object.
        let text = r#"m = {"path": "C:\\", "x": 1}"#;
        let found = locate_object(text, "m =").unwrap().unwrap();
        assert_eq!(found, r#"{"path": "C:\\", "x": 1}"#);

        let parsed: Value = serde_json::from_str(found).unwrap();
        assert_eq!(parsed["path"], "C:\\");
        assert_eq!(parsed["x"], 1);
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let text = r#"m = {"quote": "he said \"}\" loudly", "y": 2} rest"#;
        let found = locate_object(text, "m").unwrap().unwrap();
        let parsed: Value = serde_json::from_str(found).unwrap();
        assert_eq!(parsed["y"], 2);
    }

    #[test]
    fn test_marker_absent_is_not_found() {
        assert_eq!(locate_object("no data here", "window.ctx").unwrap(), None);
    }

    #[test]
    fn test_no_brace_after_marker_is_not_found() {
        assert_eq!(
            locate_object("window.ctx = null;", "window.ctx").unwrap(),
            None
        );
    }

    #[test]
    fn test_unbalanced_input_is_malformed_not_a_panic() {
        let text = r#"window.ctx = {"open": {"never": "closed""#;
        let err = locate_object(text, "window.ctx").unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedEmbeddedObject {
                marker: "window.ctx".to_string()
            }
        );
    }

    #[test]
    fn test_unparsable_object_is_distinct_from_not_found() {
        // Balanced but raw JS literal syntax: unquoted keys.
        let text = "window.cfg = {price: 19.99, currency: 'EUR'}";
        let err = extract_object(text, "window.cfg").unwrap_err();
        match err {
            ExtractError::UnparsableExtractedObject { marker, .. } => {
                assert_eq!(marker, "window.cfg");
            }
            other => panic!("expected UnparsableExtractedObject, got {other:?}"),
        }

        // And not-found stays a plain miss.
        assert_eq!(extract_object(text, "window.other").unwrap(), None);
    }

    #[test]
    fn test_parse_loose_repairs_js_literals() {
        // Standard JSON passes through.
        let v = parse_loose(r#"{"name": "test"}"#).unwrap();
        assert_eq!(v["name"], "test");

        // Single quotes.
        let v = parse_loose(r#"{'name': 'test'}"#).unwrap();
        assert_eq!(v["name"], "test");

        // Trailing comma.
        let v = parse_loose(r#"{"name": "test",}"#).unwrap();
        assert_eq!(v["name"], "test");

        // Unquoted keys.
        let v = parse_loose(r#"{name: "test", price: 19.99}"#).unwrap();
        assert_eq!(v["price"], 19.99);
    }

    #[test]
    fn test_round_trip_with_nested_structures() {
        let original = serde_json::json!({
            "result": {
                "data": {
                    "items": [{"id": 1, "note": "brace } here"}, {"id": 2}],
                    "title": "nested \"quotes\" and \\slashes\\"
                }
            }
        });
        let text = format!("window.__DATA__ = {}; (function(){{}})();", original);

        let found = locate_object(&text, "window.__DATA__").unwrap().unwrap();
        let reparsed: Value = serde_json::from_str(found).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_navigate_path_keys_and_indices() {
        let v = serde_json::json!({
            "result": {"data": {"items": [{"id": "a"}, {"id": "b"}]}}
        });

        assert_eq!(
            navigate_path(&v, "result.data.items.1.id").unwrap(),
            &Value::String("b".to_string())
        );
        assert!(navigate_path(&v, "result.missing.items").is_none());
        assert!(navigate_path(&v, "result.data.items.7").is_none());
    }
}

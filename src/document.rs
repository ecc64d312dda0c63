//! The fetched page as seen by the extraction core.
//!
//! A [`RawDocument`] is built once by the fetch layer and borrowed read-only
//! by every extractor. The core never refetches, never inspects HTTP status,
//! and assumes login/CAPTCHA redirects were already screened out upstream.

use scraper::Html;
use url::Url;

/// One already-fetched product page: the raw text body plus the parsed DOM.
///
/// Immutable once constructed. Extraction over distinct documents can run in
/// parallel freely since nothing here is ever written after parse.
pub struct RawDocument {
    raw: String,
    dom: Html,
    origin: Option<Url>,
    blocked: bool,
}

impl RawDocument {
    /// Parse a page body. `origin` is used to absolutize root-relative asset
    /// URLs during image harvesting; pass `None` when unknown (root-relative
    /// candidates are then dropped rather than guessed).
    pub fn new(raw_html: impl Into<String>, origin: Option<Url>) -> Self {
        let raw = raw_html.into();
        let dom = Html::parse_document(&raw);
        Self {
            raw,
            dom,
            origin,
            blocked: false,
        }
    }

    /// Record the caller's blocked-page verdict. The core only carries this
    /// flag through; it never evaluates it itself.
    pub fn with_blocked_flag(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn dom(&self) -> &Html {
        &self.dom
    }

    pub fn origin(&self) -> Option<&Url> {
        self.origin.as_ref()
    }

    pub fn looks_like_blocked_page(&self) -> bool {
        self.blocked
    }
}

/// Substring check against known blocking markers (login walls, CAPTCHA
/// interstitials). Helper for the fetch layer; the core does not call it.
pub fn page_has_blocking_marker(raw_html: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| !m.is_empty() && raw_html.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_marker_check() {
        let html = "<html><title>Please verify you are human</title></html>";
        let markers = vec!["verify you are human".to_string(), "login.taobao".to_string()];

        assert!(page_has_blocking_marker(html, &markers));
        assert!(!page_has_blocking_marker("<html>ok</html>", &markers));
        assert!(!page_has_blocking_marker(html, &[]));
    }

    #[test]
    fn test_blocked_flag_passthrough() {
        let doc = RawDocument::new("<html></html>", None).with_blocked_flag(true);
        assert!(doc.looks_like_blocked_page());

        let doc = RawDocument::new("<html></html>", None);
        assert!(!doc.looks_like_blocked_page());
    }
}

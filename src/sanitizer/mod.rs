//! Sanitizer module for stripping ad and tracking scripts from embed HTML
//!
//! The default [`SanitizeMode::Compat`] pipeline applies two textual filters
//! and nothing else:
//!
//! 1. `<script ... src="...ads..." ...></script>` tags are removed.
//! 2. inline `<script>...histats...</script>` blocks are removed.
//!
//! Both are ASCII case-insensitive. They are best-effort filters over text, not an
//! HTML rewrite: scripts whose body contains a `<`, or tags built with single
//! quotes, pass through untouched.
//!
//! [`SanitizeMode::Strict`] runs the same filters, then parses the document
//! and detaches every `<script>` element matched by a [`ScriptRule`]. The
//! serializer normalizes the markup, so strict output is not byte-compatible
//! with compat output.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// Case folding is ASCII only: `ſ` (U+017F) must not match `s`.
static AD_SCRIPT_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?i-u:script)[^>]*(?i-u:src)="[^"]*(?i-u:ads)[^"]*"[^>]*></(?i-u:script)>"#)
        .unwrap()
});

static HISTATS_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?i-u:script)[^>]*>[^<]*(?i-u:histats)[^<]*</(?i-u:script)>").unwrap()
});

/// Which sanitizer pipeline the proxy runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SanitizeMode {
    /// The two textual filters only
    #[default]
    Compat,
    /// Textual filters followed by a parsed `<script>` pass
    Strict,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown sanitize mode: {0}")]
pub struct UnknownModeError(String);

impl FromStr for SanitizeMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compat" => Ok(SanitizeMode::Compat),
            "strict" => Ok(SanitizeMode::Strict),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// A `<script>` element as seen by the strict pass
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptTag<'a> {
    /// Value of the `src` attribute, if any
    pub src: Option<&'a str>,
    /// Concatenated inline text
    pub text: String,
}

/// Predicate deciding whether a parsed `<script>` is dropped
pub trait ScriptRule: Send + Sync {
    fn blocks(&self, script: &ScriptTag<'_>) -> bool;
}

/// Blocks scripts whose `src` contains a marker, ignoring case
#[derive(Debug, Clone)]
pub struct SrcContains(pub String);

impl ScriptRule for SrcContains {
    fn blocks(&self, script: &ScriptTag<'_>) -> bool {
        script
            .src
            .is_some_and(|src| contains_ignore_case(src, &self.0))
    }
}

/// Blocks scripts whose inline text contains a marker, ignoring case
#[derive(Debug, Clone)]
pub struct InlineContains(pub String);

impl ScriptRule for InlineContains {
    fn blocks(&self, script: &ScriptTag<'_>) -> bool {
        contains_ignore_case(&script.text, &self.0)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// The rules matching the two textual filters
pub fn default_rules() -> Vec<Box<dyn ScriptRule>> {
    vec![
        Box::new(SrcContains("ads".to_string())),
        Box::new(InlineContains("histats".to_string())),
    ]
}

/// Apply the two textual filters.
///
/// Returns the input unchanged, byte for byte, when neither pattern matches.
pub fn strip_ad_scripts(html: &str) -> String {
    let without_ads = AD_SCRIPT_SRC.replace_all(html, "");
    HISTATS_INLINE.replace_all(&without_ads, "").into_owned()
}

/// Detach every `<script>` element matched by one of `rules`.
pub fn strip_blocked_scripts(html: &str, rules: &[Box<dyn ScriptRule>]) -> String {
    let mut document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    let blocked: Vec<_> = document
        .select(&script_selector)
        .filter(|element| {
            let tag = ScriptTag {
                src: element.value().attr("src"),
                text: element.text().collect(),
            };
            rules.iter().any(|rule| rule.blocks(&tag))
        })
        .map(|element| element.id())
        .collect();

    for id in blocked {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document.html()
}

/// Sanitizer configured with a mode and a rule set
pub struct Sanitizer {
    mode: SanitizeMode,
    rules: Vec<Box<dyn ScriptRule>>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizeMode::default())
    }
}

impl Sanitizer {
    /// Create a sanitizer with the default rules
    pub fn new(mode: SanitizeMode) -> Self {
        Self::with_rules(mode, default_rules())
    }

    /// Create a sanitizer with custom strict-mode rules
    pub fn with_rules(mode: SanitizeMode, rules: Vec<Box<dyn ScriptRule>>) -> Self {
        Self { mode, rules }
    }

    pub fn mode(&self) -> SanitizeMode {
        self.mode
    }

    /// Run the configured pipeline over an upstream body
    pub fn sanitize(&self, html: &str) -> String {
        let cleaned = strip_ad_scripts(html);
        match self.mode {
            SanitizeMode::Compat => cleaned,
            SanitizeMode::Strict => strip_blocked_scripts(&cleaned, &self.rules),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_ad_script_src() {
        let html = r#"<html><head><script src="https://cdn.example.com/ads/loader.js"></script></head><body>ok</body></html>"#;
        let cleaned = strip_ad_scripts(html);
        assert!(!cleaned.contains("loader.js"));
        assert_eq!(cleaned, "<html><head></head><body>ok</body></html>");
    }

    #[test]
    fn test_removes_ad_script_with_extra_attributes() {
        let html = r#"<script async type="text/javascript" src="//x.com/AdsBox.js" defer></script>"#;
        assert_eq!(strip_ad_scripts(html), "");
    }

    #[test]
    fn test_removes_inline_histats() {
        let html = "<p>a</p><script>var histats=1;</script><p>b</p>";
        assert_eq!(strip_ad_scripts(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_histats_is_case_insensitive() {
        let html = "<SCRIPT type=\"text/javascript\">_HiStAts.push(['x']);</SCRIPT>";
        assert_eq!(strip_ad_scripts(html), "");
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let long_s = "<ſcript src=\"/ads.js\"></script>";
        assert_eq!(strip_ad_scripts(long_s), long_s);

        let long_s = "<ſcript>var hiſtats=1;</ſcript>";
        assert_eq!(strip_ad_scripts(long_s), long_s);

        let inline = "<script>var hiſtats=1;</script>";
        assert_eq!(strip_ad_scripts(inline), inline);

        let src = r#"<script src="https://cdn.example.com/adſ/x.js"></script>"#;
        assert_eq!(strip_ad_scripts(src), src);
    }

    #[test]
    fn test_keeps_unrelated_scripts() {
        let html = r#"<script src="https://vidsrc.to/player.js"></script><script>init();</script>"#;
        assert_eq!(strip_ad_scripts(html), html);
    }

    #[test]
    fn test_inline_script_with_markup_is_not_matched() {
        // The inline filter cannot see past a '<' inside the script body.
        let html = "<script>if (a<b) { histats(); }</script>";
        assert_eq!(strip_ad_scripts(html), html);
    }

    #[test]
    fn test_single_quoted_src_is_not_matched() {
        let html = "<script src='https://cdn.example.com/ads.js'></script>";
        assert_eq!(strip_ad_scripts(html), html);
    }

    #[test]
    fn test_multiple_matches_removed() {
        let html = concat!(
            r#"<script src="/ads1.js"></script>"#,
            "<div>video</div>",
            "<script>histats_counter()</script>",
            r#"<script src="/ads2.js"></script>"#,
        );
        assert_eq!(strip_ad_scripts(html), "<div>video</div>");
    }

    #[test]
    fn test_sanitize_mode_from_str() {
        assert_eq!("compat".parse(), Ok(SanitizeMode::Compat));
        assert_eq!(" STRICT ".parse(), Ok(SanitizeMode::Strict));
        assert!("paranoid".parse::<SanitizeMode>().is_err());
    }

    #[test]
    fn test_rules() {
        let src_rule = SrcContains("ads".to_string());
        let inline_rule = InlineContains("histats".to_string());

        let ad = ScriptTag {
            src: Some("https://cdn.example.com/ADS/x.js"),
            text: String::new(),
        };
        let tracker = ScriptTag {
            src: None,
            text: "window.Histats = {};".to_string(),
        };

        assert!(src_rule.blocks(&ad));
        assert!(!src_rule.blocks(&tracker));
        assert!(inline_rule.blocks(&tracker));
        assert!(!inline_rule.blocks(&ad));
    }

    #[test]
    fn test_compat_sanitizer_matches_text_filters() {
        let sanitizer = Sanitizer::default();
        let html = r#"<body><script src="/ads.js"></script><script>histats()</script>x</body>"#;
        assert_eq!(sanitizer.mode(), SanitizeMode::Compat);
        assert_eq!(sanitizer.sanitize(html), strip_ad_scripts(html));
    }

    #[test]
    fn test_strict_catches_what_patterns_miss() {
        let sanitizer = Sanitizer::new(SanitizeMode::Strict);
        let html = concat!(
            "<html><head>",
            "<script src='https://cdn.example.com/ads.js'></script>",
            "<script>if (a<b) { histats(); }</script>",
            "<script src=\"/player.js\"></script>",
            "</head><body><p>Player</p></body></html>",
        );

        let cleaned = sanitizer.sanitize(html);
        assert!(!cleaned.contains("ads.js"));
        assert!(!cleaned.contains("histats"));
        assert!(cleaned.contains("/player.js"));
        assert!(cleaned.contains("<p>Player</p>"));
    }

    #[test]
    fn test_strict_with_custom_rules() {
        let sanitizer = Sanitizer::with_rules(
            SanitizeMode::Strict,
            vec![Box::new(SrcContains("popunder".to_string()))],
        );
        let html = r#"<html><head><script src="/popunder.js"></script></head><body></body></html>"#;
        assert!(!sanitizer.sanitize(html).contains("popunder"));
    }
}

//! HTML extraction for listing and item pages
//!
//! Extraction is driven by configured CSS selectors so the pipeline itself
//! stays agnostic of any particular site's markup:
//! - listing pages yield item links (`link_selector`)
//! - item pages yield a [`Record`] (`title_selector`, `info_selector`)
//!
//! A page that does not match the expected structure is not an error. Link
//! extraction returns an empty list and record extraction returns `None`;
//! both are routine outcomes for malformed or unexpected pages.
//!
//! These functions are pure: extracting twice from the same document yields
//! the same result.

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// One harvested item, as written to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Item title from the detail page
    pub title: String,

    /// URL of the detail page the record came from
    pub url: String,

    /// Free-form info block from the detail page
    pub info: String,
}

/// Compiled CSS selectors driving extraction
///
/// Built once from [`crate::config::ExtractConfig`] and shared by all
/// workers; `Selector` parsing is validated at config load so construction
/// here does not re-report those errors.
#[derive(Debug, Clone)]
pub struct ExtractRules {
    link_selector: Selector,
    title_selector: Selector,
    info_selector: Selector,
}

impl ExtractRules {
    /// Compiles rules from selector strings
    ///
    /// Returns a description of the first selector that fails to parse.
    pub fn new(
        link_selector: &str,
        title_selector: &str,
        info_selector: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            link_selector: Selector::parse(link_selector)
                .map_err(|e| format!("invalid link selector '{}': {:?}", link_selector, e))?,
            title_selector: Selector::parse(title_selector)
                .map_err(|e| format!("invalid title selector '{}': {:?}", title_selector, e))?,
            info_selector: Selector::parse(info_selector)
                .map_err(|e| format!("invalid info selector '{}': {:?}", info_selector, e))?,
        })
    }
}

impl TryFrom<&crate::config::ExtractConfig> for ExtractRules {
    type Error = String;

    fn try_from(config: &crate::config::ExtractConfig) -> Result<Self, Self::Error> {
        Self::new(
            &config.link_selector,
            &config.title_selector,
            &config.info_selector,
        )
    }
}

/// Extracts item links from a listing page
///
/// Hrefs are resolved against `base_url`, so relative links work. Links
/// that fail to resolve or use a non-HTTP(S) scheme are skipped.
pub fn extract_item_links(html: &str, base_url: &Url, rules: &ExtractRules) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&rules.link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Extracts a record from an item detail page
///
/// Returns `None` when the title selector matches nothing — the page does
/// not have the expected structure. A missing info block is tolerated and
/// yields an empty `info` field.
pub fn extract_record(html: &str, source_url: &str, rules: &ExtractRules) -> Option<Record> {
    let document = Html::parse_document(html);

    let title = document
        .select(&rules.title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())?;

    let info = document
        .select(&rules.info_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    Some(Record {
        title,
        url: source_url.to_string(),
        info,
    })
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

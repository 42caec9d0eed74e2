//! Seed URL enumeration
//!
//! Listing-page URLs come from a template containing the literal `{page}`,
//! expanded over an inclusive page range. Expansion is lazy so a large
//! range does not materialize up front; the pipeline pulls one seed at a
//! time while feeding the page queue.

use crate::config::SeedConfig;

/// A finite, ordered source of listing-page URLs
#[derive(Debug, Clone)]
pub struct SeedSource {
    template: String,
    first_page: u32,
    last_page: u32,
}

impl SeedSource {
    /// Creates a seed source from a template and an inclusive page range
    ///
    /// The template must contain `{page}`; config validation enforces this
    /// before a `SeedSource` is ever built.
    pub fn new(template: impl Into<String>, first_page: u32, last_page: u32) -> Self {
        Self {
            template: template.into(),
            first_page,
            last_page,
        }
    }

    /// Number of listing pages this source will produce
    ///
    /// An inverted range yields no pages, matching what `iter` produces.
    /// Config validation rejects inverted ranges up front, but `new` does
    /// not, so this must not assume the range is well-formed.
    pub fn len(&self) -> usize {
        if self.first_page > self.last_page {
            return 0;
        }
        (self.last_page - self.first_page + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily yields the listing-page URLs in page order
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        (self.first_page..=self.last_page)
            .map(move |page| self.template.replace("{page}", &page.to_string()))
    }
}

impl From<&SeedConfig> for SeedSource {
    fn from(config: &SeedConfig) -> Self {
        Self::new(&config.url_template, config.first_page, config.last_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_template_in_order() {
        let seeds = SeedSource::new("https://example.com/page/{page}", 1, 3);
        let urls: Vec<String> = seeds.iter().collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/page/1",
                "https://example.com/page/2",
                "https://example.com/page/3",
            ]
        );
    }

    #[test]
    fn test_single_page_range() {
        let seeds = SeedSource::new("https://example.com/p/{page}", 7, 7);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds.iter().next().unwrap(), "https://example.com/p/7");
    }

    #[test]
    fn test_len_matches_iteration() {
        let seeds = SeedSource::new("https://example.com/p/{page}", 10, 24);
        assert_eq!(seeds.len(), seeds.iter().count());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let seeds = SeedSource::new("https://example.com/p/{page}", 5, 2);
        assert_eq!(seeds.len(), 0);
        assert!(seeds.is_empty());
        assert_eq!(seeds.iter().count(), 0);
    }
}

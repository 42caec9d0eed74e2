use serde::Deserialize;

/// Main configuration structure for Skimmer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub seeds: SeedConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

/// Worker-pool and queue sizing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of workers fetching listing pages
    #[serde(rename = "page-workers")]
    pub page_workers: usize,

    /// Number of workers fetching item pages
    #[serde(rename = "item-workers")]
    pub item_workers: usize,

    /// Capacity of the listing-page URL queue
    #[serde(rename = "page-queue-capacity", default = "default_page_queue")]
    pub page_queue_capacity: usize,

    /// Capacity of the item-link queue
    #[serde(rename = "link-queue-capacity", default = "default_link_queue")]
    pub link_queue_capacity: usize,

    /// Capacity of the record queue feeding the sink drain
    #[serde(rename = "record-queue-capacity", default = "default_record_queue")]
    pub record_queue_capacity: usize,
}

fn default_page_queue() -> usize {
    100
}

fn default_link_queue() -> usize {
    1000
}

fn default_record_queue() -> usize {
    1000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "scraper-name")]
    pub scraper_name: String,

    /// Version of the scraper
    #[serde(rename = "scraper-version")]
    pub scraper_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Seed enumeration configuration
///
/// Listing-page URLs are generated from a template containing the literal
/// `{page}`, expanded over an inclusive page range.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// URL template, e.g. "https://example.com/page/{page}"
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// First page number (inclusive)
    #[serde(rename = "first-page", default = "default_first_page")]
    pub first_page: u32,

    /// Last page number (inclusive)
    #[serde(rename = "last-page")]
    pub last_page: u32,
}

fn default_first_page() -> u32 {
    1
}

/// CSS selectors driving field extraction
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Selector matching item links on a listing page
    #[serde(rename = "link-selector", default = "default_link_selector")]
    pub link_selector: String,

    /// Selector matching the item title on a detail page
    #[serde(rename = "title-selector", default = "default_title_selector")]
    pub title_selector: String,

    /// Selector matching the item info block on a detail page
    #[serde(rename = "info-selector", default = "default_info_selector")]
    pub info_selector: String,
}

fn default_link_selector() -> String {
    "a.item-link".to_string()
}

fn default_title_selector() -> String {
    "h1".to_string()
}

fn default_info_selector() -> String {
    ".info".to_string()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            link_selector: default_link_selector(),
            title_selector: default_title_selector(),
            info_selector: default_info_selector(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV output file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

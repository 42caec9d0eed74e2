//! Pipeline wiring and staged shutdown
//!
//! This module connects the tiers: seed feeding, the page-worker pool, the
//! item-worker pool, and the single-task sink drain, all joined by bounded
//! queues. Shutdown is staged: the seed sender drops first, then each tier
//! is joined in order, and each queue closes exactly when its producing
//! tier has fully finished. No queue is ever written after close and no
//! tier can block forever on a queue that will never close, by
//! construction rather than by timing.

use crate::config::PipelineConfig;
use crate::extract::{extract_item_links, extract_record, ExtractRules, Record};
use crate::fetch::{FetchError, Fetcher};
use crate::pipeline::metrics::{PipelineMetrics, Summary};
use crate::pipeline::pool::StagePool;
use crate::seed::SeedSource;
use crate::sink::RecordSink;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use url::Url;

/// Runs the full pipeline to completion and returns its summary
///
/// Data flow: seeds → page queue → page workers → link queue → item
/// workers → record queue → sink drain → `sink`.
///
/// Every per-item failure is contained inside the worker that hit it; the
/// only fatal conditions are startup ones, which the caller handles before
/// invoking this function.
pub async fn run_pipeline<S>(
    seeds: SeedSource,
    fetcher: Arc<dyn Fetcher>,
    rules: ExtractRules,
    sink: S,
    config: &PipelineConfig,
) -> Summary
where
    S: RecordSink + Send + 'static,
{
    let start = Instant::now();
    let metrics = Arc::new(PipelineMetrics::new());

    let (page_tx, page_rx) = mpsc::channel::<String>(config.page_queue_capacity);
    let (link_tx, link_rx) = mpsc::channel::<String>(config.link_queue_capacity);
    let (record_tx, record_rx) = mpsc::channel::<Record>(config.record_queue_capacity);

    tracing::info!(
        "starting pipeline: {} page workers, {} item workers, {} seeds",
        config.page_workers,
        config.item_workers,
        seeds.len()
    );

    // Page tier: listing URL -> item links
    let page_pool = {
        let fetcher = Arc::clone(&fetcher);
        let rules = rules.clone();
        StagePool::spawn(
            "page",
            config.page_workers,
            page_rx,
            link_tx,
            Arc::clone(&metrics),
            move |page_url: String| {
                let fetcher = Arc::clone(&fetcher);
                let rules = rules.clone();
                async move {
                    let body = fetcher.fetch(&page_url).await?;
                    let base = Url::parse(&page_url).map_err(|e| FetchError::Network {
                        url: page_url.clone(),
                        message: format!("invalid listing URL: {}", e),
                    })?;
                    Ok::<_, FetchError>(extract_item_links(&body, &base, &rules))
                }
            },
        )
    };

    // Item tier: item URL -> zero or one record
    let item_pool = {
        let fetcher = Arc::clone(&fetcher);
        let rules = rules.clone();
        StagePool::spawn(
            "item",
            config.item_workers,
            link_rx,
            record_tx,
            Arc::clone(&metrics),
            move |item_url: String| {
                let fetcher = Arc::clone(&fetcher);
                let rules = rules.clone();
                async move {
                    let body = fetcher.fetch(&item_url).await?;
                    match extract_record(&body, &item_url, &rules) {
                        Some(record) => Ok::<_, FetchError>(vec![record]),
                        None => {
                            // Expected outcome for pages without the
                            // configured structure; not a failure.
                            tracing::debug!("no record extracted from {}", item_url);
                            Ok(vec![])
                        }
                    }
                }
            },
        )
    };

    // Sink drain: the only task that ever touches the sink, so the sink
    // needs no synchronization of its own.
    let drain = {
        let metrics = Arc::clone(&metrics);
        let mut record_rx = record_rx;
        let mut sink = sink;
        tokio::spawn(async move {
            while let Some(record) = record_rx.recv().await {
                match sink.write(&record) {
                    Ok(()) => metrics.record_written(),
                    Err(error) => {
                        metrics.record_sink_failure();
                        tracing::error!("sink write failed: {}", error);
                    }
                }
            }
            if let Err(error) = sink.flush() {
                metrics.record_sink_failure();
                tracing::error!("sink flush failed: {}", error);
            }
        })
    };

    // Feed the seeds. A full page queue blocks here, which is the one
    // intended backpressure point facing the caller.
    for seed in seeds.iter() {
        if page_tx.send(seed).await.is_err() {
            tracing::error!("page queue closed while seeding");
            break;
        }
    }
    // Last sender to the page queue drops; the page tier sees end-of-stream
    // once it drains what is already buffered.
    drop(page_tx);

    // Staged shutdown. Joining the page pool drops the last senders to the
    // link queue, joining the item pool drops the last senders to the
    // record queue, and the drain exits once the record queue is drained.
    page_pool.join().await;
    item_pool.join().await;
    if let Err(error) = drain.await {
        tracing::error!("sink drain panicked: {}", error);
    }

    let summary = metrics.summary(start.elapsed());
    tracing::info!(
        "pipeline complete: {} records written, {} fetch failures, {} sink failures in {:?}",
        summary.records_written,
        summary.fetch_failures,
        summary.sink_write_failures,
        summary.elapsed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{SinkError, SinkResult};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fetcher serving canned bodies; unknown URLs fail like dead hosts
    struct StubFetcher {
        bodies: HashMap<String, String>,
        failing: HashSet<String>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                failing: HashSet::new(),
            }
        }

        fn with_body(mut self, url: &str, body: String) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }

        fn with_failure(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if self.failing.contains(url) {
                return Err(FetchError::BadStatus {
                    url: url.to_string(),
                    status: 503,
                });
            }
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Network {
                    url: url.to_string(),
                    message: "no such host".to_string(),
                })
        }
    }

    /// Sink collecting records in memory, optionally slow or failing
    #[derive(Clone)]
    struct VecSink {
        records: Arc<Mutex<Vec<Record>>>,
        write_delay: Option<Duration>,
        fail_writes: bool,
    }

    impl VecSink {
        fn new() -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
                write_delay: None,
                fail_writes: false,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                write_delay: Some(delay),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }

        fn collected(&self) -> Vec<Record> {
            self.records.lock().unwrap().clone()
        }
    }

    impl RecordSink for VecSink {
        fn write(&mut self, record: &Record) -> SinkResult<()> {
            if let Some(delay) = self.write_delay {
                std::thread::sleep(delay);
            }
            if self.fail_writes {
                return Err(SinkError::Write("disk full".to_string()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn flush(&mut self) -> SinkResult<()> {
            Ok(())
        }
    }

    fn rules() -> ExtractRules {
        ExtractRules::new("a.item-link", "h1", ".info").unwrap()
    }

    fn pipeline_config(page_workers: usize, item_workers: usize, capacity: usize) -> PipelineConfig {
        PipelineConfig {
            page_workers,
            item_workers,
            page_queue_capacity: capacity,
            link_queue_capacity: capacity,
            record_queue_capacity: capacity,
        }
    }

    fn listing_html(item_paths: &[&str]) -> String {
        let links: String = item_paths
            .iter()
            .map(|path| format!(r#"<a class="item-link" href="{}">item</a>"#, path))
            .collect();
        format!("<html><body>{}</body></html>", links)
    }

    fn item_html(title: &str, info: &str) -> String {
        format!(
            r#"<html><body><h1>{}</h1><div class="info">{}</div></body></html>"#,
            title, info
        )
    }

    /// Three listing pages, two items each; returns (fetcher, item urls)
    fn three_page_fixture() -> (StubFetcher, Vec<String>) {
        let mut fetcher = StubFetcher::new();
        let mut item_urls = Vec::new();

        for page in 1..=3 {
            let page_url = format!("https://test.local/page/{}", page);
            let paths: Vec<String> = (1..=2).map(|i| format!("/item/{}-{}", page, i)).collect();
            let path_refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            fetcher = fetcher.with_body(&page_url, listing_html(&path_refs));

            for path in &paths {
                let item_url = format!("https://test.local{}", path);
                fetcher = fetcher.with_body(
                    &item_url,
                    item_html(&format!("Item {}", path), "details"),
                );
                item_urls.push(item_url);
            }
        }

        (fetcher, item_urls)
    }

    #[tokio::test]
    async fn test_happy_path_three_pages_two_items_each() {
        let (fetcher, item_urls) = three_page_fixture();
        let sink = VecSink::new();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink.clone(),
            &pipeline_config(2, 4, 16),
        )
        .await;

        assert_eq!(summary.records_written, 6);
        assert_eq!(summary.fetch_failures, 0);
        assert_eq!(summary.sink_write_failures, 0);

        // Traceability: every record maps to exactly one derived item URL
        let mut written: Vec<String> =
            sink.collected().into_iter().map(|r| r.url).collect();
        written.sort();
        let mut expected = item_urls;
        expected.sort();
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_all_item_fetches_fail() {
        let (fetcher, item_urls) = three_page_fixture();
        let fetcher = item_urls
            .iter()
            .fold(fetcher, |f, url| f.with_failure(url));
        let sink = VecSink::new();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink.clone(),
            &pipeline_config(2, 4, 16),
        )
        .await;

        assert_eq!(summary.records_written, 0);
        assert_eq!(summary.fetch_failures, item_urls.len() as u64);
        assert!(sink.collected().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failures_account_exactly() {
        // One listing page dead, one item dead; every item either becomes a
        // record or a counted failure, nothing disappears silently.
        let (fetcher, item_urls) = three_page_fixture();
        let fetcher = fetcher
            .with_failure("https://test.local/page/2")
            .with_failure(&item_urls[0]);
        let sink = VecSink::new();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink.clone(),
            &pipeline_config(2, 4, 16),
        )
        .await;

        // Page 2 failing drops its 2 items before the item tier; of the 4
        // reachable items one fails. 2 page+item fetch failures total.
        assert_eq!(summary.fetch_failures, 2);
        assert_eq!(summary.records_written, 3);
    }

    #[tokio::test]
    async fn test_extraction_miss_is_not_a_failure() {
        let page_url = "https://test.local/page/1";
        let fetcher = StubFetcher::new()
            .with_body(page_url, listing_html(&["/item/a", "/item/b"]))
            .with_body(
                "https://test.local/item/a",
                item_html("Real Item", "ok"),
            )
            .with_body(
                "https://test.local/item/b",
                "<html><body>no title here</body></html>".to_string(),
            );
        let sink = VecSink::new();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 1);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink.clone(),
            &pipeline_config(1, 2, 8),
        )
        .await;

        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.fetch_failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_backpressure_capacity_one_slow_sink_loses_nothing() {
        let (fetcher, item_urls) = three_page_fixture();
        let sink = VecSink::slow(Duration::from_millis(10));
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        // Every queue capacity 1: item workers block pushing records while
        // the sink is slow, page workers block pushing links, the seed
        // feeder blocks on the page queue. All of it must drain eventually.
        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink.clone(),
            &pipeline_config(2, 4, 1),
        )
        .await;

        assert_eq!(summary.records_written, item_urls.len() as u64);
        assert_eq!(sink.collected().len(), item_urls.len());
    }

    #[tokio::test]
    async fn test_minimal_configuration_terminates() {
        let (fetcher, _) = three_page_fixture();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            VecSink::new(),
            &pipeline_config(1, 1, 1),
        )
        .await;

        assert_eq!(summary.records_written, 6);
    }

    #[tokio::test]
    async fn test_sink_write_failures_are_nonfatal() {
        let (fetcher, item_urls) = three_page_fixture();
        let sink = VecSink::failing();
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 3);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            sink,
            &pipeline_config(2, 4, 16),
        )
        .await;

        // Drain kept going; failures were counted, not retried
        assert_eq!(summary.records_written, 0);
        assert_eq!(summary.sink_write_failures, item_urls.len() as u64);
        assert_eq!(summary.fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_empty_listing_pages_produce_nothing() {
        let fetcher = StubFetcher::new()
            .with_body("https://test.local/page/1", listing_html(&[]))
            .with_body("https://test.local/page/2", listing_html(&[]));
        let seeds = SeedSource::new("https://test.local/page/{page}", 1, 2);

        let summary = run_pipeline(
            seeds,
            Arc::new(fetcher),
            rules(),
            VecSink::new(),
            &pipeline_config(2, 2, 4),
        )
        .await;

        assert_eq!(summary.records_written, 0);
        assert_eq!(summary.fetch_failures, 0);
    }
}

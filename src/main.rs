//! Skimmer main entry point
//!
//! Command-line interface for the Skimmer listing harvester.

use clap::Parser;
use skimmer::config::load_config_with_hash;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Skimmer: a bounded-concurrency listing harvester
///
/// Skimmer fetches a configured range of listing pages, follows the item
/// links found on each, extracts structured records from the item pages,
/// and streams them to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "skimmer")]
#[command(version)]
#[command(about = "A bounded-concurrency listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long)]
    dry_run: bool,

    /// Override the configured page worker count
    #[arg(long, value_name = "N")]
    page_workers: Option<usize>,

    /// Override the configured item worker count
    #[arg(long, value_name = "N")]
    item_workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if let Some(n) = cli.page_workers {
        config.pipeline.page_workers = n.max(1);
    }
    if let Some(n) = cli.item_workers {
        config.pipeline.item_workers = n.max(1);
    }

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let summary = skimmer::pipeline::run(&config).await?;

    println!(
        "Harvest complete: {} records written to {} in {:.2?}",
        summary.records_written, config.output.csv_path, summary.elapsed
    );
    if summary.fetch_failures > 0 {
        println!("Fetch failures: {}", summary.fetch_failures);
    }
    if summary.sink_write_failures > 0 {
        println!("Sink write failures: {}", summary.sink_write_failures);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skimmer=info,warn"),
            1 => EnvFilter::new("skimmer=debug,info"),
            2 => EnvFilter::new("skimmer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Prints what a run with this configuration would do
fn print_plan(config: &skimmer::Config) {
    let page_count = config.seeds.last_page - config.seeds.first_page + 1;

    println!("=== Skimmer Dry Run ===\n");

    println!("Pipeline:");
    println!("  Page workers: {}", config.pipeline.page_workers);
    println!("  Item workers: {}", config.pipeline.item_workers);
    println!(
        "  Queue capacities: page={}, link={}, record={}",
        config.pipeline.page_queue_capacity,
        config.pipeline.link_queue_capacity,
        config.pipeline.record_queue_capacity
    );

    println!("\nSeeds:");
    println!("  Template: {}", config.seeds.url_template);
    println!(
        "  Pages: {}..={} ({} listing pages)",
        config.seeds.first_page, config.seeds.last_page, page_count
    );

    println!("\nExtraction:");
    println!("  Item links: {}", config.extract.link_selector);
    println!("  Title: {}", config.extract.title_selector);
    println!("  Info: {}", config.extract.info_selector);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} listing pages", page_count);
}

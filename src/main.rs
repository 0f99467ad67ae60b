//! # rentscrape CLI
//!
//! Command-line interface for the rental listing scraper.
//!
//! ## Subcommands
//!
//! - `links`: Collect listing URLs from the search results pages
//! - `extract`: Extract property records from a file of listing URLs
//! - `scrape`: Collect links and extract records in one run
//! - `suburbs`: Fetch suburb profile pages for a CSV table of suburbs
//!
//! Records are written as JSON, links as one URL per line. Both go to
//! stdout unless `--output` is given. Logs go to stderr and, with
//! `--log-file`, to a file.

mod telemetry;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rentscrape::http::HttpClient;
use rentscrape::listing::{
    self, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, ExtractionReport, FetchFailurePolicy, ListingUrl,
    ProgressUpdate, ScrapeConfig,
};
use tokio::sync::mpsc;
use tracing::{instrument, warn};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Scrape rental listings into structured records",
    long_about = None
)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collect listing URLs from the search results pages
    Links(LinksArgs),

    /// Extract property records from a file of listing URLs
    Extract(ExtractArgs),

    /// Collect listing URLs and extract their records
    Scrape(ScrapeArgs),

    /// Fetch suburb profile pages for a table of suburbs
    Suburbs(SuburbsArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Base URL of the listing site
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Minimum time between requests in milliseconds (0 disables pacing)
    #[arg(short, long, default_value = "500")]
    rate: u64,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Retries for transport errors, 429 and 5xx responses
    #[arg(long, default_value = "0")]
    retries: u32,

    /// What to do when a page cannot be fetched (abort|skip)
    #[arg(long, default_value = "abort")]
    on_fetch_error: FetchFailurePolicy,

    /// User agent sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Args, Debug)]
struct LinksArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Number of results pages to visit
    #[arg(short, long, default_value = "1")]
    pages: u32,

    /// Write the links to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// File with one listing URL per line
    #[arg(required = true)]
    input: PathBuf,

    /// Extract the first URL of the input too
    #[arg(long)]
    keep_first: bool,

    /// Write the records to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Number of results pages to visit
    #[arg(short, long, default_value = "1")]
    pages: u32,

    /// Extract the first collected link too
    #[arg(long)]
    keep_first: bool,

    /// Write the records to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SuburbsArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// CSV file with suburb and postcode columns
    #[arg(required = true)]
    input: PathBuf,

    /// State slug used in profile URLs
    #[arg(long, default_value = "vic")]
    state: String,
}

impl SiteArgs {
    fn config(&self) -> listing::ScrapeConfigBuilder {
        ScrapeConfig::builder()
            .base_url(self.base_url.clone())
            .rate_limit_ms(self.rate)
            .timeout_secs(self.timeout)
            .max_retries(self.retries)
            .on_fetch_error(self.on_fetch_error)
            .user_agent(self.user_agent.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_tracing_subscriber(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Links(args) => links_command(args).await?,
        Commands::Extract(args) => extract_command(args).await?,
        Commands::Scrape(args) => scrape_command(args).await?,
        Commands::Suburbs(args) => suburbs_command(args).await?,
    }

    Ok(())
}

#[instrument]
async fn links_command(args: LinksArgs) -> anyhow::Result<()> {
    let config = args.site.config().pages(args.pages).build();
    let client = HttpClient::new(&config)?;

    eprintln!("Generating the list of links...");
    let links = listing::collect_listing_urls(&client, &config).await?;
    eprintln!("Found {} links", links.len());

    let mut text = links.join("\n");
    text.push('\n');
    write_output(args.output, text).await
}

#[instrument]
async fn extract_command(args: ExtractArgs) -> anyhow::Result<()> {
    let config = args.site.config().skip_first_link(!args.keep_first).build();
    let client = HttpClient::new(&config)?;

    let content = tokio::fs::read_to_string(&args.input).await?;
    let urls: Vec<ListingUrl> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    let report = run_extraction(&client, &urls, &config).await?;
    write_output(args.output, serde_json::to_string_pretty(&report)?).await
}

#[instrument]
async fn scrape_command(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = args
        .site
        .config()
        .pages(args.pages)
        .skip_first_link(!args.keep_first)
        .build();
    let client = HttpClient::new(&config)?;

    eprintln!("Generating the list of links...");
    let urls = listing::collect_listing_urls(&client, &config).await?;
    eprintln!("Found {} links", urls.len());

    let report = run_extraction(&client, &urls, &config).await?;
    write_output(args.output, serde_json::to_string_pretty(&report)?).await
}

#[instrument]
async fn suburbs_command(args: SuburbsArgs) -> anyhow::Result<()> {
    let config = args.site.config().state(args.state.clone()).build();
    let client = HttpClient::new(&config)?;

    let rows = listing::read_suburb_table(&args.input)?;
    println!("Fetching {} suburb profiles...", rows.len());

    let pages = listing::fetch_suburb_profiles(&client, &rows, &config).await?;
    for page in &pages {
        println!("{} {} -> {}", page.row.suburb, page.row.postcode, page.url);
    }
    println!("{} of {} suburb profiles available", pages.len(), rows.len());

    Ok(())
}

/// Run the record extractor with a progress bar showing the success rate
async fn run_extraction(
    client: &HttpClient,
    urls: &[ListingUrl],
    config: &ScrapeConfig,
) -> anyhow::Result<ExtractionReport> {
    eprintln!("Fetching the rental data...");
    let total = listing::extraction_slice(urls, config).len();

    let (progress_sender, mut progress_receiver) = mpsc::channel::<ProgressUpdate>(100);

    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(update) = progress_receiver.recv().await {
                progress_bar.inc(1);
                if !update.succeeded {
                    progress_bar.println(format!("Issue with {}", update.url));
                }
                progress_bar.set_message(format!("{:.0}% successful", update.stats.success_rate()));
            }
            progress_bar.finish();
        }
    });

    let result = listing::extract_records(client, urls, config, Some(progress_sender)).await;

    // The sender is dropped with the extraction call, which ends the task.
    if let Err(e) = progress_handle.await {
        warn!("Progress task failed: {}", e);
    }
    let report = result?;

    eprintln!(
        "Extracted {} records: {} of {} successful ({:.0}%)",
        report.records.len(),
        report.stats.success_count,
        report.stats.total_count,
        report.stats.success_rate()
    );
    Ok(report)
}

async fn write_output(output: Option<PathBuf>, content: String) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(&path, content).await?;
            eprintln!("Saved output to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

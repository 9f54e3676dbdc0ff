//! proxy_harvest - collect SOCKS5 proxies from public list pages
//!
//! With no arguments: scrape every source once and overwrite `proxies.txt`.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use proxy_harvest::aggregate;
use proxy_harvest::check::{self, Probe};
use proxy_harvest::{Config, HttpFetcher, Source};

/// Harvest SOCKS5 proxies from public proxy list pages
#[derive(Parser, Debug)]
#[command(name = "proxy_harvest", version, about)]
struct Cli {
    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the sources and write the deduplicated list (the default)
    Scrape(ScrapeArgs),
    /// Read proxy URIs from stdin, print the ones that complete a request
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct ScrapeArgs {
    /// Output file, overwritten
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// How many sources to scrape at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Only scrape this source (repeatable)
    #[arg(long = "source", value_enum)]
    sources: Vec<Source>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Concurrent probes
    #[arg(short, long)]
    workers: Option<usize>,

    /// URL fetched through each proxy
    #[arg(long)]
    url: Option<String>,

    /// Per-probe timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,
}

/// Logs go to stderr; stdout belongs to `check` output.
fn init_logging(cli: &Cli) {
    let log_level = if cli.debug { "debug" } else { cli.log_level.as_str() };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("proxy_harvest={},warn", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    /// The chosen subcommand, `scrape` when none was given
    fn into_command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Scrape(ScrapeArgs::default()))
    }
}

impl ScrapeArgs {
    /// Overlay the flags that were given onto `config`
    fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if !self.sources.is_empty() {
            config.sources = self.sources;
        }
    }
}

impl CheckArgs {
    fn apply(self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.check_workers = workers;
        }
        if let Some(url) = self.url {
            config.check_url = url;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.into_command() {
        Command::Scrape(args) => run_scrape(config, args).await,
        Command::Check(args) => run_check(config, args).await,
    }
}

async fn run_scrape(mut config: Config, args: ScrapeArgs) -> Result<()> {
    args.apply(&mut config);

    let fetcher = HttpFetcher::new(&config).context("failed to build HTTP client")?;
    info!(
        "scraping {} sources, {} at a time",
        config.sources.len(),
        config.concurrency
    );

    let proxies = aggregate::run(&config.sources, &fetcher, config.concurrency).await;

    aggregate::write_output(&config.output, &proxies)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!("wrote {} proxies to {}", proxies.len(), config.output.display());
    Ok(())
}

async fn run_check(mut config: Config, args: CheckArgs) -> Result<()> {
    args.apply(&mut config);

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read proxies from stdin")?;
    let proxies = check::proxy_lines(&input);
    let total = proxies.len();

    let probe = Probe {
        url: config.check_url.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    };
    info!(
        "checking {} proxies against {} with {} workers",
        total, probe.url, config.check_workers
    );

    let alive = check::check_all(proxies, &probe, config.check_workers, |proxy| {
        println!("{}", proxy)
    })
    .await;

    info!("{} of {} proxies alive", alive, total);
    Ok(())
}

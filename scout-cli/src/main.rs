//! Contact Scout CLI
//!
//! Finds an outreach contact (email, contact form, or nothing) for websites.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use scout_fetch::{ChromiumLauncher, FetchConfig};
use scout_runtime::{CrawlConfig, Discoverer};

mod server;

#[derive(Parser)]
#[command(name = "contact-scout")]
#[command(author, version, about = "Contact Scout: outreach contact discovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

/// Crawl limits shared by `discover` and `serve`
#[derive(Args, Debug, Clone)]
struct CrawlArgs {
    /// Maximum pages visited per site
    #[arg(long, env = "SCOUT_MAX_PAGES", default_value = "5")]
    max_pages: usize,

    /// Static fetch timeout in seconds
    #[arg(long, env = "SCOUT_PAGE_TIMEOUT", default_value = "10")]
    page_timeout: u64,

    /// Headless navigation timeout in seconds
    #[arg(long, env = "SCOUT_RENDER_TIMEOUT", default_value = "20")]
    render_timeout: u64,

    /// Wall-clock limit per site in seconds
    #[arg(long, env = "SCOUT_TOTAL_TIMEOUT", default_value = "120")]
    total_timeout: u64,

    /// Wait after headless navigation, in milliseconds
    #[arg(long, env = "SCOUT_SETTLE_MS", default_value = "5000")]
    settle_ms: u64,

    /// Chromium binary (auto-detected when unset)
    #[arg(long, env = "SCOUT_CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Never escalate to headless rendering
    #[arg(long, env = "SCOUT_NO_HEADLESS")]
    no_headless: bool,

    /// Also crawl about and editorial pages
    #[arg(long)]
    about: bool,

    /// Sites crawled at once in batch mode
    #[arg(long, env = "SCOUT_MAX_CONCURRENT", default_value = "4")]
    max_concurrent: usize,
}

impl CrawlArgs {
    fn fetch_config(&self) -> FetchConfig {
        let mut fetch = FetchConfig::default()
            .with_timeout(self.page_timeout)
            .with_render_timeout(self.render_timeout)
            .with_settle_ms(self.settle_ms);
        if let Some(path) = &self.chrome_path {
            fetch = fetch.with_chrome_path(path.clone());
        }
        if self.no_headless {
            fetch = fetch.static_only();
        }
        fetch
    }

    fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig::default()
            .with_fetch(self.fetch_config())
            .with_max_pages(self.max_pages)
            .with_page_timeout(self.page_timeout)
            .with_total_timeout(Duration::from_secs(self.total_timeout))
            .with_about_pages(self.about)
            .with_max_concurrent(self.max_concurrent)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Discover contacts for one or more websites
    Discover {
        /// Site URLs; `https://` is assumed when the scheme is missing
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        crawl: CrawlArgs,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save to contacts_<timestamp>.json when no --output is given
        #[arg(long)]
        save: bool,

        /// Include crawl statistics in the output
        #[arg(long)]
        stats: bool,
    },

    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "SCOUT_BIND", default_value = "0.0.0.0:8000")]
        bind: String,

        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Check that headless Chromium can be launched
    Status {
        /// Chromium binary (auto-detected when unset)
        #[arg(long, env = "SCOUT_CHROME_PATH")]
        chrome_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the JSON reports
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Discover {
            urls,
            crawl,
            output,
            save,
            stats,
        } => {
            run_discover(&urls, &crawl, output, save, stats).await?;
        }
        Commands::Serve { bind, crawl } => {
            let discoverer = Discoverer::new(crawl.crawl_config())?;
            let state = server::AppState::new(discoverer, crawl.max_concurrent);
            server::serve(&bind, state).await?;
        }
        Commands::Status { chrome_path } => {
            check_status(chrome_path).await?;
        }
    }

    Ok(())
}

async fn run_discover(
    urls: &[String],
    crawl: &CrawlArgs,
    output: Option<PathBuf>,
    save: bool,
    stats: bool,
) -> Result<()> {
    let discoverer = Discoverer::new(crawl.crawl_config())?;

    let mut results = if stats {
        let mut reports = Vec::with_capacity(urls.len());
        for url in urls {
            let value = match discoverer.discover(url).await {
                Ok(report) => serde_json::to_value(&report)?,
                Err(e) => serde_json::to_value(scout_core::DiscoveryReport::error(e.to_string()))?,
            };
            reports.push(value);
        }
        reports
    } else {
        discoverer
            .discover_batch(urls)
            .await
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?
    };

    let json = if results.len() == 1 {
        results.remove(0)
    } else {
        Value::Array(results)
    };
    let rendered = serde_json::to_string_pretty(&json)?;

    let output_path = output.or_else(|| {
        save.then(|| {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
            PathBuf::from(format!("contacts_{}.json", timestamp))
        })
    });

    match output_path {
        Some(path) => {
            fs::write(&path, &rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("📄 Results saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

async fn check_status(chrome_path: Option<PathBuf>) -> Result<()> {
    println!("🔌 Checking headless Chromium...\n");

    let mut config = FetchConfig::default();
    if let Some(path) = chrome_path {
        config = config.with_chrome_path(path);
    }
    let location = config
        .chrome_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "auto-detected".to_string());

    match ChromiumLauncher::new(config).probe().await {
        Ok(()) => {
            println!("✅ Headless Chromium launches and shuts down cleanly");
            println!("   Binary: {}", location);
        }
        Err(e) => {
            println!("❌ Headless Chromium unavailable: {}", e);
            println!("   Binary: {}", location);
            println!("\n   Install Chromium or Chrome, or point SCOUT_CHROME_PATH at it.");
            println!("   Without it, run with --no-headless (static fetches only).");
        }
    }

    Ok(())
}

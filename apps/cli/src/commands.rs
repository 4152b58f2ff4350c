//! CLI command definitions, routing, and tracing setup.

use std::path::Path;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docreport_cache::HttpCache;
use docreport_core::{
    ProgressReporter, download, latest_versions, pep_report, whats_new,
};
use docreport_crawler::CachedClient;
use docreport_shared::{AppConfig, Report, cache_db_path, init_config, load_config};

use crate::output;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docreport — scrape a documentation site into tabular reports.
#[derive(Parser)]
#[command(
    name = "docreport",
    version,
    about = "Scrape release notes, version statuses, downloads, and proposal statuses.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Clear the HTTP response cache before running.
    #[arg(short = 'c', long, global = true)]
    pub clear_cache: bool,

    /// Report destination: console table or delimited file.
    #[arg(short, long, default_value = "pretty", global = true)]
    pub output: OutputTarget,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where a tabular report goes.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputTarget {
    /// Aligned console table.
    Pretty,
    /// Timestamped CSV under the results directory.
    File,
}

/// Top-level CLI subcommands — one per report mode.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Release-notes report: one row per what's-new article.
    WhatsNew,

    /// Version/status report from the index sidebar.
    LatestVersions,

    /// Download the A4 PDF documentation archive.
    Download,

    /// Proposal status aggregation with declared/real cross-validation.
    Pep,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

impl Command {
    /// Stable mode name, used for report file naming.
    fn mode_name(&self) -> &'static str {
        match self {
            Command::WhatsNew => "whats-new",
            Command::LatestVersions => "latest-versions",
            Command::Download => "download",
            Command::Pep => "pep",
            Command::Config { .. } => "config",
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docreport=info",
        1 => "docreport=debug",
        _ => "docreport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    info!("scraper started");
    let config = load_config()?;

    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        };
    }

    let cache = HttpCache::open(&cache_db_path()?).await?;
    let client = CachedClient::new(cache)?;
    if cli.clear_cache {
        client.clear_cache().await?;
    }

    let progress = CliProgress::new();
    let report = match &cli.command {
        Command::WhatsNew => {
            Some(whats_new(&client, &config.site.docs_url()?, &progress).await?)
        }
        Command::LatestVersions => Some(latest_versions(&client, &config.site.docs_url()?).await?),
        Command::Download => {
            let downloads_dir = Path::new(&config.output.downloads_dir);
            let path = download(&client, &config.site.docs_url()?, downloads_dir).await?;
            println!("Archive saved to {}", path.display());
            None
        }
        Command::Pep => Some(pep_report(&client, &config.site.peps_url()?, &progress).await?),
        Command::Config { .. } => unreachable!("handled above"),
    };
    progress.done();

    if let Some(report) = report {
        control_output(&report, cli.command.mode_name(), cli.output, &config)?;
    }

    info!("scraper finished");
    Ok(())
}

/// Deliver a finished report to the selected output target.
fn control_output(
    report: &Report,
    mode: &str,
    target: OutputTarget,
    config: &AppConfig,
) -> Result<()> {
    match target {
        OutputTarget::Pretty => {
            print!("{}", output::render_table(report));
        }
        OutputTarget::File => {
            let results_dir = Path::new(&config.output.results_dir);
            let path = output::write_csv_file(report, results_dir, mode)?;
            info!(path = %path.display(), "report file saved");
            println!("Report saved to {}", path.display());
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, total_estimate: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total_estimate}] {url}"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}

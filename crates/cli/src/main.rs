mod echo;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, ensure};
use clap::Parser;
use epaper_core::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use epaper_core::{Converter, Credentials, EpaperClient, EpaperConfig, IssueDate};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::echo::{format_size, print_banner, print_error, print_info, print_report, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `latest` or a valid `YYYYMMDD` date.
fn parse_issue_date(value: &str) -> Result<String, String> {
    if value == "latest" {
        return Ok(value.to_string());
    }
    value
        .parse::<IssueDate>()
        .map(|date| date.compact())
        .map_err(|_| format!("expected 'latest' or a date as YYYYMMDD, got '{}'", value))
}

fn parse_base_url(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

/// Download e-paper newspaper issues as EPUB files
#[derive(Parser, Debug)]
#[command(name = "epaper")]
#[command(version, about = "Download e-paper newspaper issues as EPUB files", long_about = None)]
struct Args {
    /// Issues to download: "latest" or dates as YYYYMMDD
    #[arg(value_name = "DATE", default_value = "latest", value_parser = parse_issue_date)]
    dates: Vec<String>,

    /// Edition code or title, e.g. "az-d" or "Dürener Zeitung"
    #[arg(short, long, env = "AZAN_AUSGABE", required_unless_present = "list_editions")]
    edition: Option<String>,

    /// Login name
    #[arg(long, env = "AZAN_USER", requires = "password")]
    user: Option<String>,

    /// Login password
    #[arg(long, env = "AZAN_PASS", hide_env_values = true, requires = "user")]
    password: Option<String>,

    /// List the available editions and exit
    #[arg(long)]
    list_editions: bool,

    /// Directory the EPUB files are written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Root URL of the e-paper service
    #[arg(long, default_value = DEFAULT_BASE_URL, value_name = "URL", value_parser = parse_base_url)]
    base_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> EpaperConfig {
        let mut builder = EpaperConfig::builder()
            .base_url(self.base_url.as_str())
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            builder = builder.credentials(Credentials::new(user.as_str(), password.as_str()));
        }
        builder.build()
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "epaper_core=debug" } else { "epaper_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    if !args.list_editions {
        ensure!(
            args.output_dir.is_dir(),
            "Output directory does not exist: {}",
            args.output_dir.display()
        );
    }

    let config = args.config();
    let total = 2 + args.dates.len();

    print_step(1, total, &format!("Loading site information from {}", config.base_url.bright_white()));
    let client = EpaperClient::new(config.clone()).context("Failed to create HTTP client")?;
    let site = client.site_info().await.context("Failed to load site information")?;

    if args.list_editions {
        for edition in site.catalog.editions() {
            println!("{:<6}: {}", edition.code, edition.title);
        }
        return Ok(());
    }

    let name = args.edition.as_deref().context("No edition given")?;
    let edition = site.catalog.resolve(name)?;
    print_step(2, total, &format!("Logging in for {}", edition.title.bright_white()));
    let session = client.login(&edition).await.context("Login failed")?;
    tracing::debug!(edition = %edition.code, issues = args.dates.len(), output = %args.output_dir.display(), "session ready");

    let converter = Converter::new(session, config, site.imprint);
    for (i, date) in args.dates.iter().enumerate() {
        print_step(3 + i, total, &format!("Converting issue {}", date.bright_white()));
        let started = Instant::now();
        let (path, report) = converter
            .convert_to_file(date, &args.output_dir)
            .await
            .with_context(|| format!("Failed to convert issue {}", date))?;

        let size = std::fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        print_success(&format!("Written {} ({})", path.display().bright_white(), format_size(size)));
        if args.verbose {
            print_report(&report, started.elapsed());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

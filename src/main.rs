// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use std::process::ExitCode;
use tracing::{info, warn};

use vanguard_http_analyzer::app::{self, App, ScanOutcome};
use vanguard_http_analyzer::config::{RuleSpec, ScanConfig, DEFAULT_CONCURRENCY};
use vanguard_http_analyzer::core::error::InputError;
use vanguard_http_analyzer::core::http_client::HttpFetcher;
use vanguard_http_analyzer::core::models::{HttpMethod, RequestDescriptor};
use vanguard_http_analyzer::core::report::OutputFormat;
use vanguard_http_analyzer::logging;

#[derive(Parser, Debug)]
#[command(
    name = "vanguard-http-analyzer",
    about = "Analyse HTTP endpoints for missing protections and information leaks",
    version
)]
struct Cli {
    /// Target URL(s), including the scheme (http:// or https://)
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,

    /// HTTP method to use
    #[arg(
        short = 'X',
        long,
        default_value = "GET",
        ignore_case = true,
        value_parser = ["GET", "POST", "PUT", "DELETE"]
    )]
    method: String,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Per-target timeout in seconds, redirects included
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Maximum number of redirects to follow
    #[arg(long, default_value_t = 10)]
    max_redirects: usize,

    /// Number of targets fetched at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Verify TLS certificates instead of accepting any certificate
    #[arg(long)]
    strict_tls: bool,

    /// Extra sensitive body pattern, as KEY=DESCRIPTION (repeatable)
    #[arg(long = "extra-pattern", value_name = "KEY=DESCRIPTION")]
    extra_patterns: Vec<RuleSpec>,

    /// Extra vulnerability indicator, as KEY=DESCRIPTION (repeatable)
    #[arg(long = "extra-indicator", value_name = "KEY=DESCRIPTION")]
    extra_indicators: Vec<RuleSpec>,

    /// Built-in vulnerability indicator to skip (repeatable)
    #[arg(long = "ignore-indicator", value_name = "KEY")]
    ignored_indicators: Vec<String>,

    /// Mirror log output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ScanConfig {
        ScanConfig {
            timeout_secs: self.timeout,
            max_redirects: self.max_redirects,
            accept_invalid_certs: !self.strict_tls,
            concurrency: self.concurrency,
            format: self.format,
            extra_patterns: self.extra_patterns.clone(),
            extra_indicators: self.extra_indicators.clone(),
            ignored_indicators: self.ignored_indicators.clone(),
            ..ScanConfig::default()
        }
    }

    fn requests(&self) -> Result<Vec<RequestDescriptor>, InputError> {
        let method = HttpMethod::parse(&self.method)?;
        self.urls
            .iter()
            .map(|url| RequestDescriptor::parse(url, method))
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match logging::initialize_logging(cli.verbose) {
        Ok(log_path) => info!(log_path = %log_path.display(), "Logging initialized."),
        Err(e) => eprintln!("warning: logging disabled: {}", e),
    }

    let requests = match cli.requests() {
        Ok(requests) => requests,
        Err(e) => {
            warn!(error = %e, "Rejected input.");
            eprintln!("❌ Error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let config = cli.config();
    info!(targets = requests.len(), format = %config.format, "Starting scan run.");

    let fetcher = HttpFetcher::new(config.http_options())?;
    let runner = App::new(fetcher, config.catalog(), config.concurrency);
    let formatter = config.format.formatter();

    let outcomes = runner.scan_all(requests).await;
    for outcome in &outcomes {
        match outcome {
            ScanOutcome::Analyzed(report) => println!("{}", formatter.format(report)?),
            ScanOutcome::Failed { url, error } => eprintln!("❌ Error: {} for {}", error, url),
        }
    }

    Ok(ExitCode::from(app::exit_code(&outcomes) as u8))
}

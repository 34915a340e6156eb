//! Command-line scanner: scan one file and print the verdict.

use atlant_scan::client::{scan_with_transport, ClientConfig, PollPolicy};
use atlant_scan::core::{ScanMetadata, ScanSettings, ScanSubmission};
use atlant_scan::report::{render_json, render_text};
use atlant_scan::transport::ReqwestTransport;
use atlant_scan::{Credentials, ScanError, Scope};

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "atlant-scanner")]
#[command(about = "Scan a file with a remote scanning service and print the verdict")]
#[command(version)]
struct Cli {
    /// Authorization service address (host:port or URL)
    auth_address: String,

    /// Scanning service address (host:port or URL)
    scan_address: String,

    /// OAuth2 client id
    client_id: String,

    /// OAuth2 client secret
    client_secret: String,

    /// File to scan
    file_path: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Give up after this many task polls
    #[arg(long, value_name = "N")]
    max_polls: Option<u32>,

    /// Give up if no verdict arrives within this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Extra root CA certificate (PEM)
    #[arg(long, value_name = "PATH")]
    ca_cert: Option<PathBuf>,

    /// Scan inside archives
    #[arg(long, value_name = "BOOL")]
    scan_archives: Option<bool>,

    /// Maximum archive nesting depth
    #[arg(long, value_name = "N")]
    max_nested: Option<u32>,

    /// Scan time limit in seconds
    #[arg(long, value_name = "N")]
    max_scan_time: Option<u32>,

    /// Stop at the first detection
    #[arg(long, value_name = "BOOL")]
    stop_on_first: Option<bool>,

    /// Allow metadata to be sent upstream
    #[arg(long, value_name = "BOOL")]
    allow_upstream_metadata: Option<bool>,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut poll = PollPolicy::unbounded();
        if let Some(max) = self.max_polls {
            poll = poll.with_max_polls(max);
        }
        if let Some(secs) = self.timeout {
            poll = poll.with_deadline(Duration::from_secs(secs));
        }

        let mut config = ClientConfig::default().with_poll_policy(poll);
        if let Some(path) = &self.ca_cert {
            config = config.with_ca_certificate(path);
        }
        config
    }

    fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            scan_archives: self.scan_archives,
            max_nested: self.max_nested,
            max_scan_time: self.max_scan_time,
            stop_on_first: self.stop_on_first,
            allow_upstream_metadata: self.allow_upstream_metadata,
            ..ScanSettings::default()
        }
    }

    fn submission(&self) -> ScanSubmission {
        let settings = self.scan_settings();
        let submission = ScanSubmission::from_path(&self.file_path);
        if settings.is_empty() {
            submission
        } else {
            submission.with_metadata(ScanMetadata::new().with_scan_settings(settings))
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, ScanError> {
    let config = cli.client_config();
    let transport = Arc::new(ReqwestTransport::new(&config)?);
    let credentials = Credentials::new(cli.auth_address.as_str(), cli.client_id.as_str(), cli.client_secret.as_str())
        .with_scope(Scope::Scan);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let report = scan_with_transport(
        transport,
        &credentials,
        cli.scan_address.as_str(),
        &cli.submission(),
        config,
        &cancel,
    )
    .await?;

    tracing::debug!(polls = report.polls, duration_ms = report.duration.as_millis() as u64, "Scan finished");

    if cli.json {
        let mut json = render_json(&report)?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(render_text(&report))
    }
}

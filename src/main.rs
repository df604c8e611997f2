use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use port_probe::ports;
use port_probe::scanner::{self, ScanConfig};
use port_probe::types::{PortStatus, ScanReport};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

/// port-probe — bounded-concurrency async TCP connect scanner for a single host.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-probe",
    version,
    about = "Bounded-concurrency async TCP connect scanner for a single host.",
    long_about = None
)]
struct Cli {
    /// Target host: IP address or hostname.
    target: String,

    /// Comma-separated port list, e.g. "22,80,443". Takes precedence over --range.
    #[arg(long)]
    ports: Option<String>,

    /// Inclusive port range, e.g. "1-1024".
    #[arg(long)]
    range: Option<String>,

    /// Max concurrent TCP connect attempts.
    #[arg(long, default_value_t = 500)]
    concurrency: usize,

    /// Per-attempt connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 400)]
    timeout_ms: u64,

    /// Also print closed and errored ports.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Write the full report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // Port expansion errors are fatal before any network activity.
    let port_list = ports::select_ports(cli.ports.as_deref(), cli.range.as_deref())?;

    // Ctrl-C cancels the scan; already-determined outcomes are still reported.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    let config = ScanConfig {
        timeout: Duration::from_millis(cli.timeout_ms),
        concurrency: cli.concurrency,
    };
    let report = scanner::scan_with_cancel(&cli.target, &port_list, config, cancel).await?;

    print_report(&report, cli.verbose);

    if let Some(path) = cli.output.as_deref() {
        write_report_json(path, &report)?;
        println!("wrote JSON report to {}", path.display());
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).compact().init();
}

fn print_report(report: &ScanReport, verbose: bool) {
    for port in report.open_ports() {
        println!("open:{port}");
    }
    if verbose {
        let mut rest: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| !o.status.is_open())
            .collect();
        rest.sort_unstable_by_key(|o| o.port);
        for o in &rest {
            match &o.status {
                PortStatus::Closed => println!("closed:{}", o.port),
                PortStatus::Error(reason) => println!("error:{}:{}", o.port, reason),
                PortStatus::Open => {}
            }
        }
    }
    println!(
        "scanned {}/{} ports, {} open{}",
        report.completed,
        report.total,
        report.open_count,
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

fn write_report_json(path: &std::path::Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

use crate::probe::{Probe, TcpProbe};
use crate::types::{PortStatus, ScanOutcome, ScanReport};
use anyhow::{anyhow, Context, Result};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::lookup_host;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use ::time::{format_description::well_known, OffsetDateTime};

/// Immutable scan parameters, fixed before the first attempt is dispatched.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Hard deadline per connection attempt.
    pub timeout: Duration,
    /// Maximum simultaneous in-flight attempts (slot count).
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(400),
            concurrency: 500,
        }
    }
}

/// Probe every port in `ports` on `target` with bounded concurrency and a
/// per-attempt timeout, recording exactly one outcome per submitted port.
///
/// - Limits concurrent socket attempts with a `Semaphore`; a slot is held
///   until the attempt's outcome is recorded, never released early.
/// - Bounds each attempt with `tokio::time::timeout` regardless of the
///   socket's own defaults.
/// - Ports are dispatched in input order; outcome order follows network
///   timing and carries no meaning.
pub async fn scan(target: &str, ports: &[u16], config: ScanConfig) -> Result<ScanReport> {
    scan_internal(target, ports, config, CancellationToken::new(), Arc::new(TcpProbe)).await
}

/// Variant that accepts a `CancellationToken` for cooperative early
/// termination. On cancellation no new attempts start, in-flight attempts
/// are aborted with a distinct `Error("cancelled")` outcome, and the call
/// returns once already-dispatched workers have unwound.
pub async fn scan_with_cancel(
    target: &str,
    ports: &[u16],
    config: ScanConfig,
    cancel: CancellationToken,
) -> Result<ScanReport> {
    scan_internal(target, ports, config, cancel, Arc::new(TcpProbe)).await
}

/// Variant with a caller-supplied connection strategy. Used by tests to
/// substitute an instrumented double for the real network.
pub async fn scan_with_probe(
    target: &str,
    ports: &[u16],
    config: ScanConfig,
    cancel: CancellationToken,
    probe: Arc<dyn Probe>,
) -> Result<ScanReport> {
    scan_internal(target, ports, config, cancel, probe).await
}

async fn scan_internal(
    target: &str,
    ports: &[u16],
    config: ScanConfig,
    cancel: CancellationToken,
    probe: Arc<dyn Probe>,
) -> Result<ScanReport> {
    let ip = resolve_target(target).await?;
    let timeout = config.timeout;
    let total = ports.len() as u64;

    debug!(
        target,
        %ip,
        ports = ports.len(),
        concurrency = config.concurrency,
        timeout_ms = timeout.as_millis() as u64,
        "starting scan"
    );

    let open_count = Arc::new(AtomicU64::new(0));
    let outcomes: Arc<Mutex<Vec<ScanOutcome>>> =
        Arc::new(Mutex::new(Vec::with_capacity(ports.len())));

    let sem = Arc::new(Semaphore::new(config.concurrency.clamp(1, 5_000)));
    let mut set = JoinSet::new();

    for &port in ports {
        // Stop dispatching as soon as cancellation is requested; do not sit
        // in the permit queue behind attempts that are still timing out.
        let permit = tokio::select! {
            _ = cancel.cancelled() => break,
            permit = sem.clone().acquire_owned() => {
                permit.expect("semaphore never closed")
            }
        };

        let outcomes = outcomes.clone();
        let open_count = open_count.clone();
        let cancel = cancel.clone();
        let probe = probe.clone();

        set.spawn(async move {
            let _permit = permit; // slot held until the outcome is recorded

            let addr = SocketAddr::new(ip, port);
            let start = Instant::now();
            let attempt = tokio::select! {
                _ = cancel.cancelled() => None,
                res = time::timeout(timeout, probe.connect(addr)) => Some(res),
            };

            let (status, latency_ms) = match attempt {
                // Aborted mid-attempt: distinguishable from a genuine
                // negative result, never reported as Closed.
                None => (PortStatus::Error("cancelled".into()), None),
                Some(Ok(Ok(()))) => {
                    (PortStatus::Open, Some(start.elapsed().as_millis() as u64))
                }
                Some(Ok(Err(e))) => (classify_connect_error(port, &e), None),
                // No definitive answer within the deadline.
                Some(Err(_elapsed)) => (PortStatus::Closed, None),
            };

            if status.is_open() {
                open_count.fetch_add(1, Ordering::Relaxed);
            }
            let outcome = ScanOutcome {
                port,
                status,
                latency_ms,
                timestamp: now_rfc3339(),
            };
            let mut guard = outcomes.lock().await;
            guard.push(outcome);
        });
    }

    while let Some(_res) = set.join_next().await {}

    let outcomes_vec = std::mem::take(&mut *outcomes.lock().await);
    let report = ScanReport {
        target: target.to_string(),
        total,
        completed: outcomes_vec.len() as u64,
        open_count: open_count.load(Ordering::Relaxed),
        cancelled: cancel.is_cancelled(),
        outcomes: outcomes_vec,
    };
    debug!(
        completed = report.completed,
        open = report.open_count,
        cancelled = report.cancelled,
        "scan finished"
    );
    Ok(report)
}

/// Sort a connect failure into the outcome taxonomy: anything the remote
/// side (or the path to it) did counts as `Closed`; failures to even mount
/// the attempt, such as running out of descriptors, are per-port errors.
fn classify_connect_error(port: u16, e: &io::Error) -> PortStatus {
    use io::ErrorKind::*;
    match e.kind() {
        ConnectionRefused | ConnectionReset | ConnectionAborted | TimedOut
        | HostUnreachable | NetworkUnreachable => PortStatus::Closed,
        _ => {
            warn!(port, error = %e, "probe could not be attempted");
            PortStatus::Error(e.to_string())
        }
    }
}

/// Resolve the target once, before any attempt is dispatched, so every port
/// probes the same address. A literal IP skips the resolver.
async fn resolve_target(target: &str) -> Result<IpAddr> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = lookup_host((target, 0u16))
        .await
        .with_context(|| format!("failed to resolve target: {target}"))?;
    addrs
        .next()
        .map(|sa| sa.ip())
        .ok_or_else(|| anyhow!("no addresses found for target: {target}"))
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

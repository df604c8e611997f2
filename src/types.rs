use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of a single port probe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    Open,
    /// Actively refused, or no answer within the timeout. A plain connect
    /// scan cannot tell closed from filtered, so the two are merged.
    Closed,
    /// The probe could not be meaningfully attempted (socket exhaustion,
    /// cancellation, ...). Never folded into `Closed`.
    Error(String),
}

impl PortStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, PortStatus::Open)
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatus::Open => write!(f, "open"),
            PortStatus::Closed => write!(f, "closed"),
            PortStatus::Error(reason) => write!(f, "error:{reason}"),
        }
    }
}

/// One recorded probe outcome for a port on the target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub port: u16,
    pub status: PortStatus,
    /// Connect latency for `Open` ports; `None` otherwise.
    pub latency_ms: Option<u64>,
    pub timestamp: String,
}

/// Aggregate results for one scan run.
///
/// `completed` equals `total` on a full run. On a cancelled run, ports
/// missing from `outcomes` are the ones that were never dispatched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanReport {
    pub target: String,
    pub total: u64,
    pub completed: u64,
    pub open_count: u64,
    pub cancelled: bool,
    pub outcomes: Vec<ScanOutcome>,
}

impl ScanReport {
    /// Ports classified `Open`, ascending.
    pub fn open_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .outcomes
            .iter()
            .filter(|o| o.status.is_open())
            .map(|o| o.port)
            .collect();
        ports.sort_unstable();
        ports
    }
}

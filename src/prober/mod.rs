//! Reachability probes. The classifier only ever sees a boolean; the concrete probers
//! keep the reason a probe failed long enough to log it.

mod icmp;
mod system;

pub use icmp::IcmpProber;
pub use system::SystemPing;

use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProbeConfig;

/// Answers whether a single address replied to one echo request.
pub trait Prober {
    fn probe(&self, address: &str) -> bool;
}

impl<F> Prober for F
where
    F: Fn(&str) -> bool,
{
    fn probe(&self, address: &str) -> bool {
        self(address)
    }
}

/// How probes are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Shell out to the system `ping` utility
    #[default]
    Ping,
    /// Send the echo request over a raw ICMP socket (needs privileges)
    Icmp,
}

impl std::fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeMethod::Ping => write!(f, "ping"),
            ProbeMethod::Icmp => write!(f, "icmp"),
        }
    }
}

/// Why a probe came back negative. Collapsed to `false` at the [`Prober`] boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("no reply within {0} ms")]
    Timeout(u64),
    #[error("ping exited with status {0:?}")]
    NoReply(Option<i32>),
    #[error("not an IPv4 address")]
    InvalidAddress,
    #[error("permission denied")]
    PermissionDenied,
    #[error("io error: {0}")]
    Io(String),
}

impl ProbeFailure {
    fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ProbeFailure::PermissionDenied,
            _ => ProbeFailure::Io(err.to_string()),
        }
    }
}

/// Log the failure cause and reduce the outcome to reachable/unreachable.
pub(crate) fn collapse(
    method: ProbeMethod,
    address: &str,
    outcome: Result<(), ProbeFailure>,
) -> bool {
    match outcome {
        Ok(()) => {
            debug!(%method, address, "probe replied");
            true
        }
        Err(reason) => {
            debug!(%method, address, %reason, "probe failed");
            false
        }
    }
}

/// Build the prober selected by the configuration.
pub fn build_prober(config: &ProbeConfig) -> Arc<dyn Prober + Send + Sync> {
    match config.method {
        ProbeMethod::Ping => Arc::new(SystemPing::new().with_timeout(config.timeout_ms)),
        ProbeMethod::Icmp => Arc::new(IcmpProber::new().with_timeout(config.timeout_ms)),
    }
}

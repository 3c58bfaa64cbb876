//! Connectivity classification. Derives the modem fallback address for an ATM and
//! maps the primary/fallback probe outcomes onto a three-way status.

mod classifier;
mod modem;

pub use classifier::{classify, classify_all, classify_concurrent};

use serde::{Deserialize, Serialize};

/// An ATM as listed in the machine file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    #[serde(rename = "ip", alias = "address")]
    pub address: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Reachability of an ATM derived from its primary and modem probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectivityStatus {
    /// Primary address answered
    Online,
    /// Only the modem answered; the ATM is reachable over the DSL line alone
    #[serde(rename = "OnlyADSL", alias = "OnlyFallback")]
    OnlyFallback,
    Offline,
}

impl ConnectivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityStatus::Online => "Online",
            ConnectivityStatus::OnlyFallback => "OnlyADSL",
            ConnectivityStatus::Offline => "Offline",
        }
    }
}

impl std::fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified ATM, the unit handed to the report writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "IP")]
    pub address: String,
    #[serde(rename = "Status")]
    pub status: ConnectivityStatus,
}

impl ClassificationResult {
    pub fn new(endpoint: &Endpoint, status: ConnectivityStatus) -> Self {
        Self {
            name: endpoint.name.clone(),
            address: endpoint.address.clone(),
            status,
        }
    }
}

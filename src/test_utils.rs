use std::collections::HashSet;
use std::sync::Mutex;

use crate::connectivity::Endpoint;
use crate::prober::Prober;
use crate::services::{FieldValue, ServiceRecord};

/// Prober that answers from a fixed set of reachable addresses and records every call
pub struct RecordingProber {
    reachable: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingProber {
    pub fn reachable(addresses: &[&str]) -> Self {
        Self {
            reachable: addresses.iter().map(|a| a.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, address: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.as_str() == address)
            .count()
    }
}

impl Prober for RecordingProber {
    fn probe(&self, address: &str) -> bool {
        self.calls.lock().unwrap().push(address.to_string());
        self.reachable.contains(address)
    }
}

/// Four ATMs covering decrement, borrow and unreachable cases
pub fn sample_fleet() -> Vec<Endpoint> {
    vec![
        Endpoint::new("ATM-A", "10.1.0.10"),
        Endpoint::new("ATM-B", "10.1.0.20"),
        Endpoint::new("ATM-C", "10.1.1.7"),
        Endpoint::new("ATM-D", "10.1.3.0"),
    ]
}

pub fn sample_services() -> Vec<ServiceRecord> {
    vec![
        ServiceRecord {
            location: "Bole Branch".to_string(),
            wan_ip: "196.188.10.2".to_string(),
            lan_ip: "10.20.1.1".to_string(),
            connection_type: "Fiber".to_string(),
            bandwidth: FieldValue::Number(20u64.into()),
            line_type: "MPLS".to_string(),
            service_number: FieldValue::Number(1_150_223_344u64.into()),
            account_number: FieldValue::Text("ACC-7781".to_string()),
        },
        ServiceRecord {
            location: "Piassa Kiosk".to_string(),
            wan_ip: "196.188.44.9".to_string(),
            lan_ip: "10.20.7.1".to_string(),
            connection_type: "ADSL".to_string(),
            bandwidth: FieldValue::Text("4 Mbps".to_string()),
            line_type: "Copper".to_string(),
            service_number: FieldValue::Null,
            account_number: FieldValue::Number(55_012u64.into()),
        },
    ]
}

//! Per-ATM two-probe decision tree and the batch runners built on it.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::modem::modem_address;
use super::{ClassificationResult, ConnectivityStatus, Endpoint};
use crate::prober::Prober;

/// Classify one ATM.
///
/// The primary address is probed first; only when it stays silent is the modem
/// address probed. At most two probes are sent and nothing is retried.
pub fn classify<P: Prober + ?Sized>(endpoint: &Endpoint, prober: &P) -> ClassificationResult {
    let status = if prober.probe(&endpoint.address) {
        ConnectivityStatus::Online
    } else {
        let modem = modem_address(&endpoint.address);
        if prober.probe(&modem) {
            ConnectivityStatus::OnlyFallback
        } else {
            ConnectivityStatus::Offline
        }
    };

    debug!(name = %endpoint.name, address = %endpoint.address, %status, "classified");
    ClassificationResult::new(endpoint, status)
}

/// Classify every ATM one after another, in input order.
pub fn classify_all<P: Prober + ?Sized>(
    endpoints: &[Endpoint],
    prober: &P,
) -> Vec<ClassificationResult> {
    endpoints
        .iter()
        .map(|endpoint| classify(endpoint, prober))
        .collect()
}

/// Classify ATMs on the blocking pool with at most `max_concurrent` in flight.
///
/// Results come back in input order. A classification task that panics is
/// reported as `Offline`.
pub async fn classify_concurrent(
    endpoints: Vec<Endpoint>,
    prober: Arc<dyn Prober + Send + Sync>,
    max_concurrent: usize,
) -> Vec<ClassificationResult> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(endpoints.len());

    for endpoint in endpoints {
        // The semaphore is never closed, so the permit is always granted
        let permit = semaphore.clone().acquire_owned().await.ok();
        let prober = prober.clone();
        let task_endpoint = endpoint.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            classify(&task_endpoint, prober.as_ref())
        });
        handles.push((endpoint, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (endpoint, handle) in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!(name = %endpoint.name, error = %e, "classification task failed");
                results.push(ClassificationResult::new(
                    &endpoint,
                    ConnectivityStatus::Offline,
                ));
            }
        }
    }

    results
}

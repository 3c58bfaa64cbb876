//! Probe settings. Flags win over the environment, the environment wins over defaults.

use std::env;

use serde::{Deserialize, Serialize};

use crate::prober::ProbeMethod;

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_CONCURRENCY: usize = 1;

const TIMEOUT_ENV: &str = "ATMER_PROBE_TIMEOUT_MS";
const CONCURRENCY_ENV: &str = "ATMER_CONCURRENCY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub method: ProbeMethod,
    pub timeout_ms: u64,
    /// Number of ATMs classified at once; 1 keeps the run strictly sequential
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            method: ProbeMethod::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ProbeConfig {
    /// Resolve settings from optional CLI values, falling back to the environment.
    pub fn resolve(
        method: ProbeMethod,
        timeout_ms: Option<u64>,
        concurrency: Option<usize>,
    ) -> Self {
        Self {
            method,
            timeout_ms: timeout_ms
                .unwrap_or_else(|| parse_or(env::var(TIMEOUT_ENV).ok(), DEFAULT_TIMEOUT_MS)),
            concurrency: concurrency
                .unwrap_or_else(|| parse_or(env::var(CONCURRENCY_ENV).ok(), DEFAULT_CONCURRENCY))
                .max(1),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}

use std::net::Ipv4Addr;
use std::process::{Command, Stdio};

use super::{ProbeFailure, ProbeMethod, Prober, collapse};

/// Prober that runs the platform `ping` binary with a single echo request.
pub struct SystemPing {
    timeout_ms: u64,
}

impl SystemPing {
    pub fn new() -> Self {
        Self { timeout_ms: 1000 }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Arguments for one packet with a reply deadline.
    /// Windows takes the wait in milliseconds, everything else in whole seconds.
    fn ping_args(&self, address: &str, windows: bool) -> Vec<String> {
        if windows {
            vec![
                "-n".to_string(),
                "1".to_string(),
                "-w".to_string(),
                self.timeout_ms.to_string(),
                address.to_string(),
            ]
        } else {
            let secs = self.timeout_ms.div_ceil(1000).max(1);
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                secs.to_string(),
                address.to_string(),
            ]
        }
    }

    pub fn ping(&self, address: &str) -> Result<(), ProbeFailure> {
        // Only a parsed address reaches the command line, never raw cell text
        let ip: Ipv4Addr = address
            .trim()
            .parse()
            .map_err(|_| ProbeFailure::InvalidAddress)?;

        let status = Command::new("ping")
            .args(self.ping_args(&ip.to_string(), cfg!(windows)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(ProbeFailure::from_io)?;

        if status.success() {
            Ok(())
        } else {
            Err(ProbeFailure::NoReply(status.code()))
        }
    }
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober for SystemPing {
    fn probe(&self, address: &str) -> bool {
        collapse(ProbeMethod::Ping, address, self.ping(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_args() {
        let ping = SystemPing::new();
        assert_eq!(
            ping.ping_args("10.0.0.5", false),
            vec!["-c", "1", "-W", "1", "10.0.0.5"]
        );
    }

    #[test]
    fn test_unix_args_round_up_to_seconds() {
        let ping = SystemPing::new().with_timeout(2500);
        assert_eq!(ping.ping_args("10.0.0.5", false)[3], "3");

        let ping = SystemPing::new().with_timeout(10);
        assert_eq!(ping.ping_args("10.0.0.5", false)[3], "1");
    }

    #[test]
    fn test_windows_args() {
        let ping = SystemPing::new().with_timeout(750);
        assert_eq!(
            ping.ping_args("10.0.0.5", true),
            vec!["-n", "1", "-w", "750", "10.0.0.5"]
        );
    }

    #[test]
    fn test_option_like_addresses_never_reach_ping() {
        let ping = SystemPing::new();
        for address in ["-f", "-s65000", "10.0.0.5 -f", "not.an.ip", "10.0.0.300", ""] {
            assert_eq!(ping.ping(address), Err(ProbeFailure::InvalidAddress));
            assert!(!ping.probe(address));
        }
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(SystemPing::default().timeout_ms, 1000);
    }
}

use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};

use super::{ProbeFailure, ProbeMethod, Prober, collapse};

static NEXT_SEQUENCE: AtomicU16 = AtomicU16::new(0);

/// ICMP echo prober over a raw socket
pub struct IcmpProber {
    timeout_ms: u64,
}

impl IcmpProber {
    pub fn new() -> Self {
        Self { timeout_ms: 1000 }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Build an ICMP echo request packet
    fn build_echo_request(identifier: u16, sequence: u16) -> Vec<u8> {
        let mut packet = vec![0u8; 8];

        // Type: Echo Request (8), code 0
        packet[0] = 8;
        packet[1] = 0;
        packet[4..6].copy_from_slice(&identifier.to_be_bytes());
        packet[6..8].copy_from_slice(&sequence.to_be_bytes());

        let checksum = Self::calculate_checksum(&packet);
        packet[2..4].copy_from_slice(&checksum.to_be_bytes());

        packet
    }

    /// Internet checksum over 16-bit big-endian words
    fn calculate_checksum(data: &[u8]) -> u16 {
        let mut sum: u32 = 0;

        for chunk in data.chunks(2) {
            let word = match chunk {
                [hi, lo] => ((*hi as u32) << 8) | (*lo as u32),
                [hi] => (*hi as u32) << 8,
                _ => 0,
            };
            sum = sum.wrapping_add(word);
        }

        while (sum >> 16) != 0 {
            sum = (sum & 0xffff) + (sum >> 16);
        }

        !sum as u16
    }

    /// Whether a raw IPv4 datagram is the echo reply to our request.
    fn is_echo_reply(datagram: &[u8], identifier: u16, sequence: u16) -> bool {
        let Some(first) = datagram.first() else {
            return false;
        };
        let header_len = ((first & 0x0f) as usize) * 4;
        let Some(icmp) = datagram.get(header_len..header_len + 8) else {
            return false;
        };

        icmp[0] == 0
            && u16::from_be_bytes([icmp[4], icmp[5]]) == identifier
            && u16::from_be_bytes([icmp[6], icmp[7]]) == sequence
    }

    pub fn ping(&self, address: &str) -> Result<(), ProbeFailure> {
        let ip: Ipv4Addr = address
            .trim()
            .parse()
            .map_err(|_| ProbeFailure::InvalidAddress)?;

        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(ProbeFailure::from_io)?;
        let timeout = Duration::from_millis(self.timeout_ms);
        socket
            .set_write_timeout(Some(timeout))
            .map_err(ProbeFailure::from_io)?;

        let identifier = std::process::id() as u16;
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let packet = Self::build_echo_request(identifier, sequence);
        let target = SocketAddr::new(IpAddr::V4(ip), 0);

        socket
            .send_to(&packet, &target.into())
            .map_err(ProbeFailure::from_io)?;

        // The raw socket sees every ICMP packet for the host, so keep reading until ours arrives
        let deadline = Instant::now() + timeout;
        let mut buffer = [0u8; 1024];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ProbeFailure::Timeout(self.timeout_ms));
            }
            socket
                .set_read_timeout(Some(remaining))
                .map_err(ProbeFailure::from_io)?;

            match (&socket).read(&mut buffer) {
                Ok(len) if Self::is_echo_reply(&buffer[..len], identifier, sequence) => {
                    return Ok(());
                }
                Ok(_) => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(ProbeFailure::Timeout(self.timeout_ms));
                }
                Err(e) => return Err(ProbeFailure::from_io(e)),
            }
        }
    }
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober for IcmpProber {
    fn probe(&self, address: &str) -> bool {
        collapse(ProbeMethod::Icmp, address, self.ping(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_datagram(icmp_type: u8, identifier: u16, sequence: u16) -> Vec<u8> {
        let mut datagram = vec![0u8; 28];
        datagram[0] = 0x45; // IPv4, 20-byte header
        datagram[20] = icmp_type;
        datagram[24..26].copy_from_slice(&identifier.to_be_bytes());
        datagram[26..28].copy_from_slice(&sequence.to_be_bytes());
        datagram
    }

    #[test]
    fn test_checksum_validates() {
        // Summing a packet that carries its own checksum yields zero
        let packet = IcmpProber::build_echo_request(0x1234, 7);
        assert_eq!(IcmpProber::calculate_checksum(&packet), 0);
    }

    #[test]
    fn test_checksum_odd_length() {
        let data = vec![0x08, 0x00, 0x00];
        assert_eq!(IcmpProber::calculate_checksum(&data), !0x0800u16);
    }

    #[test]
    fn test_echo_request_building() {
        let packet = IcmpProber::build_echo_request(1234, 5678);

        assert_eq!(packet.len(), 8);
        assert_eq!(packet[0], 8);
        assert_eq!(packet[1], 0);
        assert_eq!(u16::from_be_bytes([packet[4], packet[5]]), 1234);
        assert_eq!(u16::from_be_bytes([packet[6], packet[7]]), 5678);
    }

    #[test]
    fn test_reply_matching() {
        assert!(IcmpProber::is_echo_reply(&reply_datagram(0, 42, 3), 42, 3));
        // Someone else's reply
        assert!(!IcmpProber::is_echo_reply(&reply_datagram(0, 41, 3), 42, 3));
        assert!(!IcmpProber::is_echo_reply(&reply_datagram(0, 42, 4), 42, 3));
        // Destination unreachable
        assert!(!IcmpProber::is_echo_reply(&reply_datagram(3, 42, 3), 42, 3));
        // Truncated
        assert!(!IcmpProber::is_echo_reply(&[0x45, 0, 0], 42, 3));
        assert!(!IcmpProber::is_echo_reply(&[], 42, 3));
    }

    #[test]
    fn test_invalid_address_is_rejected_before_socket() {
        let prober = IcmpProber::new();
        assert_eq!(prober.ping("atm-7"), Err(ProbeFailure::InvalidAddress));
        assert!(!prober.probe("atm-7"));
    }

    #[test]
    fn test_prober_with_timeout() {
        assert_eq!(IcmpProber::default().timeout_ms, 1000);
        assert_eq!(IcmpProber::new().with_timeout(250).timeout_ms, 250);
    }
}

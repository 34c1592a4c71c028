//! Controller address parsing.
//!
//! VLP controllers are addressed by a literal IPv4 dotted quad. Host names are
//! not resolved.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::error::{Result, TransportError};

/// Factory-default address of a VLP controller.
pub const DEFAULT_HOST: &str = "192.168.11.20";

/// TCP port the controller listens on.
pub const DEFAULT_PORT: u16 = 1000;

const OCTET_COUNT: usize = 4;
const MAX_OCTET_DIGITS: usize = 3;

/// Validate that `host` is a dotted-quad IPv4 address.
///
/// Accepts exactly four `.`-separated components, each 1-3 ASCII digits with a
/// value in `0..=255`. Leading zeros are allowed (`"010.0.0.1"`).
pub fn validate_address_format(host: &str) -> bool {
    parse_octets(host).is_some()
}

fn parse_octets(host: &str) -> Option<[u8; OCTET_COUNT]> {
    let mut octets = [0u8; OCTET_COUNT];
    let mut count = 0usize;

    for part in host.split('.') {
        if count == OCTET_COUNT {
            return None;
        }
        if part.is_empty()
            || part.len() > MAX_OCTET_DIGITS
            || !part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let value: u16 = part.parse().ok()?;
        octets[count] = u8::try_from(value).ok()?;
        count += 1;
    }

    (count == OCTET_COUNT).then_some(octets)
}

/// A validated controller endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerAddress {
    ip: Ipv4Addr,
    port: u16,
}

impl ControllerAddress {
    /// Validate `host` and `port` and build an address.
    ///
    /// No network activity happens here.
    pub fn parse(host: &str, port: u16) -> Result<Self> {
        let octets =
            parse_octets(host).ok_or_else(|| TransportError::InvalidAddress(host.to_string()))?;
        if port == 0 {
            return Err(TransportError::InvalidPort(port));
        }
        Ok(Self {
            ip: Ipv4Addr::from(octets),
            port,
        })
    }

    /// The controller's IPv4 address.
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// The controller's TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for ControllerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

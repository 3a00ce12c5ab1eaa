use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// IP protocol version of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    pub const fn of(address: IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    /// Prefix length of a single-host attachment: 32 for IPv4, 128 for IPv6.
    pub const fn host_prefix_len(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    /// Address family flag understood by `ip` (`-4` / `-6`).
    pub const fn family_flag(self) -> &'static str {
        match self {
            Self::V4 => "-4",
            Self::V6 => "-6",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// A single-host network prefix (`/32` or `/128`).
///
/// The prefix length is always derived from the address version, so a
/// `HostPrefix` can never describe a subnet shared with other containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostPrefix {
    address: IpAddr,
}

impl HostPrefix {
    pub const fn new(address: IpAddr) -> Self {
        Self { address }
    }

    pub const fn address(&self) -> IpAddr {
        self.address
    }

    pub const fn version(&self) -> IpVersion {
        IpVersion::of(self.address)
    }

    pub const fn prefix_len(&self) -> u8 {
        self.version().host_prefix_len()
    }
}

impl From<IpAddr> for HostPrefix {
    fn from(address: IpAddr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for HostPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len())
    }
}

/// Parses `addr` or `addr/len`; `len` must be the host length for the version.
impl FromStr for HostPrefix {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPrefix(s.to_string());
        let (addr, len) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };
        let address: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix = Self::new(address);
        if let Some(len) = len {
            let len: u8 = len.parse().map_err(|_| invalid())?;
            if len != prefix.prefix_len() {
                return Err(invalid());
            }
        }
        Ok(prefix)
    }
}

impl TryFrom<String> for HostPrefix {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HostPrefix> for String {
    fn from(prefix: HostPrefix) -> Self {
        prefix.to_string()
    }
}

/// Next hop addresses for the default routes, keyed by IP version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextHops {
    pub v4: Option<Ipv4Addr>,
    pub v6: Option<Ipv6Addr>,
}

impl NextHops {
    #[must_use]
    pub const fn with_v4(mut self, next_hop: Ipv4Addr) -> Self {
        self.v4 = Some(next_hop);
        self
    }

    #[must_use]
    pub const fn with_v6(mut self, next_hop: Ipv6Addr) -> Self {
        self.v6 = Some(next_hop);
        self
    }

    pub fn for_version(&self, version: IpVersion) -> Option<IpAddr> {
        match version {
            IpVersion::V4 => self.v4.map(IpAddr::V4),
            IpVersion::V6 => self.v6.map(IpAddr::V6),
        }
    }
}

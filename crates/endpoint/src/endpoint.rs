use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::id::EndpointId;
use crate::mac::MacAddress;
use crate::prefix::{HostPrefix, IpVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    Active,
    Inactive,
}

/// A container's attachment point: the record handed to the datastore.
///
/// Built once after the veth is fully wired; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    id: EndpointId,
    state: EndpointState,
    mac: MacAddress,
    ipv4_nets: BTreeSet<HostPrefix>,
    ipv6_nets: BTreeSet<HostPrefix>,
    ipv4_gateway: Option<Ipv4Addr>,
    ipv6_gateway: Option<Ipv6Addr>,
}

impl Endpoint {
    /// Assemble an active endpoint for a single address.
    ///
    /// The address lands in the prefix set of its version and `next_hop`
    /// becomes the gateway of that version. Both must share a version.
    pub fn active(
        id: EndpointId,
        mac: MacAddress,
        address: IpAddr,
        next_hop: IpAddr,
    ) -> Result<Self> {
        let mut endpoint = Self {
            id,
            state: EndpointState::Active,
            mac,
            ipv4_nets: BTreeSet::new(),
            ipv6_nets: BTreeSet::new(),
            ipv4_gateway: None,
            ipv6_gateway: None,
        };
        let prefix = HostPrefix::new(address);
        match next_hop {
            IpAddr::V4(gateway) if prefix.version() == IpVersion::V4 => {
                endpoint.ipv4_nets.insert(prefix);
                endpoint.ipv4_gateway = Some(gateway);
            }
            IpAddr::V6(gateway) if prefix.version() == IpVersion::V6 => {
                endpoint.ipv6_nets.insert(prefix);
                endpoint.ipv6_gateway = Some(gateway);
            }
            _ => {
                return Err(ModelError::VersionMismatch {
                    address: prefix.version(),
                    gateway: IpVersion::of(next_hop),
                });
            }
        }
        Ok(endpoint)
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn state(&self) -> EndpointState {
        self.state
    }

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }

    pub fn ipv4_nets(&self) -> &BTreeSet<HostPrefix> {
        &self.ipv4_nets
    }

    pub fn ipv6_nets(&self) -> &BTreeSet<HostPrefix> {
        &self.ipv6_nets
    }

    pub fn ipv4_gateway(&self) -> Option<Ipv4Addr> {
        self.ipv4_gateway
    }

    pub fn ipv6_gateway(&self) -> Option<Ipv6Addr> {
        self.ipv6_gateway
    }
}

//! Addresses, routes and link queries on an interface inside a namespace.
//!
//! Addresses are always single-host prefixes (`/32`, `/128`). Routes use
//! `ip route replace`, so installing them again is harmless; address changes
//! are not idempotent and fail on duplicates or missing addresses.

use std::net::IpAddr;

use endpoint::{HostPrefix, IpVersion, MacAddress};
use tracing::debug;

use crate::error::{EndpointError, Result};
use crate::host::Host;
use crate::namespace::{NamespaceHandle, within};
use crate::veth::validate_ifname;

/// Add `address/32` (or `/128`) to `interface` inside `target`.
pub fn assign<H: Host + ?Sized>(
    host: &H,
    target: &NamespaceHandle,
    address: IpAddr,
    interface: &str,
) -> Result<()> {
    change_address(host, target, "add", address, interface)
}

/// Remove `address/32` (or `/128`) from `interface` inside `target`.
pub fn unassign<H: Host + ?Sized>(
    host: &H,
    target: &NamespaceHandle,
    address: IpAddr,
    interface: &str,
) -> Result<()> {
    change_address(host, target, "del", address, interface)
}

fn change_address<H: Host + ?Sized>(
    host: &H,
    target: &NamespaceHandle,
    action: &str,
    address: IpAddr,
    interface: &str,
) -> Result<()> {
    validate_ifname(interface)?;
    let prefix = HostPrefix::new(address);
    let cidr = prefix.to_string();
    let family = prefix.version().family_flag();

    within(host, target, || {
        host.ip(&[family, "addr", action, &cidr, "dev", interface])?;
        Ok(())
    })?;

    debug!(namespace = %target, interface, address = %cidr, action, "address updated");
    Ok(())
}

/// Install a connected route to `next_hop` and a default route via it.
pub fn install_routes<H: Host + ?Sized>(
    host: &H,
    target: &NamespaceHandle,
    interface: &str,
    next_hop: IpAddr,
) -> Result<()> {
    validate_ifname(interface)?;
    let family = IpVersion::of(next_hop).family_flag();
    let via = next_hop.to_string();

    within(host, target, || {
        host.ip(&[family, "route", "replace", &via, "dev", interface])?;
        host.ip(&[
            family, "route", "replace", "default", "via", &via, "dev", interface,
        ])?;
        Ok(())
    })?;

    debug!(namespace = %target, interface, next_hop = %via, "routes installed");
    Ok(())
}

/// Read the hardware address of `interface` inside `target`.
pub fn read_hardware_address<H: Host + ?Sized>(
    host: &H,
    target: &NamespaceHandle,
    interface: &str,
) -> Result<MacAddress> {
    validate_ifname(interface)?;
    let output = within(host, target, || {
        host.ip(&["link", "show", interface])
            .map_err(EndpointError::from)
    })?;
    parse_hardware_address(&output).ok_or_else(|| EndpointError::NoHardwareAddress {
        interface: interface.to_string(),
    })
}

/// Extract the token following `link/ether` in `ip link show` output.
fn parse_hardware_address(output: &str) -> Option<MacAddress> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        tokens.find(|t| *t == "link/ether")?;
        tokens.next()?.parse().ok()
    })
}

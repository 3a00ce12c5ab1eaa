use endpoint::EndpointId;

use crate::error::{EndpointError, Result};
use crate::paths::{ID_PREFIX_LEN, IF_PREFIX, TEMP_PREFIX};

/// Longest interface name the kernel accepts (IFNAMSIZ - 1).
const MAX_IFNAME_LEN: usize = 15;

/// Names of the two ends of an endpoint's veth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VethPair {
    /// Host-side end, e.g. `cali0123456789a`.
    pub host: String,
    /// Peer name until it is moved into the container and renamed.
    pub temp: String,
    /// Peer name inside the container, e.g. `eth1`.
    pub container: String,
}

impl VethPair {
    pub fn new(id: &EndpointId, container: impl Into<String>) -> Self {
        Self {
            host: host_interface_name(id),
            temp: format!("{TEMP_PREFIX}{}", id.prefix(ID_PREFIX_LEN)),
            container: container.into(),
        }
    }
}

/// Host-side interface name of an endpoint. Provisioning and teardown both
/// derive it from the id alone.
pub fn host_interface_name(id: &EndpointId) -> String {
    format!("{IF_PREFIX}{}", id.prefix(ID_PREFIX_LEN))
}

/// Reject names the kernel would refuse or that could be read as options.
pub fn validate_ifname(name: &str) -> Result<()> {
    let invalid = |why: &str| EndpointError::InvalidInput(format!("interface name {name:?} {why}"));
    if name.is_empty() {
        return Err(invalid("is empty"));
    }
    if name.len() > MAX_IFNAME_LEN {
        return Err(invalid("is longer than 15 bytes"));
    }
    if name == "." || name == ".." {
        return Err(invalid("is reserved"));
    }
    if name.starts_with('-') {
        return Err(invalid("starts with '-'"));
    }
    if name
        .chars()
        .any(|c| c == '/' || c == ':' || c.is_whitespace() || c.is_control())
    {
        return Err(invalid("contains '/', ':', whitespace or control characters"));
    }
    Ok(())
}

use std::path::PathBuf;

use serde::Deserialize;

use crate::command::Privilege;
use crate::paths::{DEFAULT_VETH_NAME, NETNS_DIR, PROC_DIR};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Interface name given to the veth inside the container namespace.
    pub veth_name: String,
    /// Root of the proc filesystem holding `<pid>/ns/net`.
    pub proc_root: PathBuf,
    /// Directory of namespace symlinks used by `ip netns` tooling.
    pub registry_dir: PathBuf,
    /// This process runs in a container namespace rather than the root
    /// namespace. When set, the host end of each veth is handed back to pid 1.
    pub in_container: bool,
    /// How `ip` is invoked.
    pub privilege: Privilege,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            veth_name: DEFAULT_VETH_NAME.to_string(),
            proc_root: PathBuf::from(PROC_DIR),
            registry_dir: PathBuf::from(NETNS_DIR),
            in_container: false,
            privilege: Privilege::User,
        }
    }
}

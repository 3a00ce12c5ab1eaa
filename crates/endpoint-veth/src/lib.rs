mod address;
mod command;
mod config;
mod error;
mod host;
mod namespace;
mod paths;
mod prerequisites;
mod provision;
mod teardown;
mod veth;

pub use address::{assign, install_routes, read_hardware_address, unassign};
pub use command::{CommandError, Privilege};
pub use config::EndpointConfig;
pub use error::{EndpointError, Result};
pub use host::{Host, LinuxHost};
pub use namespace::{NamespaceHandle, NamespaceRegistry, NamespaceSwitch, SetnsSwitch, within};
pub use paths::{DEFAULT_VETH_NAME, HOST_PROC_ALIAS, NETNS_DIR, PROC_DIR, ROOT_PID};
pub use prerequisites::check_prerequisites;
pub use provision::{ProvisionFailure, Provisioner, Step, plan};
pub use teardown::remove_endpoint;
pub use veth::{VethPair, host_interface_name, validate_ifname};

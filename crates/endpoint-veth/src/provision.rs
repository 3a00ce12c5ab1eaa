//! Endpoint provisioning.
//!
//! ```text
//!   this namespace                      container namespace (pid N)
//!  ┌───────────────────────┐           ┌───────────────────────────┐
//!  │  cali<id>  ───────────┼── veth ───┼──  eth1  10.0.0.5/32       │
//!  │                       │           │    default via 10.0.0.1    │
//!  └───────────────────────┘           └───────────────────────────┘
//!        │ in_container: moved to the root namespace (pid 1)
//! ```
//!
//! Provisioning is an ordered [`plan`] of host mutations. Each step relies on
//! state left by the previous one, and host networking is not transactional:
//! the first failing step stops the run and nothing is rolled back. The
//! returned [`ProvisionFailure`] records how far the run got and offers
//! [`ProvisionFailure::teardown`] for callers that want best-effort cleanup.

use std::fmt;
use std::net::IpAddr;

use endpoint::{Endpoint, EndpointId, IpVersion, NextHops};
use tracing::{debug, error, info, warn};

use crate::address;
use crate::config::EndpointConfig;
use crate::error::{EndpointError, Result};
use crate::host::Host;
use crate::namespace::{NamespaceHandle, NamespaceRegistry, within};
use crate::paths::ROOT_PID;
use crate::teardown::{delete_link, remove_endpoint};
use crate::veth::{VethPair, host_interface_name, validate_ifname};

/// One host mutation in the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Validate inputs. Runs before any command is issued.
    CheckInput,
    /// Register the target namespace under its pid.
    NameNamespace,
    /// Register the root namespace. Failures are ignored.
    NameRootNamespace,
    /// `ip link add <host> type veth peer name <temp>`
    CreatePair,
    /// `ip link set <host> up`
    HostUp,
    /// `ip link set <temp> netns <pid>`
    MovePeer,
    /// `ip link set dev <temp> name <veth>`, inside the target namespace.
    RenamePeer,
    /// `ip link set <veth> up`, inside the target namespace.
    PeerUp,
    /// `ip link set <host> netns 1`
    MoveHostToRoot,
    /// `ip link set <host> up`, inside the root namespace.
    HostUpInRoot,
    AssignAddress,
    InstallRoutes,
    ReadHardwareAddress,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckInput => "check input",
            Self::NameNamespace => "name namespace",
            Self::NameRootNamespace => "name root namespace",
            Self::CreatePair => "create veth pair",
            Self::HostUp => "bring host end up",
            Self::MovePeer => "move peer into namespace",
            Self::RenamePeer => "rename peer",
            Self::PeerUp => "bring peer up",
            Self::MoveHostToRoot => "move host end to root namespace",
            Self::HostUpInRoot => "bring host end up in root namespace",
            Self::AssignAddress => "assign address",
            Self::InstallRoutes => "install routes",
            Self::ReadHardwareAddress => "read hardware address",
        };
        f.write_str(name)
    }
}

/// The ordered host mutations of a provisioning run.
///
/// `in_container` adds the root-namespace steps: naming pid 1, and handing
/// the host end back to the root namespace so it takes part in routing.
/// The run then finishes with [`Step::ReadHardwareAddress`], which yields
/// the endpoint and is therefore not part of the plan.
pub fn plan(in_container: bool) -> Vec<Step> {
    let mut steps = vec![Step::CheckInput, Step::NameNamespace];
    if in_container {
        steps.push(Step::NameRootNamespace);
    }
    steps.extend([
        Step::CreatePair,
        Step::HostUp,
        Step::MovePeer,
        Step::RenamePeer,
        Step::PeerUp,
    ]);
    if in_container {
        steps.extend([Step::MoveHostToRoot, Step::HostUpInRoot]);
    }
    steps.extend([Step::AssignAddress, Step::InstallRoutes]);
    steps
}

/// A provisioning run that stopped at `failed`.
#[derive(Debug, thiserror::Error)]
#[error("provisioning endpoint {id} failed at step '{failed}': {source}")]
pub struct ProvisionFailure {
    pub id: EndpointId,
    pub failed: Step,
    /// Steps that completed before the failure, in order.
    pub completed: Vec<Step>,
    #[source]
    pub source: EndpointError,
}

impl ProvisionFailure {
    /// Host-side interface name of the failed endpoint.
    pub fn host_interface(&self) -> String {
        host_interface_name(&self.id)
    }

    /// Best-effort removal of the veth this run created, if any.
    ///
    /// Deletes the host end from the namespace it should be in at this point,
    /// which also removes the peer. Errors are logged and otherwise ignored.
    /// Never called automatically.
    pub fn teardown<H: Host>(&self, provisioner: &Provisioner<H>) {
        if !self.completed.contains(&Step::CreatePair) {
            return;
        }
        let host = provisioner.host();
        let interface = self.host_interface();
        let result = if self.completed.contains(&Step::MoveHostToRoot) {
            within(host, &provisioner.root_namespace(), || {
                delete_link(host, &interface)
            })
        } else {
            delete_link(host, &interface)
        };
        match result {
            Ok(()) => info!(endpoint = %self.id, interface = %interface, "cleaned up failed endpoint"),
            Err(e) => {
                warn!(endpoint = %self.id, interface = %interface, error = %e, "cleanup failed (ignored)");
            }
        }
    }
}

/// State threaded through the steps of one run.
struct Provisioning {
    target: NamespaceHandle,
    root: NamespaceHandle,
    address: IpAddr,
    next_hop: IpAddr,
    veth: VethPair,
}

/// Wires container namespaces to this host.
///
/// Namespace switches affect the calling thread, so a provisioner must not
/// be driven from several threads at once without external serialization of
/// whole operations.
pub struct Provisioner<H> {
    host: H,
    config: EndpointConfig,
    registry: NamespaceRegistry,
}

impl<H: Host> Provisioner<H> {
    pub fn new(host: H, config: EndpointConfig) -> Self {
        let registry = NamespaceRegistry::new(&config.registry_dir, &config.proc_root);
        Self {
            host,
            config,
            registry,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Handle for the namespace of `pid` under the configured proc root.
    pub fn namespace(&self, pid: u32) -> NamespaceHandle {
        NamespaceHandle::new(pid, &self.config.proc_root)
    }

    pub fn root_namespace(&self) -> NamespaceHandle {
        NamespaceHandle::root(&self.config.proc_root)
    }

    /// Create a veth into the namespace of `pid`, give it `address` and
    /// default routes via the next hop of the same version, and describe the
    /// result as an active [`Endpoint`].
    pub fn provision(
        &self,
        address: IpAddr,
        pid: u32,
        next_hops: &NextHops,
    ) -> std::result::Result<Endpoint, ProvisionFailure> {
        let id = EndpointId::generate();
        let veth = VethPair::new(&id, &self.config.veth_name);
        let target = self.namespace(pid);

        info!(
            endpoint = %id,
            host = %veth.host,
            namespace = %target,
            address = %address,
            in_container = self.config.in_container,
            "provisioning endpoint"
        );

        let version = IpVersion::of(address);
        let Some(next_hop) = next_hops.for_version(version) else {
            let source = EndpointError::InvalidInput(format!("no {version} next hop for {address}"));
            error!(endpoint = %id, error = %source, "provisioning rejected");
            return Err(ProvisionFailure {
                id,
                failed: Step::CheckInput,
                completed: Vec::new(),
                source,
            });
        };

        let run = Provisioning {
            target,
            root: self.root_namespace(),
            address,
            next_hop,
            veth,
        };

        let mut completed = Vec::new();
        for step in plan(self.config.in_container) {
            debug!(endpoint = %id, step = %step, "provisioning step");
            if let Err(source) = self.perform(step, &run) {
                error!(endpoint = %id, step = %step, error = %source, "provisioning failed");
                return Err(ProvisionFailure {
                    id,
                    failed: step,
                    completed,
                    source,
                });
            }
            completed.push(step);
        }

        let step = Step::ReadHardwareAddress;
        debug!(endpoint = %id, step = %step, "provisioning step");
        match self.finish(&id, &run) {
            Ok(endpoint) => {
                info!(endpoint = %id, mac = %endpoint.mac(), "endpoint provisioned");
                Ok(endpoint)
            }
            Err(source) => {
                error!(endpoint = %id, step = %step, error = %source, "provisioning failed");
                Err(ProvisionFailure {
                    id,
                    failed: step,
                    completed,
                    source,
                })
            }
        }
    }

    /// Read the container end's hardware address and describe the endpoint.
    fn finish(&self, id: &EndpointId, run: &Provisioning) -> Result<Endpoint> {
        let mac = address::read_hardware_address(&self.host, &run.target, &run.veth.container)?;
        Endpoint::active(id.clone(), mac, run.address, run.next_hop).map_err(EndpointError::from)
    }

    fn perform(&self, step: Step, run: &Provisioning) -> Result<()> {
        let host = &self.host;
        let veth = &run.veth;
        match step {
            Step::CheckInput => {
                validate_ifname(&veth.container)?;
                validate_ifname(&veth.host)?;
                validate_ifname(&veth.temp)?;
            }
            Step::NameNamespace => {
                self.registry.ensure_named(run.target.pid())?;
                match self.registry.list() {
                    Ok(names) => debug!(registry = ?names, "namespace registry"),
                    Err(e) => debug!(error = %e, "cannot list namespace registry"),
                }
            }
            Step::NameRootNamespace => {
                // Only needed once per host; later runs find the link in place.
                if let Err(e) = self.registry.ensure_named(ROOT_PID) {
                    debug!(error = %e, "root namespace not named (ignored)");
                }
            }
            Step::CreatePair => {
                host.ip(&[
                    "link", "add", &veth.host, "type", "veth", "peer", "name", &veth.temp,
                ])?;
            }
            Step::HostUp => {
                host.ip(&["link", "set", &veth.host, "up"])?;
            }
            Step::MovePeer => {
                let netns = run.target.registry_name();
                host.ip(&["link", "set", &veth.temp, "netns", &netns])?;
            }
            Step::RenamePeer => {
                within(host, &run.target, || {
                    host.ip(&["link", "set", "dev", &veth.temp, "name", &veth.container])?;
                    Ok(())
                })?;
            }
            Step::PeerUp => {
                within(host, &run.target, || {
                    host.ip(&["link", "set", &veth.container, "up"])?;
                    Ok(())
                })?;
            }
            Step::MoveHostToRoot => {
                let netns = run.root.registry_name();
                host.ip(&["link", "set", &veth.host, "netns", &netns])?;
            }
            Step::HostUpInRoot => {
                within(host, &run.root, || {
                    host.ip(&["link", "set", &veth.host, "up"])?;
                    Ok(())
                })?;
            }
            Step::AssignAddress => {
                address::assign(host, &run.target, run.address, &veth.container)?;
            }
            Step::InstallRoutes => {
                address::install_routes(host, &run.target, &veth.container, run.next_hop)?;
            }
            Step::ReadHardwareAddress => {
                address::read_hardware_address(host, &run.target, &veth.container)?;
            }
        }
        Ok(())
    }

    /// Add `address` to `interface` in the namespace of `pid`.
    pub fn add_address(&self, pid: u32, address: IpAddr, interface: &str) -> Result<()> {
        address::assign(&self.host, &self.namespace(pid), address, interface)
    }

    /// Remove `address` from `interface` in the namespace of `pid`.
    pub fn remove_address(&self, pid: u32, address: IpAddr, interface: &str) -> Result<()> {
        address::unassign(&self.host, &self.namespace(pid), address, interface)
    }

    /// Name the namespace of `pid` in the registry. Idempotent.
    pub fn ensure_named(&self, pid: u32) -> Result<bool> {
        self.registry.ensure_named(pid)
    }

    /// Delete the host-side interface of endpoint `id`.
    ///
    /// With `in_container` the host end was handed to the root namespace
    /// during provisioning, so it is deleted from there.
    pub fn remove_endpoint(&self, id: &EndpointId) -> Result<()> {
        if self.config.in_container {
            within(&self.host, &self.root_namespace(), || {
                remove_endpoint(&self.host, id)
            })
        } else {
            remove_endpoint(&self.host, id)
        }
    }
}

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use endpoint::{EndpointId, NextHops};
use endpoint_veth::{EndpointConfig, LinuxHost, Privilege, Provisioner, check_prerequisites};
use tracing_subscriber::fmt::time::FormatTime;

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "endpoint-veth")]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long, env = "ENDPOINT_VETH_CONFIG")]
    config: Option<PathBuf>,
    /// Root of the proc filesystem holding `<pid>/ns/net`
    #[arg(long, env = "ENDPOINT_VETH_PROC_ROOT")]
    proc_root: Option<PathBuf>,
    /// Directory of named namespace links
    #[arg(long)]
    registry_dir: Option<PathBuf>,
    /// This process runs inside a container namespace
    #[arg(long)]
    in_container: bool,
    /// Prefix `ip` invocations with sudo
    #[arg(long)]
    sudo: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Wire the namespace of a process to this host and print the endpoint
    Provision {
        /// Pid of a process in the target namespace
        pid: u32,
        /// Address to give the container end
        address: IpAddr,
        /// IPv4 next hop (gateway)
        #[arg(long)]
        next_hop_v4: Option<IpAddr>,
        /// IPv6 next hop (gateway)
        #[arg(long)]
        next_hop_v6: Option<IpAddr>,
        /// Interface name inside the container
        #[arg(long)]
        veth_name: Option<String>,
        /// Delete whatever a failed run left behind
        #[arg(long)]
        cleanup: bool,
    },
    /// Delete the host-side interface of an endpoint
    Remove {
        /// Endpoint id (32 hex characters)
        id: EndpointId,
    },
    /// Add an address to an interface in the namespace of a process
    AddIp {
        pid: u32,
        address: IpAddr,
        #[arg(long, default_value = endpoint_veth::DEFAULT_VETH_NAME)]
        interface: String,
    },
    /// Remove an address from an interface in the namespace of a process
    RemoveIp {
        pid: u32,
        address: IpAddr,
        #[arg(long, default_value = endpoint_veth::DEFAULT_VETH_NAME)]
        interface: String,
    },
    /// Name the namespace of a process in the registry
    Name { pid: u32 },
    /// Check that this host can provision endpoints
    Check,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load_config(cli: &Cli) -> Result<EndpointConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("read config {}: {e}", path.display()))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("parse config {}: {e}", path.display()))?
        }
        None => EndpointConfig::default(),
    };
    if let Some(proc_root) = &cli.proc_root {
        config.proc_root = proc_root.clone();
    }
    if let Some(registry_dir) = &cli.registry_dir {
        config.registry_dir = registry_dir.clone();
    }
    if cli.in_container {
        config.in_container = true;
    }
    if cli.sudo {
        config.privilege = Privilege::Sudo;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Provision {
            pid,
            address,
            next_hop_v4,
            next_hop_v6,
            veth_name,
            cleanup,
        } => {
            if let Some(name) = veth_name {
                config.veth_name = name;
            }
            let next_hops = next_hops(next_hop_v4, next_hop_v6)?;
            let provisioner = provisioner(config);
            match provisioner.provision(address, pid, &next_hops) {
                Ok(endpoint) => {
                    println!("{}", serde_json::to_string_pretty(&endpoint)?);
                }
                Err(failure) => {
                    eprintln!("completed steps: {:?}", failure.completed);
                    if cleanup {
                        failure.teardown(&provisioner);
                    }
                    return Err(failure.into());
                }
            }
        }
        Command::Remove { id } => {
            provisioner(config).remove_endpoint(&id)?;
            println!("removed {}", endpoint_veth::host_interface_name(&id));
        }
        Command::AddIp {
            pid,
            address,
            interface,
        } => provisioner(config).add_address(pid, address, &interface)?,
        Command::RemoveIp {
            pid,
            address,
            interface,
        } => provisioner(config).remove_address(pid, address, &interface)?,
        Command::Name { pid } => {
            let provisioner = provisioner(config);
            let created = provisioner.ensure_named(pid)?;
            let entry = provisioner.registry().entry(pid);
            if created {
                println!("named {}", entry.display());
            } else {
                println!("already named {}", entry.display());
            }
        }
        Command::Check => {
            check_prerequisites(&config)?;
            println!("ok");
        }
    }

    Ok(())
}

fn provisioner(config: EndpointConfig) -> Provisioner<LinuxHost> {
    Provisioner::new(LinuxHost::new(config.privilege), config)
}

fn next_hops(
    v4: Option<IpAddr>,
    v6: Option<IpAddr>,
) -> Result<NextHops, Box<dyn std::error::Error>> {
    let mut hops = NextHops::default();
    match v4 {
        Some(IpAddr::V4(addr)) => hops = hops.with_v4(addr),
        Some(other) => return Err(format!("--next-hop-v4 is not IPv4: {other}").into()),
        None => {}
    }
    match v6 {
        Some(IpAddr::V6(addr)) => hops = hops.with_v6(addr),
        Some(other) => return Err(format!("--next-hop-v6 is not IPv6: {other}").into()),
        None => {}
    }
    Ok(hops)
}

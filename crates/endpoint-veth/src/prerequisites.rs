use std::path::Path;

use crate::command::{Privilege, exec};
use crate::config::EndpointConfig;
use crate::error::{EndpointError, Result};
use crate::paths::{ROOT_PID, netns_file};

/// Verify that the host can provision endpoints with `config`.
///
/// Checks the `ip` command, the proc root, the registry directory and sudo
/// access when configured. Collects all failures and returns them in a
/// single `InvalidInput` error.
pub fn check_prerequisites(config: &EndpointConfig) -> Result<()> {
    let mut errors = Vec::new();

    check_required_commands(&mut errors);
    check_proc_root(&config.proc_root, config.in_container, &mut errors);
    check_registry_dir(&config.registry_dir, &mut errors);
    if config.privilege == Privilege::Sudo {
        check_sudo(&mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(EndpointError::InvalidInput(errors.join("; ")))
    }
}

fn check_required_commands(errors: &mut Vec<String>) {
    for cmd in ["ip"] {
        if which::which(cmd).is_err() {
            errors.push(format!("required command not found: {cmd}"));
        }
    }
}

fn check_proc_root(proc_root: &Path, in_container: bool, errors: &mut Vec<String>) {
    if !proc_root.is_dir() {
        errors.push(format!("proc root not found: {}", proc_root.display()));
        return;
    }
    // The root namespace is only entered when handing the host end back to it.
    if in_container {
        let root_ns = netns_file(proc_root, ROOT_PID);
        if !root_ns.exists() {
            errors.push(format!("root namespace not visible: {}", root_ns.display()));
        }
    }
}

/// The registry is created on demand, so only an unusable existing path is an error.
fn check_registry_dir(dir: &Path, errors: &mut Vec<String>) {
    if dir.exists() && !dir.is_dir() {
        errors.push(format!(
            "namespace registry is not a directory: {}",
            dir.display()
        ));
    }
}

fn check_sudo(errors: &mut Vec<String>) {
    if exec("sudo", &["-n", "true"], Privilege::User).is_err() {
        errors.push(
            "root/sudo access required for network configuration; \
             please run with sudo or configure sudoers"
                .to_string(),
        );
    }
}

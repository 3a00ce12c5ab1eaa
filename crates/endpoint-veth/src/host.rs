use std::os::fd::OwnedFd;

use crate::command::{CommandError, Privilege, exec};
use crate::error::Result;
use crate::namespace::{NamespaceHandle, NamespaceSwitch, SetnsSwitch};

/// The host networking surface: `ip` invocations plus namespace switching.
///
/// Commands run in whatever namespace the calling thread is currently in,
/// so callers wrap them in [`crate::namespace::within`] to target another one.
pub trait Host: NamespaceSwitch {
    /// Run `ip <args>` and return its trimmed stdout.
    fn ip(&self, args: &[&str]) -> std::result::Result<String, CommandError>;
}

/// Real host: spawns iproute2 and switches namespaces with `setns(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxHost {
    privilege: Privilege,
}

impl LinuxHost {
    pub fn new(privilege: Privilege) -> Self {
        Self { privilege }
    }
}

impl NamespaceSwitch for LinuxHost {
    type Saved = OwnedFd;

    fn enter(&self, target: &NamespaceHandle) -> Result<OwnedFd> {
        SetnsSwitch.enter(target)
    }

    fn restore(&self, saved: OwnedFd) -> Result<()> {
        SetnsSwitch.restore(saved)
    }
}

impl Host for LinuxHost {
    fn ip(&self, args: &[&str]) -> std::result::Result<String, CommandError> {
        exec("ip", args, self.privilege)
    }
}

use std::fs::File;
use std::os::fd::OwnedFd;

use nix::sched::{CloneFlags, setns};
use tracing::trace;

use super::NamespaceHandle;
use crate::error::{EndpointError, Result};
use crate::paths::THREAD_NETNS;

/// Primitive that switches the calling thread between network namespaces.
///
/// `enter` returns a token for the namespace that was current before the
/// switch; handing it to `restore` switches back. Use [`super::within`]
/// rather than calling these directly.
pub trait NamespaceSwitch {
    type Saved;

    fn enter(&self, target: &NamespaceHandle) -> Result<Self::Saved>;

    fn restore(&self, saved: Self::Saved) -> Result<()>;
}

/// `setns(2)`-based switch. Affects only the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetnsSwitch;

impl NamespaceSwitch for SetnsSwitch {
    type Saved = OwnedFd;

    fn enter(&self, target: &NamespaceHandle) -> Result<OwnedFd> {
        let enter_err = |detail: String| EndpointError::NamespaceEnter {
            namespace: target.to_string(),
            detail,
        };

        let current =
            File::open(THREAD_NETNS).map_err(|e| enter_err(format!("open {THREAD_NETNS}: {e}")))?;
        let path = target.ns_path();
        let ns = File::open(&path).map_err(|e| enter_err(format!("open {}: {e}", path.display())))?;
        setns(&ns, CloneFlags::CLONE_NEWNET).map_err(|e| enter_err(format!("setns: {e}")))?;

        trace!(namespace = %target, "entered network namespace");
        Ok(OwnedFd::from(current))
    }

    fn restore(&self, saved: OwnedFd) -> Result<()> {
        setns(&saved, CloneFlags::CLONE_NEWNET)
            .map_err(|e| EndpointError::NamespaceRestore(e.to_string()))?;
        trace!("restored network namespace");
        Ok(())
    }
}

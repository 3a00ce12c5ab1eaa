use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths::{ROOT_PID, netns_file};

/// Identifies a network namespace by a process living in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceHandle {
    pid: u32,
    proc_root: PathBuf,
}

impl NamespaceHandle {
    pub fn new(pid: u32, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            pid,
            proc_root: proc_root.into(),
        }
    }

    /// The root namespace, owned by pid 1.
    pub fn root(proc_root: impl Into<PathBuf>) -> Self {
        Self::new(ROOT_PID, proc_root)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    /// `<proc_root>/<pid>/ns/net`.
    pub fn ns_path(&self) -> PathBuf {
        netns_file(&self.proc_root, self.pid)
    }

    /// Name of this namespace in the registry and in `ip ... netns <name>`.
    pub fn registry_name(&self) -> String {
        self.pid.to_string()
    }
}

impl fmt::Display for NamespaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {} ({})", self.pid, self.ns_path().display())
    }
}

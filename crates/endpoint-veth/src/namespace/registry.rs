use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{EndpointError, Result};
use crate::paths::{ROOT_PID, netns_file};

/// Directory of symlinks that makes process namespaces addressable by name.
///
/// Each entry is named by pid and points at `<proc_root>/<pid>/ns/net`, so
/// name-based tooling (`ip netns`, `ip link set ... netns <pid>`) can refer
/// to the namespace. The registry persists across invocations.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    dir: PathBuf,
    proc_root: PathBuf,
}

impl NamespaceRegistry {
    pub fn new(dir: impl Into<PathBuf>, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            proc_root: proc_root.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registry entry path for `pid`.
    pub fn entry(&self, pid: u32) -> PathBuf {
        self.dir.join(pid.to_string())
    }

    /// Make sure `pid`'s namespace is named in the registry. Idempotent.
    ///
    /// Returns `true` if a new link was created. An existing symlink is left
    /// untouched, including one created concurrently by someone else. Any
    /// other entry under that name (such as an `ip netns add` bind mount)
    /// would shadow the process's namespace, so it is an error.
    pub fn ensure_named(&self, pid: u32) -> Result<bool> {
        let link = self.entry(pid);
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(false),
            Ok(_) => return Err(occupied(link)),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(EndpointError::Registry { path: link, source }),
        }

        fs::create_dir_all(&self.dir).map_err(|source| EndpointError::Registry {
            path: self.dir.clone(),
            source,
        })?;

        let target = netns_file(&self.proc_root, pid);
        match symlink(&target, &link) {
            Ok(()) => {
                info!(pid, link = %link.display(), target = %target.display(), "named namespace");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !is_symlink(&link) {
                    return Err(occupied(link));
                }
                debug!(pid, link = %link.display(), "namespace already named");
                Ok(false)
            }
            Err(source) => Err(EndpointError::Registry { path: link, source }),
        }
    }

    /// [`ensure_named`](Self::ensure_named) for the root namespace (pid 1).
    pub fn ensure_root_named(&self) -> Result<bool> {
        self.ensure_named(ROOT_PID)
    }

    /// Names currently present in the registry, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(EndpointError::Registry {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| EndpointError::Registry {
                path: self.dir.clone(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

fn occupied(link: PathBuf) -> EndpointError {
    EndpointError::Registry {
        source: std::io::Error::new(ErrorKind::AlreadyExists, "entry exists and is not a symlink"),
        path: link,
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

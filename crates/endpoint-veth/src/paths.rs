use std::path::{Path, PathBuf};

/// Registry of named network namespaces, as read by `ip netns`.
pub const NETNS_DIR: &str = "/var/run/netns";

/// Default proc filesystem root.
pub const PROC_DIR: &str = "/proc";

/// Conventional mount point of the host's `/proc` when this process is
/// itself containerized.
pub const HOST_PROC_ALIAS: &str = "/proc_host";

/// Network namespace of the calling thread (not the thread group leader).
pub const THREAD_NETNS: &str = "/proc/thread-self/ns/net";

/// Pid owning the root network namespace.
pub const ROOT_PID: u32 = 1;

/// Host-side interface name prefix.
pub const IF_PREFIX: &str = "cali";

/// Prefix of the peer's name before it is moved and renamed.
pub const TEMP_PREFIX: &str = "tmp";

/// Characters of the endpoint id kept in interface names.
/// `cali` + 11 = 15, the kernel limit (IFNAMSIZ - 1).
pub const ID_PREFIX_LEN: usize = 11;

/// Default interface name inside the container. Not `eth0`, which may be in use.
pub const DEFAULT_VETH_NAME: &str = "eth1";

/// Per-process namespace file path: `<proc_root>/<pid>/ns/net`.
pub fn netns_file(proc_root: &Path, pid: u32) -> PathBuf {
    proc_root.join(pid.to_string()).join("ns").join("net")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netns_file_under_proc() {
        assert_eq!(
            netns_file(Path::new(PROC_DIR), 4242),
            PathBuf::from("/proc/4242/ns/net")
        );
    }

    #[test]
    fn netns_file_under_alias() {
        assert_eq!(
            netns_file(Path::new(HOST_PROC_ALIAS), ROOT_PID),
            PathBuf::from("/proc_host/1/ns/net")
        );
    }

    #[test]
    fn host_interface_name_fits_ifnamsiz() {
        assert_eq!(IF_PREFIX.len() + ID_PREFIX_LEN, 15);
        assert!(TEMP_PREFIX.len() + ID_PREFIX_LEN <= 15);
    }
}

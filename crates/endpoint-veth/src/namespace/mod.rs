//! Network namespace handling.
//!
//! Entering a namespace changes the network view of the calling thread, and
//! every process spawned from that thread inherits it. All namespace work
//! therefore goes through [`within`], which pairs each enter with a restore
//! on every exit path.

mod handle;
mod registry;
mod scope;
mod switch;

pub use handle::NamespaceHandle;
pub use registry::NamespaceRegistry;
pub use scope::within;
pub use switch::{NamespaceSwitch, SetnsSwitch};

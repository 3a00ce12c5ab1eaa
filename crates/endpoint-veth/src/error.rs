use std::path::PathBuf;

use crate::command::CommandError;

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("cannot enter network namespace {namespace}: {detail}")]
    NamespaceEnter { namespace: String, detail: String },

    #[error("cannot restore network namespace: {0}")]
    NamespaceRestore(String),

    #[error("namespace registry {}: {source}", path.display())]
    Registry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no hardware address reported for {interface}")]
    NoHardwareAddress { interface: String },

    #[error(transparent)]
    Model(#[from] endpoint::ModelError),
}

pub type Result<T> = std::result::Result<T, EndpointError>;

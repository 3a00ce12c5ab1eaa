use crate::prefix::IpVersion;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid endpoint id: {0}")]
    InvalidId(String),

    #[error("invalid hardware address: {0}")]
    InvalidMac(String),

    #[error("invalid host prefix: {0}")]
    InvalidPrefix(String),

    #[error("gateway is {gateway:?} but address is {address:?}")]
    VersionMismatch {
        address: IpVersion,
        gateway: IpVersion,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;

mod endpoint;
mod error;
mod id;
mod mac;
mod prefix;

pub use endpoint::{Endpoint, EndpointState};
pub use error::{ModelError, Result};
pub use id::EndpointId;
pub use mac::MacAddress;
pub use prefix::{HostPrefix, IpVersion, NextHops};

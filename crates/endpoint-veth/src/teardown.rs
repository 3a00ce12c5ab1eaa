use endpoint::EndpointId;
use tracing::info;

use crate::error::Result;
use crate::host::Host;
use crate::veth::host_interface_name;

/// Delete the host-side interface of endpoint `id`.
///
/// Deleting one end of a veth removes its peer as well. Not idempotent:
/// removing an endpoint whose interface is already gone fails.
pub fn remove_endpoint<H: Host + ?Sized>(host: &H, id: &EndpointId) -> Result<()> {
    let interface = host_interface_name(id);
    delete_link(host, &interface)?;
    info!(endpoint = %id, interface = %interface, "endpoint removed");
    Ok(())
}

pub(crate) fn delete_link<H: Host + ?Sized>(host: &H, interface: &str) -> Result<()> {
    host.ip(&["link", "delete", interface])?;
    Ok(())
}

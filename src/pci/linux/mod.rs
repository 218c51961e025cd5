use std::io;

mod mapped;
mod resource;

pub use self::mapped::MappedResource;

use crate::pci::PciEndpoint;

pub fn open_resource_readwrite(endpoint: PciEndpoint, resource: usize) -> io::Result<MappedResource> {
	let path = format!("/sys/bus/pci/devices/{}/resource{}", endpoint, resource);
	mapped::inner_open(endpoint, path)
}

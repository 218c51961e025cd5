use std::fs;
use std::io;

use super::PciEndpoint;

/// PCI vendor id of Xilinx; TaPaSCo PCIe boards enumerate with it.
const XILINX_VENDOR_ID: u16 = 0x10ee;

pub fn list_all_endpoints() -> io::Result<Vec<PciEndpoint>> {
	let mut list = Vec::new();
	for entry in fs::read_dir("/sys/bus/pci/devices")? {
		let entry = entry?;
		let fname = entry.file_name().into_string().map_err(|e| {
			io::Error::new(io::ErrorKind::Other, format!("Invalid (Non-UTF8) PCI device name {:?}", e))
		})?;
		let ep = fname.parse::<PciEndpoint>().map_err(|e| {
			io::Error::new(io::ErrorKind::Other, format!("Invalid PCI device name: {}", e))
		})?;
		list.push(ep);
	}

	Ok(list)
}

pub fn is_xilinx_device(ep: PciEndpoint) -> crate::AResult<bool> {
	Ok(ep.vendor()?.0 == XILINX_VENDOR_ID)
}

pub fn list_xilinx_endpoints() -> crate::AResult<Vec<PciEndpoint>> {
	let mut all = list_all_endpoints()?;
	all.sort();
	let mut result = Vec::new();
	for ep in all {
		if is_xilinx_device(ep)? {
			result.push(ep);
		}
	}
	Ok(result)
}

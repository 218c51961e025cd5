use crate::pci::PciResource;

use super::{
	ControlSpace,
	check_dword_address,
};

/// Control space reached through a memory mapped PCI BAR.
pub struct BarControlSpace<R>
where
	R: PciResource,
{
	resource: R,
}

impl<R> BarControlSpace<R>
where
	R: PciResource,
{
	pub fn new(resource: R) -> Self {
		BarControlSpace { resource }
	}

	pub fn into_inner(self) -> R {
		self.resource
	}
}

impl<R> ControlSpace for BarControlSpace<R>
where
	R: PciResource,
{
	fn read_ctl(&mut self, address: u64) -> crate::AResult<u32> {
		let offset = check_dword_address(address, self.resource.len())?;
		let value = self.resource.read_dword(offset);
		trace!("PCI {}: read  0x{:08x} -> 0x{:08x}", self.resource.endpoint(), address, value);
		Ok(value)
	}

	fn write_ctl(&mut self, address: u64, value: u32) -> crate::AResult<()> {
		let offset = check_dword_address(address, self.resource.len())?;
		trace!("PCI {}: write 0x{:08x} <- 0x{:08x}", self.resource.endpoint(), address, value);
		self.resource.write_dword(offset, value);
		Ok(())
	}
}

use super::PciEndpoint;

/// Memory mapped PCI BAR; only dword access, which is all the control
/// registers support anyway.
pub trait PciResource {
	fn endpoint(&self) -> PciEndpoint;
	fn len(&self) -> usize;

	fn read_dword(&self, offset: usize) -> u32; // handle PCI little-endian conversion
	fn write_dword(&mut self, offset: usize, data: u32); // handle PCI little-endian conversion
}

impl<'a, R: ?Sized + PciResource> PciResource for &'a mut R {
	fn endpoint(&self) -> PciEndpoint {
		R::endpoint(*self)
	}
	fn len(&self) -> usize {
		R::len(*self)
	}

	fn read_dword(&self, offset: usize) -> u32 {
		R::read_dword(*self, offset)
	}
	fn write_dword(&mut self, offset: usize, data: u32) {
		R::write_dword(*self, offset, data);
	}
}

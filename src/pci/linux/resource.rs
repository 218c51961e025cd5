use super::MappedResource;
use crate::pci::{
	PciEndpoint,
	resource,
};

impl resource::PciResource for MappedResource {
	fn endpoint(&self) -> PciEndpoint {
		MappedResource::endpoint(self)
	}

	fn len(&self) -> usize {
		MappedResource::len(self)
	}

	fn read_dword(&self, offset: usize) -> u32 {
		MappedResource::read_dword(self, offset)
	}

	fn write_dword(&mut self, offset: usize, data: u32) {
		MappedResource::write_dword(self, offset, data)
	}
}

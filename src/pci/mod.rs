mod endpoint;
mod list;
mod linux;
mod resource;

pub use self::endpoint::{
	DeviceID,
	PciBus,
	PciEndpoint,
	ScopedEnable,
	SlotFunction,
	VendorId,
};

pub use self::list::{
	is_xilinx_device,
	list_all_endpoints,
	list_xilinx_endpoints,
};

pub use self::resource::PciResource;

// OS-specific. for now linux only.
pub use self::linux::{
	MappedResource,
	open_resource_readwrite,
};

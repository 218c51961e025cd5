use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::FromRawFd;
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	c_void,
	mmap,
	munmap,
	open,
};

use crate::pci::PciEndpoint;

/// Read-write mapping of a PCI BAR.
///
/// All accesses are volatile: the BAR is device memory, every read and
/// write has to reach the bus in program order.
#[derive(Debug)]
pub struct MappedResource {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	endpoint: PciEndpoint,
}

impl Drop for MappedResource {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				panic!("munmap failed: {}", io::Error::last_os_error());
			}
		}
	}
}

impl MappedResource {
	pub fn endpoint(&self) -> PciEndpoint {
		self.endpoint
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn read_dword(&self, offset: usize) -> u32 {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		u32::from_le(unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset) as *const u32) })
	}

	pub fn write_dword(&mut self, offset: usize, data: u32) {
		assert!(offset & 3 == 0);
		assert!(offset + 3 < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset) as *mut u32, data.to_le()) }
	}
}

// TODO: exclusive open / file locking?
pub fn inner_open(endpoint: PciEndpoint, path: String) -> io::Result<MappedResource> {
	let path = CString::new(path)?;

	let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let f = unsafe { fs::File::from_raw_fd(fd) };

	let size = f.metadata()?.len();
	if size >= !0usize as u64 {
		return Err(io::Error::new(io::ErrorKind::Other, "PCI resource too large to map"));
	}
	let size = size as usize;
	let area = unsafe {
		mmap(
			ptr::null_mut(),
			size,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			0,
		)
	};

	if area as usize == !0usize {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => panic!("mmap shouldn't return NULL ever"),
		Some(area) => Ok(MappedResource {
			ptr: area,
			len: size,
			endpoint,
		}),
	}
}

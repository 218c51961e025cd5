//! Raw access to the platform control space.
//!
//! Addresses are absolute ("raw") control-space addresses; nothing below
//! this layer relocates them. All registers are 32 bits wide.

use std::thread;
use std::time::{
	Duration,
	Instant,
};

mod bar;
mod device_file;

pub use self::bar::BarControlSpace;
pub use self::device_file::DeviceFile;

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

pub trait ControlSpace {
	fn read_ctl(&mut self, address: u64) -> crate::AResult<u32>;
	fn write_ctl(&mut self, address: u64, value: u32) -> crate::AResult<()>;

	// wait between two polls of a register
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, S: ?Sized + ControlSpace> ControlSpace for &'a mut S {
	fn read_ctl(&mut self, address: u64) -> crate::AResult<u32> {
		S::read_ctl(*self, address)
	}

	fn write_ctl(&mut self, address: u64, value: u32) -> crate::AResult<()> {
		S::write_ctl(*self, address, value)
	}

	fn delay(&mut self, duration: Duration) {
		S::delay(*self, duration)
	}
}

fn check_dword_address(address: u64, len: usize) -> crate::AResult<usize> {
	ensure!(address & 3 == 0, "unaligned control space address 0x{:08x}", address);
	ensure!(address + 3 < len as u64, "control space address 0x{:08x} out of range (size 0x{:x})", address, len);
	Ok(address as usize)
}

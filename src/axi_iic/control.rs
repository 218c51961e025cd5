use crate::ctl::ControlSpace;

use super::regs::{
	ControlWord,
	control_bits,
};

/// Named flags of the control register.
///
/// Several independent flags share the one register, so every change is
/// a fresh read-modify-write of the current hardware value; nothing is
/// cached between calls.
pub struct ControlRegister<'a, S: ?Sized + ControlSpace + 'a> {
	space: &'a mut S,
	address: u64,
}

impl<'a, S: ?Sized + ControlSpace> ControlRegister<'a, S> {
	pub fn new(space: &'a mut S, address: u64) -> Self {
		ControlRegister { space, address }
	}

	pub fn read(&mut self) -> crate::AResult<ControlWord> {
		Ok(ControlWord(self.space.read_ctl(self.address)?))
	}

	fn modify(&mut self, bit: u32, value: bool) -> crate::AResult<()> {
		let mut word = self.read()?;
		word.set_flag(bit, value);
		self.space.write_ctl(self.address, word.0)
	}

	pub fn enable_device(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::ENABLE, true)
	}
	pub fn disable_device(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::ENABLE, false)
	}

	pub fn start_transfer(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::START_TRANSFER, true)
	}
	pub fn end_transfer(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::START_TRANSFER, false)
	}

	pub fn enable_general_call(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::GENERAL_CALL, true)
	}
	pub fn disable_general_call(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::GENERAL_CALL, false)
	}

	pub fn reset_tx_fifo(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::TX_FIFO_RESET, true)
	}
	pub fn clear_tx_fifo_reset(&mut self) -> crate::AResult<()> {
		self.modify(control_bits::TX_FIFO_RESET, false)
	}
}

#[cfg(test)]
mod test {
	use std::collections::HashMap;

	use super::ControlRegister;
	use crate::ctl::ControlSpace;

	const CONTROL: u64 = 0x0040_0100;

	// plain memory; logs every access
	#[derive(Default)]
	struct Memory {
		words: HashMap<u64, u32>,
		log: Vec<(char, u64, u32)>,
	}

	impl ControlSpace for Memory {
		fn read_ctl(&mut self, address: u64) -> crate::AResult<u32> {
			let v = *self.words.get(&address).unwrap_or(&0);
			self.log.push(('r', address, v));
			Ok(v)
		}

		fn write_ctl(&mut self, address: u64, value: u32) -> crate::AResult<()> {
			self.log.push(('w', address, value));
			self.words.insert(address, value);
			Ok(())
		}
	}

	#[test]
	fn toggles_preserve_other_bits() {
		let mut mem = Memory::default();
		mem.words.insert(CONTROL, 0xffff_ff00);

		ControlRegister::new(&mut mem, CONTROL).enable_device().expect("enable");
		assert_eq!(mem.words[&CONTROL], 0xffff_ff01);
		ControlRegister::new(&mut mem, CONTROL).reset_tx_fifo().expect("fifo reset");
		ControlRegister::new(&mut mem, CONTROL).start_transfer().expect("start");
		ControlRegister::new(&mut mem, CONTROL).enable_general_call().expect("gc");
		assert_eq!(mem.words[&CONTROL], 0xffff_ff47);

		ControlRegister::new(&mut mem, CONTROL).clear_tx_fifo_reset().expect("release fifo reset");
		assert_eq!(mem.words[&CONTROL], 0xffff_ff45);
		ControlRegister::new(&mut mem, CONTROL).disable_general_call().expect("no gc");
		ControlRegister::new(&mut mem, CONTROL).end_transfer().expect("end");
		ControlRegister::new(&mut mem, CONTROL).disable_device().expect("disable");
		assert_eq!(mem.words[&CONTROL], 0xffff_ff00);
	}

	#[test]
	fn every_toggle_rereads_hardware() {
		let mut mem = Memory::default();
		{
			let mut ctrl = ControlRegister::new(&mut mem, CONTROL);
			ctrl.enable_device().expect("enable");
		}
		// someone else sets a bit behind our back
		mem.words.insert(CONTROL, 0x0000_0081);
		{
			let mut ctrl = ControlRegister::new(&mut mem, CONTROL);
			ctrl.start_transfer().expect("start");
		}
		assert_eq!(mem.words[&CONTROL], 0x0000_0085);
		assert_eq!(mem.log, vec![
			('r', CONTROL, 0x00),
			('w', CONTROL, 0x01),
			('r', CONTROL, 0x81),
			('w', CONTROL, 0x85),
		]);
	}
}

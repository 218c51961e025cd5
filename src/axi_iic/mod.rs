//! Polling I2C master on top of a Xilinx AXI IIC controller.
//!
//! Transactions are framed in the transmit FIFO (start/stop flags next to
//! each byte); the controller runs them on its own, the host only polls
//! the status register. There is no interrupt handling and no retry: a
//! caller that wants another attempt issues the whole transaction again.

use std::time::Duration;

use crate::ctl::ControlSpace;

mod bits;
mod control;
mod regs;

pub use self::bits::{
	get_bit,
	set_bit,
};
pub use self::control::ControlRegister;
pub use self::regs::{
	ControlWord,
	DEFAULT_BASE,
	InterruptStatus,
	Register,
	RegisterMap,
	SOFT_RESET_KEY,
	Status,
	TxFifoEntry,
	control_bits,
	fifo_bits,
	interrupt_bits,
	status_bits,
};

/// Longest transfer: the byte count of a read travels in a single FIFO entry.
pub const MAX_TRANSFER: usize = 0xff;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Write,
	Read,
}

/// First byte of a transfer: 7-bit address with the direction in the LSB.
pub fn address_byte(address: u8, direction: Direction) -> u8 {
	let rw = match direction {
		Direction::Write => 0,
		Direction::Read => 1,
	};
	address << 1 | rw
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IicConfig {
	/// sleep between two status polls
	pub poll_interval: Duration,
	/// give up a wait after this many re-polls; `None` waits forever
	pub poll_limit: Option<usize>,
	/// receive FIFO programmable interrupt threshold
	pub rx_fifo_pirq: u8,
}

impl Default for IicConfig {
	fn default() -> Self {
		IicConfig {
			poll_interval: Duration::from_millis(1),
			poll_limit: None,
			rx_fifo_pirq: 0x0F,
		}
	}
}

/// Single owner of one AXI IIC controller.
pub struct IicMaster<S: ControlSpace> {
	space: S,
	map: RegisterMap,
	config: IicConfig,
}

impl<S: ControlSpace> IicMaster<S> {
	pub fn new(space: S, map: RegisterMap, config: IicConfig) -> Self {
		IicMaster {
			space,
			map,
			config,
		}
	}

	pub fn with_defaults(space: S) -> Self {
		IicMaster::new(space, RegisterMap::default(), IicConfig::default())
	}

	pub fn space(&mut self) -> &mut S {
		&mut self.space
	}

	pub fn into_inner(self) -> S {
		self.space
	}

	pub fn register_map(&self) -> RegisterMap {
		self.map
	}

	pub fn config(&self) -> &IicConfig {
		&self.config
	}

	fn read(&mut self, register: Register) -> crate::AResult<u32> {
		let address = self.map.address(register);
		self.space.read_ctl(address)
	}

	fn write(&mut self, register: Register, value: u32) -> crate::AResult<()> {
		let address = self.map.address(register);
		self.space.write_ctl(address, value)
	}

	pub fn status(&mut self) -> crate::AResult<Status> {
		Ok(Status::decode(self.read(Register::Status)?))
	}

	pub fn interrupt_status(&mut self) -> crate::AResult<InterruptStatus> {
		Ok(InterruptStatus::decode(self.read(Register::InterruptStatus)?))
	}

	/// Read (acknowledges on some controllers), then clear all flags.
	pub fn reset_interrupt_status(&mut self) -> crate::AResult<()> {
		self.read(Register::InterruptStatus)?;
		self.write(Register::InterruptStatus, 0)
	}

	pub fn control(&mut self) -> ControlRegister<S> {
		let address = self.map.address(Register::Control);
		ControlRegister::new(&mut self.space, address)
	}

	pub fn reset_device(&mut self) -> crate::AResult<()> {
		self.write(Register::SoftReset, SOFT_RESET_KEY)
	}

	pub fn set_rx_fifo_pirq(&mut self, threshold: u8) -> crate::AResult<()> {
		self.write(Register::RxFifoPirq, threshold as u32)
	}

	pub fn set_general_purpose_output(&mut self, value: u32) -> crate::AResult<()> {
		self.write(Register::GeneralPurposeOutput, value)
	}

	/// Queue one byte; never waits for FIFO space.
	pub fn enqueue_word(&mut self, data: u8, start: bool, stop: bool) -> crate::AResult<()> {
		let entry = TxFifoEntry::new(data, start, stop);
		trace!("IIC enqueue {:?}", entry);
		self.write(Register::TxFifo, entry.0)
	}

	/// Take one byte from the receive FIFO; never waits for data.
	pub fn dequeue_word(&mut self) -> crate::AResult<u8> {
		Ok(self.read(Register::RxFifo)? as u8)
	}

	/// Re-read the status register until `keep_polling` returns false.
	fn poll_status<F>(&mut self, what: &str, mut keep_polling: F) -> crate::AResult<Status>
	where
		F: FnMut(&Status) -> bool,
	{
		let mut status = self.status()?;
		let mut polls = 0usize;
		while keep_polling(&status) {
			if let Some(limit) = self.config.poll_limit {
				if polls >= limit {
					bail!("IIC: gave up waiting for {} after {} polls ({})", what, polls, status);
				}
			}
			self.space.delay(self.config.poll_interval);
			status = self.status()?;
			polls += 1;
		}
		Ok(status)
	}

	/// Reset and configure the controller, then wait for an idle bus.
	fn begin_transaction(&mut self) -> crate::AResult<()> {
		self.reset_device()?;
		let pirq = self.config.rx_fifo_pirq;
		self.set_rx_fifo_pirq(pirq)?;
		self.control().reset_tx_fifo()?;
		self.reset_interrupt_status()?;
		self.control().enable_device()?;
		self.control().clear_tx_fifo_reset()?;
		self.control().disable_general_call()?;
		debug!("IIC init done");

		self.poll_status("idle bus", |s| !s.is_idle())?;
		debug!("IIC FIFOs empty, ready to go");
		Ok(())
	}

	fn receive(&mut self, data: &mut [u8]) -> crate::AResult<()> {
		for slot in data.iter_mut() {
			self.poll_status("receive data", |s| s.rx_empty)?;
			*slot = self.dequeue_word()?;
		}
		Ok(())
	}

	/// Write `data` to the device at `address`.
	///
	/// Returns `true` if the controller flagged an error (no ACK, lost
	/// arbitration), `false` on success.
	pub fn write_register(&mut self, address: u8, data: &[u8]) -> crate::AResult<bool> {
		check_address(address)?;
		ensure!(!data.is_empty(), "IIC write to 0x{:02x} without data", address);

		self.begin_transaction()?;

		self.enqueue_word(address_byte(address, Direction::Write), true, false)?;
		let last = data.len() - 1;
		for (i, &byte) in data.iter().enumerate() {
			self.enqueue_word(byte, false, i == last)?;
		}

		self.poll_status("write to finish", |s| s.is_write_in_flight())?;
		let isr = self.interrupt_status()?;
		self.control().disable_device()?;
		if isr.error_or_complete {
			warn!("IIC write of {} bytes to 0x{:02x} unsuccessful: {}", data.len(), address, isr);
			Ok(true)
		} else {
			debug!("IIC wrote {} bytes to 0x{:02x}", data.len(), address);
			Ok(false)
		}
	}

	/// Read `data.len()` bytes from the device at `address`, starting at
	/// whatever register the device currently points to.
	///
	/// Errors reported by the controller are only logged; verify the data.
	pub fn read_register(&mut self, address: u8, data: &mut [u8]) -> crate::AResult<()> {
		check_address(address)?;
		let count = check_read_len(address, data)?;

		self.begin_transaction()?;

		self.enqueue_word(address_byte(address, Direction::Read), true, false)?;
		self.enqueue_word(count, false, true)?;
		debug!("IIC requested {} bytes from 0x{:02x}", count, address);

		self.receive(data)?;

		let isr = self.interrupt_status()?;
		debug!("IIC read from 0x{:02x} done: {}", address, isr);
		self.control().disable_device()
	}

	/// Select `register` on the device at `address` and read `data.len()`
	/// bytes from there, using a repeated start instead of releasing the bus.
	pub fn read_register_full(&mut self, address: u8, register: u8, data: &mut [u8]) -> crate::AResult<()> {
		check_address(address)?;
		let count = check_read_len(address, data)?;

		self.begin_transaction()?;

		self.enqueue_word(address_byte(address, Direction::Write), true, false)?;
		self.enqueue_word(register, false, false)?;
		self.enqueue_word(address_byte(address, Direction::Read), true, false)?;
		self.enqueue_word(count, false, true)?;
		debug!("IIC requested {} bytes from 0x{:02x} register {}", count, address, register);

		self.receive(data)?;

		self.control().disable_device()
	}
}

fn check_address(address: u8) -> crate::AResult<()> {
	ensure!(address < 0x80, "IIC address 0x{:02x} is not a 7-bit address", address);
	Ok(())
}

fn check_read_len(address: u8, data: &[u8]) -> crate::AResult<u8> {
	ensure!(!data.is_empty(), "IIC read from 0x{:02x} of zero bytes", address);
	ensure!(data.len() <= MAX_TRANSFER, "IIC read from 0x{:02x} of {} bytes (max {})", address, data.len(), MAX_TRANSFER);
	Ok(data.len() as u8)
}

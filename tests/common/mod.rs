//! Simulated AXI IIC controller with a few devices on its bus.

#![allow(dead_code)]

use std::collections::{
	HashMap,
	VecDeque,
};
use std::time::Duration;

use failure::format_err;

use tapasco_si5324::AResult;
use tapasco_si5324::axi_iic::{
	Register,
	RegisterMap,
	SOFT_RESET_KEY,
	TxFifoEntry,
	control_bits,
	interrupt_bits,
	status_bits,
};
use tapasco_si5324::ctl::ControlSpace;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Access {
	Read(Register, u32),
	Write(Register, u32),
}

/// I2C switch: one control byte selecting the downstream segments.
#[derive(Default, Debug)]
pub struct Switch {
	pub position: u8,
}

/// Register file device with an auto-incrementing register pointer.
#[derive(Debug)]
pub struct RegisterDevice {
	pub regs: [u8; 256],
	pub pointer: u8,
	/// bits flipped on every write to a register
	pub corrupt: HashMap<u8, u8>,
	/// reads a register survives before it clears itself
	pub self_clearing: HashMap<u8, usize>,
	pub reads: HashMap<u8, usize>,
}

impl Default for RegisterDevice {
	fn default() -> Self {
		RegisterDevice {
			regs: [0; 256],
			pointer: 0,
			corrupt: HashMap::new(),
			self_clearing: HashMap::new(),
			reads: HashMap::new(),
		}
	}
}

#[derive(Debug)]
pub enum Device {
	Switch(Switch),
	Registers(RegisterDevice),
}

impl Device {
	fn write(&mut self, data: &[u8]) {
		match self {
			Device::Switch(sw) => {
				if let Some(&last) = data.last() {
					sw.position = last;
				}
			},
			Device::Registers(dev) => {
				let mut bytes = data.iter();
				if let Some(&pointer) = bytes.next() {
					dev.pointer = pointer;
				}
				for &b in bytes {
					let flip = dev.corrupt.get(&dev.pointer).cloned().unwrap_or(0);
					dev.regs[dev.pointer as usize] = b ^ flip;
					dev.pointer = dev.pointer.wrapping_add(1);
				}
			},
		}
	}

	fn read(&mut self) -> u8 {
		match self {
			Device::Switch(sw) => sw.position,
			Device::Registers(dev) => {
				let reg = dev.pointer;
				*dev.reads.entry(reg).or_insert(0) += 1;
				if let Some(left) = dev.self_clearing.get_mut(&reg) {
					if *left == 0 {
						dev.regs[reg as usize] = 0;
					} else {
						*left -= 1;
					}
				}
				dev.pointer = dev.pointer.wrapping_add(1);
				dev.regs[reg as usize]
			},
		}
	}
}

pub struct SimController {
	pub map: RegisterMap,
	pub control: u32,
	pub isr: u32,
	pub pirq: u32,
	pub gpo: Vec<u32>,
	pub resets: usize,
	/// every FIFO entry ever queued
	pub tx_log: Vec<TxFifoEntry>,
	pending: Vec<TxFifoEntry>,
	pub rx: VecDeque<u8>,
	pub devices: HashMap<u8, Device>,
	/// status reads that still report a busy bus
	pub busy_polls: usize,
	pub always_busy: bool,
	/// flag an error on every executed transfer
	pub fail_transfers: bool,
	/// keep queued bytes in the TX FIFO instead of sending them
	pub stall_tx: bool,
	pub accesses: Vec<Access>,
	pub delays: Vec<Duration>,
	/// panic once more delays than this were requested
	pub delay_limit: Option<usize>,
}

impl SimController {
	pub fn new() -> Self {
		SimController {
			map: RegisterMap::default(),
			control: 0,
			isr: 0,
			pirq: 0,
			gpo: Vec::new(),
			resets: 0,
			tx_log: Vec::new(),
			pending: Vec::new(),
			rx: VecDeque::new(),
			devices: HashMap::new(),
			busy_polls: 0,
			always_busy: false,
			fail_transfers: false,
			stall_tx: false,
			accesses: Vec::new(),
			delays: Vec::new(),
			delay_limit: Some(100_000),
		}
	}

	/// Switch at 0x74, Si5324-like register device at 0x68.
	pub fn with_board() -> Self {
		let mut sim = SimController::new();
		sim.devices.insert(0x74, Device::Switch(Switch::default()));
		sim.devices.insert(0x68, Device::Registers(RegisterDevice::default()));
		sim
	}

	pub fn registers(&mut self, address: u8) -> &mut RegisterDevice {
		match self.devices.get_mut(&address) {
			Some(Device::Registers(dev)) => dev,
			_ => panic!("no register device at 0x{:02x}", address),
		}
	}

	pub fn switch(&mut self, address: u8) -> &mut Switch {
		match self.devices.get_mut(&address) {
			Some(Device::Switch(sw)) => sw,
			_ => panic!("no switch at 0x{:02x}", address),
		}
	}

	fn register_at(&self, address: u64) -> Option<Register> {
		[
			Register::InterruptStatus,
			Register::SoftReset,
			Register::Control,
			Register::Status,
			Register::TxFifo,
			Register::RxFifo,
			Register::RxFifoPirq,
			Register::GeneralPurposeOutput,
		].iter().cloned().find(|&r| self.map.address(r) == address)
	}

	fn status_word(&mut self) -> u32 {
		let busy = if self.always_busy {
			true
		} else if self.busy_polls > 0 {
			self.busy_polls -= 1;
			true
		} else {
			false
		};
		let mut raw = 0;
		if self.pending.is_empty() { raw |= 1 << status_bits::TX_EMPTY; }
		if self.rx.is_empty() { raw |= 1 << status_bits::RX_EMPTY; }
		if busy { raw |= 1 << status_bits::BUS_BUSY; }
		raw
	}

	fn flag_error(&mut self) {
		self.isr |= 1 << interrupt_bits::ERROR_OR_COMPLETE;
	}

	// run everything queued up to (and including) a stop entry
	fn execute(&mut self) {
		let burst: Vec<TxFifoEntry> = self.pending.drain(..).collect();
		let mut segments: Vec<Vec<TxFifoEntry>> = Vec::new();
		for entry in burst {
			if entry.is_start() || segments.is_empty() {
				segments.push(Vec::new());
			}
			if let Some(segment) = segments.last_mut() {
				segment.push(entry);
			}
		}

		for segment in segments {
			let first = segment[0].data();
			let address = first >> 1;
			let data: Vec<u8> = segment[1..].iter().map(|e| e.data()).collect();
			let device = match self.devices.get_mut(&address) {
				Some(d) => d,
				None => {
					// nobody acknowledged the address
					self.flag_error();
					return;
				},
			};
			if first & 1 == 0 {
				device.write(&data);
			} else {
				let count = data.get(0).cloned().unwrap_or(0);
				for _ in 0..count {
					let b = device.read();
					self.rx.push_back(b);
				}
			}
		}

		if self.fail_transfers {
			self.flag_error();
		}
	}

	pub fn queued(&self) -> usize {
		self.pending.len()
	}
}

impl ControlSpace for SimController {
	fn read_ctl(&mut self, address: u64) -> AResult<u32> {
		let register = self.register_at(address)
			.ok_or_else(|| format_err!("read from unmapped address 0x{:08x}", address))?;
		let value = match register {
			Register::Control => self.control,
			Register::Status => self.status_word(),
			Register::InterruptStatus => self.isr,
			Register::RxFifoPirq => self.pirq,
			Register::RxFifo => self.rx.pop_front().unwrap_or(0) as u32,
			Register::GeneralPurposeOutput => self.gpo.last().cloned().unwrap_or(0),
			Register::TxFifo | Register::SoftReset => 0,
		};
		self.accesses.push(Access::Read(register, value));
		Ok(value)
	}

	fn write_ctl(&mut self, address: u64, value: u32) -> AResult<()> {
		let register = self.register_at(address)
			.ok_or_else(|| format_err!("write to unmapped address 0x{:08x}", address))?;
		self.accesses.push(Access::Write(register, value));
		match register {
			Register::SoftReset => {
				if value == SOFT_RESET_KEY {
					self.resets += 1;
					self.control = 0;
					self.isr = 0;
					self.pending.clear();
					self.rx.clear();
				}
			},
			Register::Control => {
				self.control = value;
				if value & (1 << control_bits::TX_FIFO_RESET) != 0 {
					self.pending.clear();
				}
			},
			Register::InterruptStatus => self.isr = value,
			Register::RxFifoPirq => self.pirq = value,
			Register::GeneralPurposeOutput => self.gpo.push(value),
			Register::TxFifo => {
				let entry = TxFifoEntry(value);
				self.tx_log.push(entry);
				self.pending.push(entry);
				if entry.is_stop() && !self.stall_tx {
					self.execute();
				}
			},
			Register::Status | Register::RxFifo => {},
		}
		Ok(())
	}

	fn delay(&mut self, duration: Duration) {
		self.delays.push(duration);
		if let Some(limit) = self.delay_limit {
			if self.delays.len() > limit {
				panic!("simulated bus never became ready ({} polls)", limit);
			}
		}
	}
}

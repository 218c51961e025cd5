//! Register map of the AXI IIC controller and decoders for its words.

use std::fmt;

use super::bits::{
	get_bit,
	set_bit,
};

/// Controller base inside the TaPaSCo control space.
pub const DEFAULT_BASE: u64 = 0x0040_0000;

/// Writing this to `SoftReset` resets the whole controller.
pub const SOFT_RESET_KEY: u32 = 0xA;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Register {
	InterruptStatus,
	SoftReset,
	Control,
	Status,
	TxFifo,
	RxFifo,
	RxFifoPirq,
	GeneralPurposeOutput,
}

impl Register {
	pub fn offset(self) -> u64 {
		match self {
			Register::InterruptStatus => 0x020,
			Register::SoftReset => 0x040,
			Register::Control => 0x100,
			Register::Status => 0x104,
			Register::TxFifo => 0x108,
			Register::RxFifo => 0x10C,
			Register::RxFifoPirq => 0x120,
			Register::GeneralPurposeOutput => 0x124,
		}
	}
}

/// Where one controller instance lives in the control space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RegisterMap {
	pub base: u64,
}

impl RegisterMap {
	pub fn new(base: u64) -> Self {
		RegisterMap { base }
	}

	pub fn address(&self, register: Register) -> u64 {
		self.base + register.offset()
	}
}

impl Default for RegisterMap {
	fn default() -> Self {
		RegisterMap::new(DEFAULT_BASE)
	}
}

pub mod control_bits {
	pub const ENABLE: u32 = 0;
	pub const TX_FIFO_RESET: u32 = 1;
	pub const START_TRANSFER: u32 = 2;
	pub const GENERAL_CALL: u32 = 6;
}

pub mod status_bits {
	pub const TX_EMPTY: u32 = 7;
	pub const RX_EMPTY: u32 = 6;
	pub const TX_FULL: u32 = 5;
	pub const RX_FULL: u32 = 4;
	pub const SLAVE_READ_WRITE: u32 = 3;
	pub const BUS_BUSY: u32 = 2;
	pub const ADDRESSED_AS_SLAVE: u32 = 1;
	pub const ADDRESSED_BY_GENERAL_CALL: u32 = 0;
}

pub mod interrupt_bits {
	pub const TX_HALF: u32 = 7;
	pub const NOT_ADDRESSED: u32 = 6;
	pub const ADDRESSED: u32 = 5;
	pub const NOT_BUSY: u32 = 4;
	pub const RX_FULL: u32 = 3;
	pub const TX_EMPTY: u32 = 2;
	pub const ERROR_OR_COMPLETE: u32 = 1;
	pub const ARBITRATION_LOST: u32 = 0;
}

pub mod fifo_bits {
	pub const START: u32 = 8;
	pub const STOP: u32 = 9;
}

/// Snapshot of the bus / FIFO status register.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Status {
	pub tx_empty: bool,
	pub rx_empty: bool,
	pub tx_full: bool,
	pub rx_full: bool,
	pub slave_read_write: bool,
	pub bus_busy: bool,
	pub addressed_as_slave: bool,
	pub addressed_by_general_call: bool,
}

impl Status {
	pub fn decode(raw: u32) -> Self {
		use self::status_bits::*;
		Status {
			tx_empty: get_bit(raw, TX_EMPTY),
			rx_empty: get_bit(raw, RX_EMPTY),
			tx_full: get_bit(raw, TX_FULL),
			rx_full: get_bit(raw, RX_FULL),
			slave_read_write: get_bit(raw, SLAVE_READ_WRITE),
			bus_busy: get_bit(raw, BUS_BUSY),
			addressed_as_slave: get_bit(raw, ADDRESSED_AS_SLAVE),
			addressed_by_general_call: get_bit(raw, ADDRESSED_BY_GENERAL_CALL),
		}
	}

	/// Both FIFOs drained and nobody on the bus: a transaction may start.
	pub fn is_idle(&self) -> bool {
		self.tx_empty && self.rx_empty && !self.bus_busy
	}

	/// Condition a write keeps waiting on after queueing its bytes.
	///
	/// Only holds while the TX FIFO still has data *and* the bus is busy, so
	/// the wait ends as soon as either clears. Weaker than `is_idle`; kept
	/// as the hardware tools have always behaved (likely a latent bug).
	pub fn is_write_in_flight(&self) -> bool {
		!self.tx_empty && self.bus_busy
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Status(")?;
		if self.tx_empty { write!(f, " [TX_EMPTY]")?; }
		if self.rx_empty { write!(f, " [RX_EMPTY]")?; }
		if self.tx_full { write!(f, " [TX_FULL]")?; }
		if self.rx_full { write!(f, " [RX_FULL]")?; }
		if self.slave_read_write { write!(f, " [SRW]")?; }
		if self.bus_busy { write!(f, " [BUS_BUSY]")?; }
		if self.addressed_as_slave { write!(f, " [AAS]")?; }
		if self.addressed_by_general_call { write!(f, " [ABGC]")?; }
		write!(f, " )")
	}
}

/// Snapshot of the interrupt status register. Reading does not clear it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct InterruptStatus {
	pub tx_half: bool,
	pub not_addressed: bool,
	pub addressed: bool,
	pub not_busy: bool,
	pub rx_full: bool,
	pub tx_empty: bool,
	pub error_or_complete: bool,
	pub arbitration_lost: bool,
}

impl InterruptStatus {
	pub fn decode(raw: u32) -> Self {
		use self::interrupt_bits::*;
		InterruptStatus {
			tx_half: get_bit(raw, TX_HALF),
			not_addressed: get_bit(raw, NOT_ADDRESSED),
			addressed: get_bit(raw, ADDRESSED),
			not_busy: get_bit(raw, NOT_BUSY),
			rx_full: get_bit(raw, RX_FULL),
			tx_empty: get_bit(raw, TX_EMPTY),
			error_or_complete: get_bit(raw, ERROR_OR_COMPLETE),
			arbitration_lost: get_bit(raw, ARBITRATION_LOST),
		}
	}
}

impl fmt::Display for InterruptStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "ISR(")?;
		if self.tx_half { write!(f, " [TX_HALF]")?; }
		if self.not_addressed { write!(f, " [NOT_ADDRESSED]")?; }
		if self.addressed { write!(f, " [ADDRESSED]")?; }
		if self.not_busy { write!(f, " [NOT_BUSY]")?; }
		if self.rx_full { write!(f, " [RX_FULL]")?; }
		if self.tx_empty { write!(f, " [TX_EMPTY]")?; }
		if self.error_or_complete { write!(f, " [ERROR]")?; }
		if self.arbitration_lost { write!(f, " [ARB_LOST]")?; }
		write!(f, " )")
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlWord(pub u32);

impl ControlWord {
	pub fn is_enabled(&self) -> bool {
		get_bit(self.0, control_bits::ENABLE)
	}
	pub fn is_tx_fifo_reset(&self) -> bool {
		get_bit(self.0, control_bits::TX_FIFO_RESET)
	}
	pub fn is_start_transfer(&self) -> bool {
		get_bit(self.0, control_bits::START_TRANSFER)
	}
	pub fn is_general_call(&self) -> bool {
		get_bit(self.0, control_bits::GENERAL_CALL)
	}

	pub fn set_flag(&mut self, bit: u32, value: bool) -> &mut Self {
		set_bit(&mut self.0, bit, value);
		self
	}
}

impl fmt::Display for ControlWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.0)
	}
}

impl fmt::Debug for ControlWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x} (", self.0)?;
		if self.is_enabled() { write!(f, " [EN]")?; }
		if self.is_tx_fifo_reset() { write!(f, " [TX_FIFO_RST]")?; }
		if self.is_start_transfer() { write!(f, " [MSMS]")?; }
		if self.is_general_call() { write!(f, " [GC_EN]")?; }
		write!(f, " )")
	}
}

/// One 10-bit entry of the transmit FIFO: data byte plus framing flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxFifoEntry(pub u32);

impl TxFifoEntry {
	pub fn new(data: u8, start: bool, stop: bool) -> Self {
		let mut raw = data as u32;
		set_bit(&mut raw, fifo_bits::START, start);
		set_bit(&mut raw, fifo_bits::STOP, stop);
		TxFifoEntry(raw)
	}

	pub fn data(&self) -> u8 {
		self.0 as u8
	}
	pub fn is_start(&self) -> bool {
		get_bit(self.0, fifo_bits::START)
	}
	pub fn is_stop(&self) -> bool {
		get_bit(self.0, fifo_bits::STOP)
	}
}

impl fmt::Debug for TxFifoEntry {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:03x} (data: 0x{:02x}", self.0, self.data())?;
		if self.is_start() { write!(f, " [START]")?; }
		if self.is_stop() { write!(f, " [STOP]")?; }
		write!(f, ")")
	}
}

//! Bring-up of the Si5324 clock synthesizer behind the board's I2C switch.
//!
//! Register values for a free running clock on CKIN1 feeding the DDR3
//! reference; the switch (PCA9548 style, single control byte) has to route
//! the DDR3 segment first.

use std::time::Duration;

use crate::axi_iic::IicMaster;
use crate::ctl::ControlSpace;

pub const SWITCH_ADDRESS: u8 = 0x74;
pub const SWITCH_POSITION_DDR3: u8 = 0x10;
pub const SI5324_ADDRESS: u8 = 0x68;

// general purpose output lines
pub const GPO_SWITCH_RESET: u32 = 0x1;
pub const GPO_CLOCK_RESET: u32 = 0x2;

/// Internal calibration; the device clears the register once it locked.
pub const CALIBRATION_REGISTER: u8 = 136;
pub const ICAL: u8 = 0x40;

/// (first register, values) written in this order; each block is read
/// back and compared byte by byte.
pub const SI5324_REGISTERS: &[(u8, &[u8])] = &[
	// free run, clock always on, no bypass; CKIN2 second priority;
	// BWSEL 1; CKIN1, no digital hold; automatic revertive, HIST_DEL 0x12
	(0, &[0x54, 0xE4, 0x12, 0x15, 0x92]),
	// CKOUT2 disabled, CKOUT1 enabled; CKIN1 and CKIN2 enabled
	(10, &[0x08, 0x40]),
	(25, &[0xA0]), // N1_HS
	(31, &[0x00, 0x00, 0x03]), // NC1_LS
	(40, &[0xC2, 0x49, 0xEF]), // N2_HS, N2_LS
	(43, &[0x00, 0x77, 0x0B]), // N31
	(46, &[0x00, 0x77, 0x0B]), // N32
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BringUpConfig {
	pub switch_address: u8,
	pub switch_position: u8,
	pub clock_address: u8,
	pub switch_reset_hold: Duration,
	pub clock_reset_hold: Duration,
	pub lock_poll_interval: Duration,
	/// `None`: wait for the lock forever
	pub lock_poll_limit: Option<usize>,
}

impl Default for BringUpConfig {
	fn default() -> Self {
		BringUpConfig {
			switch_address: SWITCH_ADDRESS,
			switch_position: SWITCH_POSITION_DDR3,
			clock_address: SI5324_ADDRESS,
			switch_reset_hold: Duration::from_millis(100),
			clock_reset_hold: Duration::from_secs(1),
			lock_poll_interval: Duration::from_millis(10),
			lock_poll_limit: None,
		}
	}
}

pub struct Si5324<S: ControlSpace> {
	iic: IicMaster<S>,
	config: BringUpConfig,
}

impl<S: ControlSpace> Si5324<S> {
	pub fn new(iic: IicMaster<S>, config: BringUpConfig) -> Self {
		Si5324 { iic, config }
	}

	pub fn iic(&mut self) -> &mut IicMaster<S> {
		&mut self.iic
	}

	pub fn into_inner(self) -> IicMaster<S> {
		self.iic
	}

	fn pulse_reset(&mut self, line: u32, hold: Duration) -> crate::AResult<()> {
		self.iic.set_general_purpose_output(line)?;
		self.iic.space().delay(hold);
		self.iic.set_general_purpose_output(0)
	}

	pub fn reset_switch(&mut self) -> crate::AResult<()> {
		let hold = self.config.switch_reset_hold;
		self.pulse_reset(GPO_SWITCH_RESET, hold)
	}

	pub fn reset_clock(&mut self) -> crate::AResult<()> {
		let hold = self.config.clock_reset_hold;
		self.pulse_reset(GPO_CLOCK_RESET, hold)
	}

	pub fn release_resets(&mut self) -> crate::AResult<()> {
		self.iic.set_general_purpose_output(0)
	}

	pub fn set_switch_position(&mut self, position: u8) -> crate::AResult<()> {
		if self.iic.write_register(self.config.switch_address, &[position])? {
			bail!("Failed to write switch position register.");
		}
		Ok(())
	}

	pub fn switch_position(&mut self) -> crate::AResult<u8> {
		let mut position = [0u8];
		self.iic.read_register(self.config.switch_address, &mut position)?;
		Ok(position[0])
	}

	/// Write `data` starting at `register`, then read it back.
	pub fn program_block(&mut self, register: u8, data: &[u8]) -> crate::AResult<()> {
		let address = self.config.clock_address;

		let mut request = Vec::with_capacity(data.len() + 1);
		request.push(register);
		request.extend_from_slice(data);
		if self.iic.write_register(address, &request)? {
			bail!("Writing {} bytes to register {} failed.", data.len(), register);
		}

		let mut read_back = vec![0u8; data.len()];
		self.iic.read_register_full(address, register, &mut read_back)?;
		for (i, (&expected, &actual)) in data.iter().zip(read_back.iter()).enumerate() {
			ensure!(expected == actual,
				"Register {} failed. (wrote 0x{:02x}, read 0x{:02x})", register as usize + i, expected, actual
			);
		}
		debug!("Si5324: registers {}..{} verified", register, register as usize + data.len());
		Ok(())
	}

	pub fn program_registers(&mut self, blocks: &[(u8, &[u8])]) -> crate::AResult<()> {
		for &(register, data) in blocks {
			self.program_block(register, data)?;
		}
		Ok(())
	}

	pub fn start_calibration(&mut self) -> crate::AResult<()> {
		let address = self.config.clock_address;
		if self.iic.write_register(address, &[CALIBRATION_REGISTER, ICAL])? {
			bail!("Failed to start calibration.");
		}
		Ok(())
	}

	/// Poll the calibration register until it reads zero; returns how many
	/// extra reads that took.
	pub fn wait_for_lock(&mut self) -> crate::AResult<usize> {
		let address = self.config.clock_address;
		let mut value = [0xffu8];
		self.iic.read_register_full(address, CALIBRATION_REGISTER, &mut value)?;

		let mut polls = 0usize;
		while value[0] != 0 {
			if let Some(limit) = self.config.lock_poll_limit {
				ensure!(polls < limit, "Si5324 didn't lock after {} polls (register {}: 0x{:02x})", polls, CALIBRATION_REGISTER, value[0]);
			}
			let interval = self.config.lock_poll_interval;
			self.iic.space().delay(interval);
			self.iic.read_register_full(address, CALIBRATION_REGISTER, &mut value)?;
			polls += 1;
		}
		Ok(polls)
	}

	/// Full sequence; every step has to succeed before the next one runs.
	pub fn bring_up(&mut self) -> crate::AResult<()> {
		self.reset_switch()?;
		self.reset_clock()?;
		info!("Switch and clock reset");

		let position = self.config.switch_position;
		self.set_switch_position(position)?;
		let actual = self.switch_position()?;
		ensure!(actual == position, "Switch position reads 0x{:02x}, expected 0x{:02x}", actual, position);
		info!("Switch position: 0x{:02x}", actual);

		self.program_registers(SI5324_REGISTERS)?;
		info!("Si5324 configured");

		self.start_calibration()?;
		let polls = self.wait_for_lock()?;
		info!("Si5324 locked ({} polls)", polls);
		Ok(())
	}
}

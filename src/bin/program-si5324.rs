#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate tapasco_si5324;
use tapasco_si5324::*;

use std::process::exit;

use tapasco_si5324::axi_iic::{
	IicConfig,
	IicMaster,
	RegisterMap,
};
use tapasco_si5324::ctl::ControlSpace;
use tapasco_si5324::si5324::{
	BringUpConfig,
	Si5324,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

// accepts "0x" prefixed hex or plain decimal
fn parse_number(name: &str, value: &str) -> AResult<u64> {
	let parsed = if value.starts_with("0x") || value.starts_with("0X") {
		u64::from_str_radix(&value[2..], 16)
	} else {
		value.parse::<u64>()
	};
	parsed.map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {:?}: {}", name, value, e);
		e.context(msg).into()
	})
}

fn get_number(matches: &clap::ArgMatches, name: &str, max: u64) -> AResult<Option<u64>> {
	match matches.value_of(name) {
		None => Ok(None),
		Some(v) => {
			let n = parse_number(name, v)?;
			ensure!(n <= max, "invalid parameter {}: {} too big (max 0x{:x})", name, v, max);
			Ok(Some(n))
		},
	}
}

fn get_byte(matches: &clap::ArgMatches, name: &str) -> AResult<u8> {
	match get_number(matches, name, 0xff)? {
		Some(n) => Ok(n as u8),
		None => bail!("missing parameter {}", name),
	}
}

fn with_control_space<F>(matches: &clap::ArgMatches, f: F) -> AResult<()>
where
	F: FnOnce(&mut dyn ControlSpace) -> AResult<()>,
{
	if let Some(path) = matches.value_of("tlkm") {
		let mut space = ctl::DeviceFile::open(path)?;
		return f(&mut space);
	}
	if matches.value_of("device").is_none() {
		bail!("need either --device or --tlkm");
	}
	let ep: pci::PciEndpoint = get_param(matches, "device")?;
	let resource = get_number(matches, "resource", 5)?.unwrap_or(0) as usize;
	with_bar_control_space(ep, resource, |mut space| f(&mut space))
}

fn open_master<'a>(matches: &clap::ArgMatches, space: &'a mut dyn ControlSpace) -> AResult<IicMaster<&'a mut dyn ControlSpace>> {
	let base = get_number(matches, "base", !0u32 as u64)?.unwrap_or(axi_iic::DEFAULT_BASE);
	let config = IicConfig {
		poll_limit: get_number(matches, "poll_limit", !0u32 as u64)?.map(|n| n as usize),
		..IicConfig::default()
	};
	Ok(IicMaster::new(space, RegisterMap::new(base), config))
}

fn list() -> AResult<()> {
	for ep in pci::list_xilinx_endpoints()? {
		println!("{} {}", ep, ep.device()?);
	}
	Ok(())
}

fn status(matches: &clap::ArgMatches) -> AResult<()> {
	with_control_space(matches, |space| {
		let mut iic = open_master(matches, space)?;
		println!("Control: {:?}", iic.control().read()?);
		println!("{}", iic.status()?);
		println!("{}", iic.interrupt_status()?);
		Ok(())
	})
}

fn program(matches: &clap::ArgMatches) -> AResult<()> {
	with_control_space(matches, |space| {
		let iic = open_master(matches, space)?;
		let config = BringUpConfig {
			lock_poll_limit: iic.config().poll_limit,
			..BringUpConfig::default()
		};
		Si5324::new(iic, config).bring_up()
	})
}

fn switch(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let position = get_number(sub_m, "POSITION", 0xff)?;
	with_control_space(matches, |space| {
		let iic = open_master(matches, space)?;
		let mut dev = Si5324::new(iic, BringUpConfig::default());
		if let Some(position) = position {
			dev.set_switch_position(position as u8)?;
		}
		println!("0x{:02x}", dev.switch_position()?);
		Ok(())
	})
}

fn read(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_byte(sub_m, "ADDRESS")?;
	let register = get_byte(sub_m, "REGISTER")?;
	let count = get_byte(sub_m, "COUNT")?;
	with_control_space(matches, |space| {
		let mut iic = open_master(matches, space)?;
		let mut data = vec![0u8; count as usize];
		iic.read_register_full(address, register, &mut data)?;
		for (i, b) in data.iter().enumerate() {
			println!("@{:3}: {:02x}", register as usize + i, b);
		}
		Ok(())
	})
}

fn write(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address = get_byte(sub_m, "ADDRESS")?;
	let register = get_byte(sub_m, "REGISTER")?;
	let mut request = vec![register];
	for v in sub_m.values_of("BYTES").into_iter().flatten() {
		let b = parse_number("BYTES", v)?;
		ensure!(b <= 0xff, "invalid parameter BYTES: {} is not a byte", v);
		request.push(b as u8);
	}
	with_control_space(matches, |space| {
		let mut iic = open_master(matches, space)?;
		if iic.write_register(address, &request)? {
			bail!("Write to 0x{:02x} register {} unsuccessful", address, register);
		}
		Ok(())
	})
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg device: -d --device +takes_value "PCI device with the control BAR ([bus:]slot:dev.fun)")
		(@arg resource: -r --resource +takes_value "BAR number (default 0)")
		(@arg tlkm: -t --tlkm +takes_value conflicts_with[device] "control device file instead of a PCI BAR (e.g. /dev/tlkm_00)")
		(@arg base: -b --base +takes_value "IIC controller base address (default 0x400000)")
		(@arg poll_limit: --("poll-limit") +takes_value "give up waiting after this many polls (default: wait forever)")
		(@subcommand list =>
			(about: "list Xilinx PCI devices")
		)
		(@subcommand status =>
			(about: "show IIC controller control, status and interrupt registers")
		)
		(@subcommand program =>
			(about: "reset, program and calibrate the Si5324 clock")
		)
		(@subcommand switch =>
			(about: "show (or set) the I2C switch position")
			(@arg POSITION: "new switch position")
		)
		(@subcommand read =>
			(about: "read registers from an I2C device")
			(@arg ADDRESS: +required "7-bit I2C address")
			(@arg REGISTER: +required "first register")
			(@arg COUNT: +required "number of bytes")
		)
		(@subcommand write =>
			(about: "write registers of an I2C device")
			(@arg ADDRESS: +required "7-bit I2C address")
			(@arg REGISTER: +required "first register")
			(@arg BYTES: +required +multiple "data bytes")
		)
	).get_matches();

	match matches.subcommand() {
		("list", _) => {
			list()
		}
		("status", _) => {
			status(&matches)
		}
		("program", _) => {
			program(&matches)
		}
		("switch", Some(sub_m)) => {
			switch(&matches, sub_m)
		}
		("read", Some(sub_m)) => {
			read(&matches, sub_m)
		}
		("write", Some(sub_m)) => {
			write(&matches, sub_m)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}

use std::fs;
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};

use super::{
	ControlSpace,
	check_dword_address,
};

/* control space is always little endian */

fn dword_to_bytes(val: u32) -> [u8; 4] {
	[
		val as u8,
		(val >> 8) as u8,
		(val >> 16) as u8,
		(val >> 24) as u8,
	]
}

fn dword_from_bytes(val: [u8; 4]) -> u32 {
	(val[0] as u32)
	| (val[1] as u32) << 8
	| (val[2] as u32) << 16
	| (val[3] as u32) << 24
}

/// Control space exposed by a character device (e.g. `/dev/tlkm_00`),
/// accessed with positioned reads and writes.
pub struct DeviceFile {
	file: fs::File,
	path: PathBuf,
	len: Option<usize>,
}

impl DeviceFile {
	// TODO: exclusive open / file locking?
	pub fn open<P: AsRef<Path>>(path: P) -> crate::AResult<Self> {
		let path = path.as_ref().to_path_buf();
		let file = with_context!(("open control device {}", path.display()), {
			Ok(fs::OpenOptions::new()
				.read(true)
				.write(true)
				.open(&path)?)
		})?;

		// character devices report size 0; only regular files get a bound
		let meta = file.metadata()?;
		let len = if meta.is_file() { Some(meta.len() as usize) } else { None };

		Ok(DeviceFile {
			file,
			path,
			len,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn offset(&self, address: u64) -> crate::AResult<u64> {
		match self.len {
			Some(len) => Ok(check_dword_address(address, len)? as u64),
			None => {
				ensure!(address & 3 == 0, "unaligned control space address 0x{:08x}", address);
				Ok(address)
			},
		}
	}

	fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
		// the device transfers a whole dword or nothing
		let l = self.file.read_at(buf, offset)?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short read from control device"))
		} else {
			Ok(())
		}
	}

	fn write_exact_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
		let l = self.file.write_at(buf, offset)?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::Other, "short write to control device"))
		} else {
			Ok(())
		}
	}
}

impl ControlSpace for DeviceFile {
	fn read_ctl(&mut self, address: u64) -> crate::AResult<u32> {
		let offset = self.offset(address)?;
		let mut buf = [0u8; 4];
		with_context!(("{}: read 0x{:08x}", self.path.display(), address), {
			Ok(self.read_exact_at(&mut buf, offset)?)
		})?;
		let value = dword_from_bytes(buf);
		trace!("{}: read  0x{:08x} -> 0x{:08x}", self.path.display(), address, value);
		Ok(value)
	}

	fn write_ctl(&mut self, address: u64, value: u32) -> crate::AResult<()> {
		let offset = self.offset(address)?;
		trace!("{}: write 0x{:08x} <- 0x{:08x}", self.path.display(), address, value);
		with_context!(("{}: write 0x{:08x}", self.path.display(), address), {
			Ok(self.write_exact_at(&dword_to_bytes(value), offset)?)
		})
	}
}

#[cfg(test)]
mod test {
	use std::env;
	use std::fs;
	use std::process;

	use super::{
		DeviceFile,
		dword_from_bytes,
		dword_to_bytes,
	};
	use crate::ctl::ControlSpace;

	#[test]
	fn little_endian_layout() {
		assert_eq!(dword_to_bytes(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
		assert_eq!(dword_from_bytes([0x0a, 0x00, 0x00, 0x80]), 0x8000_000a);
	}

	#[test]
	fn regular_file_backing() {
		let path = env::temp_dir().join(format!("tapasco-si5324-ctl-{}", process::id()));
		fs::write(&path, vec![0u8; 0x200]).expect("create backing file");

		{
			let mut space = DeviceFile::open(&path).expect("open backing file");
			space.write_ctl(0x104, 0xdead_beef).expect("write in range");
			assert_eq!(space.read_ctl(0x104).expect("read back"), 0xdead_beef);
			assert_eq!(space.read_ctl(0x100).expect("untouched"), 0);
			assert!(space.read_ctl(0x200).is_err());
			assert!(space.write_ctl(0x102, 1).is_err());
		}

		let raw = fs::read(&path).expect("read backing file");
		assert_eq!(&raw[0x104..0x108], &[0xef, 0xbe, 0xad, 0xde]);
		let _ = fs::remove_file(&path);
	}
}

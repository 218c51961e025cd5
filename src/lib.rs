#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod axi_iic;
pub mod ctl;
pub mod pci;
pub mod si5324;

/// Open BAR `resource` of `ep` as control space, enabling the device while `f` runs.
pub fn with_bar_control_space<F, R>(ep: pci::PciEndpoint, resource: usize, f: F) -> AResult<R>
where
	F: FnOnce(ctl::BarControlSpace<pci::MappedResource>) -> AResult<R>,
{
	let _se = ep.scoped_enable()?;
	let bar = with_context!(("PCI {}: map resource {}", ep, resource),
		Ok(pci::open_resource_readwrite(ep, resource)?)
	)?;
	f(ctl::BarControlSpace::new(bar))
}

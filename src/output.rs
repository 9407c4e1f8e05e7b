use std::io::{
	self,
	Write,
};

use crate::pci::Devices;

/// 16 bytes per line, prefixed by the offset of the first byte.
pub fn hexdump<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
	for (i, chunk) in data.chunks(16).enumerate() {
		write!(w, "{:08x} ", i * 16)?;
		for (j, byte) in chunk.iter().enumerate() {
			if 8 == j {
				write!(w, " ")?;
			}
			write!(w, " {:02x}", byte)?;
		}
		writeln!(w)?;
	}
	Ok(())
}

/// One block per device: the device line and its extra info; with
/// `verbose` the decoded control and status words, with a non-zero
/// `dump_size` a hex dump of (at most) that many config space bytes.
pub fn print<W: Write>(w: &mut W, devices: &Devices, verbose: bool, dump_size: usize) -> io::Result<()> {
	for d in devices.iter() {
		writeln!(w, "{}", d)?;
		if verbose {
			if let Some(control) = d.control {
				writeln!(w, "\tControl: {}", control)?;
			}
			if let Some(status) = d.status {
				writeln!(w, "\tStatus: {}", status)?;
			}
		}
		if dump_size > 0 {
			let len = dump_size.min(d.config.len());
			hexdump(w, &d.config[..len])?;
		}
	}
	Ok(())
}

pub fn to_json(devices: &Devices) -> crate::AResult<String> {
	with_context!("couldn't serialize PCI devices",
		Ok(serde_json::to_string_pretty(devices)?)
	)
}

pub fn parse_json(json: &str) -> crate::AResult<Devices> {
	with_context!("couldn't parse PCI devices",
		Ok(serde_json::from_str(json)?)
	)
}

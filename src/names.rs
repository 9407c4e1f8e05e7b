//! Vendor and device names for numeric PCI IDs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::pci::{
	DeviceId,
	VendorId,
};

pub const PCI_IDS_PATH: &str = "/usr/share/misc/pci.ids";

pub trait NameResolver {
	/// Unknown IDs resolve to their numeric representation.
	fn lookup(&self, vendor: VendorId, device: DeviceId) -> (String, String);
}

/// Resolves every ID to its numeric representation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NumericNames;

impl NameResolver for NumericNames {
	fn lookup(&self, vendor: VendorId, device: DeviceId) -> (String, String) {
		(vendor.to_string(), device.to_string())
	}
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
struct Vendor {
	name: String,
	devices: HashMap<u16, String>,
}

/// Name database in the `pci.ids` format.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PciIds {
	vendors: HashMap<u16, Vendor>,
}

fn parse_id_line(line: &str) -> crate::AResult<(u16, &str)> {
	ensure!(line.len() > 4 && line.is_char_boundary(4), "line too short for an ID and a name: {:?}", line);
	let (id, name) = line.split_at(4);
	let id = with_context!(("invalid ID {:?}", id),
		Ok(u16::from_str_radix(id, 16)?)
	)?;
	Ok((id, name.trim()))
}

impl PciIds {
	pub fn load(path: &Path) -> crate::AResult<PciIds> {
		let content = with_context!(("couldn't read PCI ID database {:?}", path),
			Ok(fs::read_to_string(path)?)
		)?;
		with_context!(("invalid PCI ID database {:?}", path),
			PciIds::parse(&content)
		)
	}

	/// Reads vendor and device lines; subsystem lines and the trailing
	/// device class sections are skipped.
	pub fn parse(content: &str) -> crate::AResult<PciIds> {
		let mut vendors: HashMap<u16, Vendor> = HashMap::new();
		let mut current: Option<u16> = None;

		for (lineno, line) in content.lines().enumerate() {
			if line.trim().is_empty() || line.starts_with('#') {
				continue;
			}
			if line.starts_with("C ") {
				// device classes; always the last section
				break;
			}
			if line.starts_with("\t\t") {
				continue;
			}

			with_context!(("line {}", lineno + 1), {
				if line.starts_with('\t') {
					let vendor_id = match current {
						Some(v) => v,
						None => bail!("device without vendor: {:?}", line),
					};
					let (device_id, name) = parse_id_line(&line[1..])?;
					if let Some(vendor) = vendors.get_mut(&vendor_id) {
						vendor.devices.insert(device_id, name.to_owned());
					}
				} else {
					let (vendor_id, name) = parse_id_line(line)?;
					vendors.insert(vendor_id, Vendor {
						name: name.to_owned(),
						devices: HashMap::new(),
					});
					current = Some(vendor_id);
				}
				Ok(())
			})?;
		}

		Ok(PciIds { vendors })
	}

	pub fn vendor_count(&self) -> usize {
		self.vendors.len()
	}
}

impl NameResolver for PciIds {
	fn lookup(&self, vendor: VendorId, device: DeviceId) -> (String, String) {
		match self.vendors.get(&vendor.0) {
			None => (vendor.to_string(), device.to_string()),
			Some(v) => {
				let device_name = v.devices.get(&device.0).cloned().unwrap_or_else(|| device.to_string());
				(v.name.clone(), device_name)
			},
		}
	}
}

use std::fmt;
use std::ops::{
	Deref,
	DerefMut,
};

use serde::{
	Deserialize,
	Serialize,
};

use super::Device;
use crate::PciError;
use crate::names::NameResolver;

/// Devices in enumeration order.
///
/// Membership is fixed once enumerated; the devices themselves can be
/// modified through `DerefMut`.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Devices(Vec<Device>);

impl Devices {
	pub(crate) fn new(devices: Vec<Device>) -> Self {
		Devices(devices)
	}

	pub fn set_vendor_device_name(&mut self, names: &dyn NameResolver) {
		for d in self.0.iter_mut() {
			d.resolve_name(names);
		}
	}

	/// Reads the register from every device; stops at the first failure.
	pub fn read_config_register(&self, offset: u64, bits: u32) -> Result<Vec<u64>, PciError> {
		self.0.iter().map(|d| d.read_register(offset, bits)).collect()
	}

	/// Writes the register on every device; stops at the first failure.
	pub fn write_config_register(&self, offset: u64, bits: u32, value: u64) -> Result<(), PciError> {
		for d in &self.0 {
			d.write_register(offset, bits, value)?;
		}
		Ok(())
	}
}

impl Deref for Devices {
	type Target = [Device];

	fn deref(&self) -> &[Device] {
		&self.0
	}
}

impl DerefMut for Devices {
	fn deref_mut(&mut self) -> &mut [Device] {
		&mut self.0
	}
}

impl fmt::Display for Devices {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for d in &self.0 {
			writeln!(f, "{}", d)?;
		}
		Ok(())
	}
}

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{
	Deserialize,
	Serialize,
};

use super::config_space::{
	self,
	ConfigSpaceReadOnly,
	Width,
};
use super::header::{
	COMMAND_OFFSET,
	Control,
	DEVICE_ID_OFFSET,
	STATUS_OFFSET,
	Status,
	VENDOR_ID_OFFSET,
};
use super::linux;
use crate::PciError;
use crate::names::NameResolver;

/// Size of the standard header every user may read through sysfs.
pub const UNPRIVILEGED_CONFIG_SIZE: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub u16);

impl fmt::Display for VendorId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:04x}", self.0)
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u16);

impl fmt::Display for DeviceId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:04x}", self.0)
	}
}

fn le_u16(data: &[u8], offset: usize) -> u16 {
	u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// A PCI device backed by a directory in the device filesystem.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Device {
	pub address: String,
	pub vendor: VendorId,
	pub device: DeviceId,
	pub vendor_name: String,
	pub device_name: String,
	pub full_path: PathBuf,
	/// Lines appended by later processing (register reads); shown in order.
	#[serde(default)]
	pub extra_info: Vec<String>,
	#[serde(default)]
	pub config: Vec<u8>,
	// only known once at least 8 bytes of config space were captured
	#[serde(default)]
	pub control: Option<Control>,
	#[serde(default)]
	pub status: Option<Status>,
}

impl Device {
	/// Reads vendor and device ID from the first 4 bytes of config space;
	/// names start out as the numeric IDs.
	pub fn open(address: String, full_path: PathBuf) -> io::Result<Device> {
		let mut id = [0u8; 4];
		linux::open_config_space_readonly(&full_path)?.read_exact_at(0, &mut id)?;
		let vendor = VendorId(le_u16(&id, VENDOR_ID_OFFSET));
		let device = DeviceId(le_u16(&id, DEVICE_ID_OFFSET));

		Ok(Device {
			address,
			vendor,
			device,
			vendor_name: vendor.to_string(),
			device_name: device.to_string(),
			full_path,
			extra_info: Vec::new(),
			config: Vec::new(),
			control: None,
			status: None,
		})
	}

	pub fn config_path(&self) -> PathBuf {
		self.full_path.join("config")
	}

	/// Reads up to `max_bytes` of config space.
	///
	/// Asking for more than the standard header but getting at most the
	/// header fails with `PermissionLikely`; the kernel silently truncates
	/// reads for unprivileged users.
	pub fn capture_config(&mut self, max_bytes: usize) -> Result<(), PciError> {
		let (mut config, size) = linux::open_config_space_readonly(&self.full_path)
			.and_then(|space| Ok((space.read_into_vec()?, space.len())))
			.map_err(|cause| PciError::Enumeration {
				path: self.config_path(),
				cause,
			})?;

		if max_bytes > UNPRIVILEGED_CONFIG_SIZE && config.len() <= UNPRIVILEGED_CONFIG_SIZE {
			return Err(PciError::PermissionLikely {
				path: self.config_path(),
				wanted: max_bytes,
				read: config.len(),
			});
		}
		config.truncate(max_bytes);

		if config.len() >= STATUS_OFFSET + 2 {
			self.control = Some(Control(le_u16(&config, COMMAND_OFFSET)));
			self.status = Some(Status(le_u16(&config, STATUS_OFFSET)));
		} else {
			self.control = None;
			self.status = None;
		}
		debug!("PCI {}: captured {} of {} bytes of config space", self.address, config.len(), size);
		self.config = config;
		Ok(())
	}

	pub fn resolve_name(&mut self, names: &dyn NameResolver) {
		let (vendor_name, device_name) = names.lookup(self.vendor, self.device);
		self.vendor_name = vendor_name;
		self.device_name = device_name;
	}

	/// `bits` must be one of 8, 16, 32 or 64; config space is opened only
	/// for valid widths.
	pub fn read_register(&self, offset: u64, bits: u32) -> Result<u64, PciError> {
		let width = Width::from_bits(bits)?;
		let space = linux::open_config_space_readonly(&self.full_path)
			.map_err(|cause| self.open_error(offset, width, cause))?;
		config_space::read_register(&space, offset, width)
	}

	pub fn write_register(&self, offset: u64, bits: u32, value: u64) -> Result<(), PciError> {
		let width = Width::from_bits(bits)?;
		let mut space = linux::open_config_space_writeonly(&self.full_path)
			.map_err(|cause| self.open_error(offset, width, cause))?;
		config_space::write_register(&mut space, offset, width, value)
	}

	fn open_error(&self, offset: u64, width: Width, cause: io::Error) -> PciError {
		PciError::Access {
			path: self.config_path(),
			offset,
			width: width.bits(),
			cause,
		}
	}
}

impl fmt::Display for Device {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}: {} {}", self.address, self.vendor_name, self.device_name)?;
		for line in &self.extra_info {
			write!(f, "\n{}", line)?;
		}
		Ok(())
	}
}

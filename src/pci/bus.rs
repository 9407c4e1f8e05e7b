use std::fs;
use std::io;
use std::path::{
	Path,
	PathBuf,
};

use super::{
	Device,
	Devices,
};
use crate::PciError;
use crate::names::NameResolver;

/// Decides whether an enumerated device is kept; evaluated before any
/// config space capture.
pub type Filter<'a> = &'a dyn Fn(&Device) -> bool;

pub struct BusReader<'n> {
	root: PathBuf,
	conf_size: usize,
	names: &'n dyn NameResolver,
}

impl<'n> BusReader<'n> {
	/// `conf_size` bytes of config space are captured per device (0: none);
	/// `names` is used for devices with captured config space.
	pub fn new<P: Into<PathBuf>>(root: P, conf_size: usize, names: &'n dyn NameResolver) -> Self {
		BusReader {
			root: root.into(),
			conf_size,
			names,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Lists all devices below the root in directory order.
	///
	/// Any failure aborts the whole enumeration.
	pub fn read(&self, filters: &[Filter]) -> Result<Devices, PciError> {
		let enumeration_error = |cause: io::Error| PciError::Enumeration {
			path: self.root.clone(),
			cause,
		};

		let mut devices = Vec::new();
		'entries: for entry in fs::read_dir(&self.root).map_err(enumeration_error)? {
			let entry = entry.map_err(enumeration_error)?;
			let full_path = entry.path();
			let address = entry.file_name().into_string().map_err(|e| {
				enumeration_error(io::Error::new(io::ErrorKind::InvalidData, format!("Invalid (Non-UTF8) PCI device name {:?}", e)))
			})?;

			let mut device = Device::open(address, full_path.clone()).map_err(|cause| PciError::Enumeration {
				path: full_path,
				cause,
			})?;

			for f in filters {
				if !f(&device) {
					trace!("PCI {}: filtered", device.address);
					continue 'entries;
				}
			}

			if self.conf_size > 0 {
				device.capture_config(self.conf_size)?;
				device.resolve_name(self.names);
			}

			debug!("PCI {}: {} {}", device.address, device.vendor, device.device);
			devices.push(device);
		}

		Ok(Devices::new(devices))
	}
}

/// Filter on device addresses: comma separated glob patterns supporting
/// `*` and `?`, a device matches if any pattern does.
pub fn address_glob(patterns: &str) -> impl Fn(&Device) -> bool {
	let patterns: Vec<String> = patterns.split(',').map(str::to_owned).collect();
	move |d: &Device| patterns.iter().any(|p| glob_match(p.as_bytes(), d.address.as_bytes()))
}

fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
	// position after the last '*' and the text position it was tried at
	let mut star: Option<(usize, usize)> = None;
	let (mut p, mut t) = (0, 0);
	while t < text.len() {
		if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
			p += 1;
			t += 1;
		} else if p < pattern.len() && pattern[p] == b'*' {
			p += 1;
			star = Some((p, t));
		} else if let Some((sp, st)) = star {
			p = sp;
			t = st + 1;
			star = Some((sp, st + 1));
		} else {
			return false;
		}
	}
	pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod test {
	use std::fs;

	use super::{
		BusReader,
		Filter,
		address_glob,
		glob_match,
	};
	use crate::PciError;
	use crate::names::NumericNames;
	use crate::testutil::{
		FakeBus,
		config_header,
	};

	fn fake_bus(name: &str, config_len: usize) -> FakeBus {
		let bus = FakeBus::new(name);
		bus.add_device("0000:00:00.0", &config_header(0x8086, 0x1237, config_len));
		bus.add_device("0000:00:01.0", &config_header(0x8086, 0x7000, config_len));
		bus.add_device("0000:00:02.0", &config_header(0x1234, 0x1111, config_len));
		bus.add_device("0000:01:00.0", &config_header(0x1af4, 0x1000, config_len));
		bus
	}

	fn listing(bus: &FakeBus) -> Vec<String> {
		fs::read_dir(bus.root()).unwrap()
			.map(|e| e.unwrap().file_name().into_string().unwrap())
			.collect()
	}

	#[test]
	fn no_filters_lists_everything_in_order() {
		let bus = fake_bus("no_filters", 64);
		let reader = BusReader::new(bus.root(), 0, &NumericNames);
		let devices = reader.read(&[]).unwrap();
		let addresses: Vec<String> = devices.iter().map(|d| d.address.clone()).collect();
		assert_eq!(addresses, listing(&bus));
		for d in devices.iter() {
			assert_eq!(d.full_path, bus.root().join(&d.address));
			assert!(d.config.is_empty());
		}
	}

	#[test]
	fn rejecting_filter_skips_capture() {
		// capturing 4096 bytes of a 40 byte config space would fail
		let bus = fake_bus("rejecting_filter", 40);
		let reader = BusReader::new(bus.root(), 4096, &NumericNames);
		let reject = |_: &crate::pci::Device| false;
		let devices = reader.read(&[&reject]).unwrap();
		assert!(devices.is_empty());

		match reader.read(&[]) {
			Err(PciError::PermissionLikely { .. }) => (),
			r => panic!("expected PermissionLikely, got {:?}", r),
		}
	}

	#[test]
	fn filters_short_circuit() {
		let bus = fake_bus("filters_short_circuit", 64);
		let reader = BusReader::new(bus.root(), 48, &NumericNames);
		let intel = |d: &crate::pci::Device| d.vendor.0 == 0x8086;
		let host_bridge = |d: &crate::pci::Device| {
			assert_eq!(d.vendor.0, 0x8086, "must not be called after a failed filter");
			d.device.0 == 0x1237
		};
		let filters: [Filter; 2] = [&intel, &host_bridge];
		let devices = reader.read(&filters).unwrap();
		assert_eq!(devices.len(), 1);
		assert_eq!(devices[0].address, "0000:00:00.0");
		assert_eq!(devices[0].config.len(), 48);
		assert_eq!(devices[0].vendor_name, "8086");
	}

	#[test]
	fn address_filter() {
		let bus = fake_bus("address_filter", 64);
		let reader = BusReader::new(bus.root(), 0, &NumericNames);
		let glob = address_glob("0000:00:0?.0,*:01:*");
		let mut addresses: Vec<String> = reader.read(&[&glob]).unwrap().iter().map(|d| d.address.clone()).collect();
		addresses.sort();
		assert_eq!(addresses, vec!["0000:00:00.0", "0000:00:01.0", "0000:00:02.0", "0000:01:00.0"]);

		let glob = address_glob("*:00:01.*");
		let devices = reader.read(&[&glob]).unwrap();
		assert_eq!(devices.len(), 1);
		assert_eq!(devices[0].address, "0000:00:01.0");
	}

	#[test]
	fn missing_root_fails() {
		let bus = FakeBus::new("missing_root");
		let reader = BusReader::new(bus.root().join("nope"), 0, &NumericNames);
		match reader.read(&[]) {
			Err(PciError::Enumeration { path, .. }) => assert_eq!(path, bus.root().join("nope")),
			r => panic!("expected enumeration error, got {:?}", r),
		}
	}

	#[test]
	fn broken_device_fails_everything() {
		let bus = fake_bus("broken_device", 64);
		fs::create_dir(bus.root().join("0000:02:00.0")).unwrap();
		let reader = BusReader::new(bus.root(), 0, &NumericNames);
		match reader.read(&[]) {
			Err(PciError::Enumeration { path, .. }) => assert_eq!(path, bus.root().join("0000:02:00.0")),
			r => panic!("expected enumeration error, got {:?}", r),
		}
	}

	#[test]
	fn globs() {
		assert!(glob_match(b"*", b""));
		assert!(glob_match(b"*", b"0000:00:1f.3"));
		assert!(glob_match(b"0000:00:1f.?", b"0000:00:1f.3"));
		assert!(glob_match(b"*1f*", b"0000:00:1f.3"));
		assert!(glob_match(b"0000:*:*.0", b"0000:03:00.0"));
		assert!(!glob_match(b"0000:*:*.0", b"0000:03:00.1"));
		assert!(!glob_match(b"?", b""));
		assert!(!glob_match(b"0000:00:1f", b"0000:00:1f.3"));
		assert!(glob_match(b"**.3", b"0000:00:1f.3"));
	}
}

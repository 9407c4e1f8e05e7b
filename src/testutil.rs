// fake device filesystem and in-memory config spaces for tests

use std::fs;
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};
use std::sync::atomic::{
	AtomicUsize,
	Ordering,
};

use crate::pci::{
	ConfigSpace,
	ConfigSpaceReadOnly,
};

static NEXT_BUS: AtomicUsize = AtomicUsize::new(0);

/// Standard header with IDs, command 0x0007 and status 0x0010, zero
/// filled (or cut) to `len` bytes.
pub fn config_header(vendor: u16, device: u16, len: usize) -> Vec<u8> {
	let mut config = vec![0u8; len.max(8)];
	config[0..2].copy_from_slice(&vendor.to_le_bytes());
	config[2..4].copy_from_slice(&device.to_le_bytes());
	config[4..6].copy_from_slice(&0x0007u16.to_le_bytes());
	config[6..8].copy_from_slice(&0x0010u16.to_le_bytes());
	config.truncate(len);
	config
}

/// Temporary directory laid out like `/sys/bus/pci/devices`; removed on drop.
pub struct FakeBus {
	root: PathBuf,
}

impl FakeBus {
	pub fn new(name: &str) -> FakeBus {
		let root = std::env::temp_dir().join(format!(
			"pcitool-test-{}-{}-{}",
			std::process::id(),
			NEXT_BUS.fetch_add(1, Ordering::SeqCst),
			name,
		));
		let _ = fs::remove_dir_all(&root);
		fs::create_dir_all(&root).unwrap();
		FakeBus { root }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn add_device(&self, address: &str, config: &[u8]) -> PathBuf {
		let path = self.root.join(address);
		fs::create_dir(&path).unwrap();
		fs::write(path.join("config"), config).unwrap();
		path
	}

	pub fn read_config(&self, address: &str) -> Vec<u8> {
		fs::read(self.root.join(address).join("config")).unwrap()
	}

	pub fn fill_config(&self, address: &str, offset: u64, data: &[u8]) {
		let f = fs::OpenOptions::new().write(true).open(self.root.join(address).join("config")).unwrap();
		f.write_all_at(data, offset).unwrap();
	}
}

impl Drop for FakeBus {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.root);
	}
}

pub struct MemorySpace {
	path: PathBuf,
	pub data: Vec<u8>,
}

impl MemorySpace {
	pub fn new(len: usize) -> MemorySpace {
		MemorySpace {
			path: PathBuf::from("memory"),
			data: vec![0u8; len],
		}
	}

	fn range(&self, offset: u64, len: usize) -> io::Result<std::ops::Range<usize>> {
		let start = offset as usize;
		if start + len > self.data.len() {
			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "out of range"));
		}
		Ok(start..start + len)
	}
}

impl ConfigSpaceReadOnly for MemorySpace {
	fn path(&self) -> &Path {
		&self.path
	}

	fn len(&self) -> usize {
		self.data.len()
	}

	fn read_exact_at(&self, offset: u64, target: &mut [u8]) -> io::Result<()> {
		let range = self.range(offset, target.len())?;
		target.copy_from_slice(&self.data[range]);
		Ok(())
	}

	fn read_into_vec(&self) -> io::Result<Vec<u8>> {
		Ok(self.data.clone())
	}
}

impl ConfigSpace for MemorySpace {
	fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
		let range = self.range(offset, data.len())?;
		self.data[range].copy_from_slice(data);
		Ok(())
	}
}

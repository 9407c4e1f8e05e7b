use std::io;
use std::path::Path;

use super::File;
use crate::pci::config_space;

impl config_space::ConfigSpaceReadOnly for File {
	fn path(&self) -> &Path {
		File::path(self)
	}

	fn len(&self) -> usize {
		File::len(self)
	}

	fn read_exact_at(&self, offset: u64, target: &mut [u8]) -> io::Result<()> {
		File::read_exact_at(self, offset, target)
	}

	fn read_into_vec(&self) -> io::Result<Vec<u8>> {
		File::read_into_vec(self)
	}
}

impl config_space::ConfigSpace for File {
	fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
		File::write_all_at(self, offset, data)
	}
}

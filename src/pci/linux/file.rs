use std::fs;
use std::io::{
	self,
	Read,
};
use std::os::unix::fs::FileExt;
use std::path::{
	Path,
	PathBuf,
};

pub struct File {
	file: fs::File,
	len: usize,
	path: PathBuf,
}

impl File {
	pub fn path(&self) -> &Path {
		&self.path
	}

	// sysfs reports the full config space size here, even when reading
	// is restricted to the header
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
		// reading should get all data in one step (in this case)
		let l = self.file.read_at(buf, offset)?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::UnexpectedEof, "failed to fill whole buffer"))
		} else {
			Ok(())
		}
	}

	pub fn write_all_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
		// writing should push all data in one step (in this case)
		let l = self.file.write_at(buf, offset)?;
		if l != buf.len() {
			Err(io::Error::new(io::ErrorKind::WriteZero, "failed to write whole buffer"))
		} else {
			Ok(())
		}
	}

	pub fn read_into_vec(&self) -> io::Result<Vec<u8>> {
		let mut v = Vec::with_capacity(self.len);
		(&self.file).read_to_end(&mut v)?;
		Ok(v)
	}
}

/// Opens read-only, or write-only if `writable` is set.
pub fn inner_open(path: PathBuf, writable: bool) -> io::Result<File> {
	let file = fs::OpenOptions::new()
		.read(!writable)
		.write(writable)
		.open(&path)?;

	let size = file.metadata()?.len();
	assert!(size < !0usize as u64);
	let len = size as usize;

	Ok(File {
		file,
		len,
		path,
	})
}

use std::io;
use std::path::Path;

use crate::PciError;

/// Access width of a single config space register.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Width {
	Byte,
	Word,
	Dword,
	Qword,
}

impl Width {
	pub fn from_bits(bits: u32) -> Result<Width, PciError> {
		match bits {
			8 => Ok(Width::Byte),
			16 => Ok(Width::Word),
			32 => Ok(Width::Dword),
			64 => Ok(Width::Qword),
			width => Err(PciError::InvalidWidth { width }),
		}
	}

	pub fn bits(self) -> u32 {
		match self {
			Width::Byte => 8,
			Width::Word => 16,
			Width::Dword => 32,
			Width::Qword => 64,
		}
	}

	pub fn bytes(self) -> usize {
		self.bits() as usize / 8
	}

	/// largest value representable in this width
	pub fn max_value(self) -> u64 {
		!0u64 >> (64 - self.bits())
	}
}

pub trait ConfigSpaceReadOnly {
	fn path(&self) -> &Path;
	fn len(&self) -> usize;

	fn read_exact_at(&self, offset: u64, target: &mut [u8]) -> io::Result<()>;
	// reads everything available; may be less than `len()` without privileges
	fn read_into_vec(&self) -> io::Result<Vec<u8>>;
}

pub trait ConfigSpace: ConfigSpaceReadOnly {
	fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;
}

fn access_error(path: &Path, offset: u64, width: Width, cause: io::Error) -> PciError {
	PciError::Access {
		path: path.to_path_buf(),
		offset,
		width: width.bits(),
		cause,
	}
}

/* PCI is always little endian */

pub fn read_register<S>(space: &S, offset: u64, width: Width) -> Result<u64, PciError>
where
	S: ?Sized + ConfigSpaceReadOnly,
{
	let mut buf = [0u8; 8];
	space.read_exact_at(offset, &mut buf[..width.bytes()])
		.map_err(|e| access_error(space.path(), offset, width, e))?;
	trace!("read {:?} @0x{:x} ({}-bit): {:02x?}", space.path(), offset, width.bits(), &buf[..width.bytes()]);
	Ok(u64::from_le_bytes(buf))
}

/// Bits of `value` above `width` are dropped.
pub fn write_register<S>(space: &mut S, offset: u64, width: Width, value: u64) -> Result<(), PciError>
where
	S: ?Sized + ConfigSpace,
{
	let buf = value.to_le_bytes();
	trace!("write {:?} @0x{:x} ({}-bit): {:02x?}", space.path(), offset, width.bits(), &buf[..width.bytes()]);
	space.write_all_at(offset, &buf[..width.bytes()])
		.map_err(|e| access_error(space.path(), offset, width, e))
}

#[cfg(test)]
mod test {
	use super::{
		Width,
		read_register,
		write_register,
	};
	use crate::PciError;
	use crate::testutil::MemorySpace;

	#[test]
	fn widths() {
		for &bits in &[8, 16, 32, 64] {
			assert_eq!(Width::from_bits(bits).unwrap().bits(), bits);
		}
		for &bits in &[0, 1, 7, 12, 24, 48, 65, 128] {
			match Width::from_bits(bits) {
				Err(PciError::InvalidWidth { width }) => assert_eq!(width, bits),
				r => panic!("width {} must be rejected, got {:?}", bits, r),
			}
		}
		assert_eq!(Width::Byte.max_value(), 0xff);
		assert_eq!(Width::Word.max_value(), 0xffff);
		assert_eq!(Width::Dword.max_value(), 0xffff_ffff);
		assert_eq!(Width::Qword.max_value(), !0);
	}

	#[test]
	fn write_then_read_back() {
		let mut space = MemorySpace::new(64);
		for &(width, value) in &[
			(Width::Byte, 0xa5u64),
			(Width::Word, 0xbeef),
			(Width::Dword, 0xdead_beef),
			(Width::Qword, 0x0123_4567_89ab_cdef),
		] {
			write_register(&mut space, 0x11, width, value).unwrap();
			assert_eq!(read_register(&space, 0x11, width).unwrap(), value, "{:?}", width);
		}
	}

	#[test]
	fn little_endian_layout() {
		let mut space = MemorySpace::new(16);
		write_register(&mut space, 4, Width::Dword, 0x1122_3344).unwrap();
		assert_eq!(&space.data[4..8], &[0x44, 0x33, 0x22, 0x11]);
		assert_eq!(read_register(&space, 4, Width::Word).unwrap(), 0x3344);
		assert_eq!(read_register(&space, 6, Width::Byte).unwrap(), 0x22);
	}

	#[test]
	fn write_masks_to_width() {
		let mut space = MemorySpace::new(8);
		write_register(&mut space, 0, Width::Byte, 0x1ff).unwrap();
		assert_eq!(space.data, vec![0xff, 0, 0, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn short_read_is_access_error() {
		let space = MemorySpace::new(6);
		match read_register(&space, 4, Width::Dword) {
			Err(PciError::Access { offset, width, .. }) => {
				assert_eq!(offset, 4);
				assert_eq!(width, 32);
			},
			r => panic!("expected access error, got {:?}", r),
		}
	}
}

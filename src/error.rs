use std::io;
use std::path::PathBuf;

use failure::Fail;

#[derive(Debug, Fail)]
pub enum PciError {
	/// Listing the device filesystem (or reading a device's identity) failed;
	/// the whole enumeration is aborted.
	#[fail(display = "couldn't enumerate PCI devices at {:?}: {}", path, cause)]
	Enumeration {
		path: PathBuf,
		#[cause]
		cause: io::Error,
	},

	/// More than the standard header was requested, but the kernel only
	/// handed out the unprivileged part of config space.
	#[fail(display = "read {:?} for {} bytes, but only got {} (do you need to be root?)", path, wanted, read)]
	PermissionLikely {
		path: PathBuf,
		wanted: usize,
		read: usize,
	},

	#[fail(display = "{} is not a valid register width: only options are 8, 16, 32, 64", width)]
	InvalidWidth {
		width: u32,
	},

	#[fail(display = "couldn't access {}-bit register at 0x{:x} in {:?}: {}", width, offset, path, cause)]
	Access {
		path: PathBuf,
		offset: u64,
		width: u32,
		#[cause]
		cause: io::Error,
	},

	#[fail(display = "{:?}: {}", command, reason)]
	CommandSyntax {
		command: String,
		reason: String,
	},
}

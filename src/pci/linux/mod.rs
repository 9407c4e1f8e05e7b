use std::io;
use std::path::Path;

mod config_space;
mod file;

use self::file::File;

use crate::pci::{
	ConfigSpace,
	ConfigSpaceReadOnly,
};

pub const DEVICES_ROOT: &str = "/sys/bus/pci/devices";

/// `device_path` is the per-device directory, e.g. `/sys/bus/pci/devices/0000:00:00.0`
pub fn open_config_space_readonly(device_path: &Path) -> io::Result<impl ConfigSpaceReadOnly> {
	file::inner_open(device_path.join("config"), false)
}

/// The returned handle is opened write-only; reads through it fail.
pub fn open_config_space_writeonly(device_path: &Path) -> io::Result<impl ConfigSpace> {
	file::inner_open(device_path.join("config"), true)
}

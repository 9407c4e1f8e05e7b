mod bus;
mod config_space;
mod device;
mod devices;
mod header;
mod linux;

pub use self::bus::{
	BusReader,
	Filter,
	address_glob,
};

pub use self::config_space::{
	ConfigSpace,
	ConfigSpaceReadOnly,
	Width,
	read_register,
	write_register,
};

pub use self::device::{
	Device,
	DeviceId,
	UNPRIVILEGED_CONFIG_SIZE,
	VendorId,
};

pub use self::devices::Devices;

pub use self::header::{
	Control,
	DevselTiming,
	Status,
};

// OS-specific. for now linux only.
pub use self::linux::{
	DEVICES_ROOT,
	open_config_space_readonly,
	open_config_space_writeonly,
};

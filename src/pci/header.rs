use std::fmt;

use serde::{
	Deserialize,
	Serialize,
};

// standard header offsets
pub const VENDOR_ID_OFFSET: usize = 0x00;
pub const DEVICE_ID_OFFSET: usize = 0x02;
pub const COMMAND_OFFSET: usize = 0x04;
pub const STATUS_OFFSET: usize = 0x06;

// Command register
const COMMAND_IO_SPACE:          u16 = 0x0001;
const COMMAND_MEMORY_SPACE:      u16 = 0x0002;
const COMMAND_BUS_MASTER:        u16 = 0x0004;
const COMMAND_SPECIAL_CYCLES:    u16 = 0x0008;
const COMMAND_MEMORY_WINV:       u16 = 0x0010;
const COMMAND_VGA_SNOOP:         u16 = 0x0020;
const COMMAND_PARITY_ERROR:      u16 = 0x0040;
const COMMAND_STEPPING:          u16 = 0x0080;
const COMMAND_SERR:              u16 = 0x0100;
const COMMAND_FAST_BACK_TO_BACK: u16 = 0x0200;
const COMMAND_INTX_DISABLE:      u16 = 0x0400;

// Status register
const STATUS_INTX:                  u16 = 0x0008;
const STATUS_CAPABILITIES:          u16 = 0x0010;
const STATUS_66MHZ:                 u16 = 0x0020;
const STATUS_UDF:                   u16 = 0x0040;
const STATUS_FAST_BACK_TO_BACK:     u16 = 0x0080;
const STATUS_MASTER_PARITY_ERROR:   u16 = 0x0100;
const STATUS_DEVSEL_SHIFT:          u8 = 9;
const STATUS_DEVSEL_MASK:           u16 = 0x0600;
const STATUS_SIGNALED_TARGET_ABORT: u16 = 0x0800;
const STATUS_RECEIVED_TARGET_ABORT: u16 = 0x1000;
const STATUS_RECEIVED_MASTER_ABORT: u16 = 0x2000;
const STATUS_SIGNALED_SYSTEM_ERROR: u16 = 0x4000;
const STATUS_DETECTED_PARITY_ERROR: u16 = 0x8000;

fn flag(f: &mut fmt::Formatter, first: &mut bool, name: &str, set: bool) -> fmt::Result {
	if !*first {
		write!(f, " ")?;
	}
	*first = false;
	write!(f, "{}{}", name, if set { '+' } else { '-' })
}

/// Command register: how the device responds to bus operations (the 3rd 16-bit word).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Control(pub u16);

impl fmt::Display for Control {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut first = true;
		for &(name, mask) in &[
			("I/O", COMMAND_IO_SPACE),
			("Mem", COMMAND_MEMORY_SPACE),
			("BusMaster", COMMAND_BUS_MASTER),
			("SpecCycle", COMMAND_SPECIAL_CYCLES),
			("MemWINV", COMMAND_MEMORY_WINV),
			("VGASnoop", COMMAND_VGA_SNOOP),
			("ParErr", COMMAND_PARITY_ERROR),
			("Stepping", COMMAND_STEPPING),
			("SERR", COMMAND_SERR),
			("FastB2B", COMMAND_FAST_BACK_TO_BACK),
			("DisINTx", COMMAND_INTX_DISABLE),
		] {
			flag(f, &mut first, name, 0 != self.0 & mask)?;
		}
		Ok(())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum DevselTiming {
	Fast,
	Medium,
	Slow,
	Reserved,
}

impl fmt::Display for DevselTiming {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			DevselTiming::Fast => "fast",
			DevselTiming::Medium => "medium",
			DevselTiming::Slow => "slow",
			DevselTiming::Reserved => "??",
		})
	}
}

/// Status register: state reported by the device (the 4th 16-bit word).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub u16);

impl Status {
	pub fn devsel_timing(&self) -> DevselTiming {
		match (self.0 & STATUS_DEVSEL_MASK) >> STATUS_DEVSEL_SHIFT {
			0 => DevselTiming::Fast,
			1 => DevselTiming::Medium,
			2 => DevselTiming::Slow,
			3 => DevselTiming::Reserved,
			_ => unreachable!(),
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut first = true;
		for &(name, mask) in &[
			("Cap", STATUS_CAPABILITIES),
			("66MHz", STATUS_66MHZ),
			("UDF", STATUS_UDF),
			("FastB2B", STATUS_FAST_BACK_TO_BACK),
			("ParErr", STATUS_MASTER_PARITY_ERROR),
		] {
			flag(f, &mut first, name, 0 != self.0 & mask)?;
		}
		write!(f, " DEVSEL={}", self.devsel_timing())?;
		for &(name, mask) in &[
			(">TAbort", STATUS_SIGNALED_TARGET_ABORT),
			("<TAbort", STATUS_RECEIVED_TARGET_ABORT),
			("<MAbort", STATUS_RECEIVED_MASTER_ABORT),
			(">SERR", STATUS_SIGNALED_SYSTEM_ERROR),
			("<PERR", STATUS_DETECTED_PARITY_ERROR),
			("INTx", STATUS_INTX),
		] {
			flag(f, &mut first, name, 0 != self.0 & mask)?;
		}
		Ok(())
	}
}

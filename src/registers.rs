//! Register commands: `OFFSET[.SIZE][=VALUE]`
//!
//! OFFSET and VALUE accept decimal, `0x` hexadecimal and `0` octal numbers.
//! SIZE is one of `b` (8 bit), `w` (16 bit) or `l` (32 bit, the default).
//! Without VALUE the register is read from all devices and the result
//! appended to their extra info; with VALUE it is written to all devices.

use std::str;

use crate::PciError;
use crate::pci::{
	Devices,
	Width,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RegisterCommand {
	pub offset: u16,
	pub width: Width,
	/// Present for writes.
	pub value: Option<u64>,
}

fn syntax_error(command: &str, reason: String) -> PciError {
	PciError::CommandSyntax {
		command: command.to_owned(),
		reason,
	}
}

/// Parses an unsigned number with C-like base prefix that fits in `width`.
fn parse_unsigned(s: &str, width: Width) -> Result<u64, String> {
	let (digits, radix) = if s.starts_with("0x") || s.starts_with("0X") {
		(&s[2..], 16)
	} else if s.len() > 1 && s.starts_with('0') {
		(&s[1..], 8)
	} else {
		(s, 10)
	};
	// from_str_radix would accept a sign
	if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
		return Err(format!("invalid number {:?}", s));
	}
	let value = u64::from_str_radix(digits, radix).map_err(|e| format!("invalid number {:?}: {}", s, e))?;
	if value > width.max_value() {
		return Err(format!("{:?} doesn't fit in {} bits", s, width.bits()));
	}
	Ok(value)
}

impl RegisterCommand {
	pub fn is_write(&self) -> bool {
		self.value.is_some()
	}

	/// Renders a value read by this command as `OFFSET:VALUE`; 64-bit
	/// values are not rendered.
	pub fn format_read(&self, value: u64) -> Option<String> {
		match self.width {
			Width::Byte => Some(format!("{:08x}:{:02x}", self.offset, value)),
			Width::Word => Some(format!("{:08x}:{:04x}", self.offset, value)),
			Width::Dword => Some(format!("{:08x}:{:08x}", self.offset, value)),
			Width::Qword => None,
		}
	}
}

impl str::FromStr for RegisterCommand {
	type Err = PciError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut register_value = s.split('=');
		let register = register_value.next().unwrap_or("");
		let value = register_value.next();
		if register_value.next().is_some() {
			return Err(syntax_error(s, "only one '=' allowed".into()));
		}

		let mut offset_size = register.split('.');
		let offset = offset_size.next().unwrap_or("");
		let size = offset_size.next();
		if offset_size.next().is_some() {
			return Err(syntax_error(s, "only one '.' allowed".into()));
		}

		let width = match size {
			None | Some("l") => Width::Dword,
			Some("w") => Width::Word,
			Some("b") => Width::Byte,
			Some(size) => return Err(syntax_error(s, format!("bad size {:?}", size))),
		};

		let offset = parse_unsigned(offset, Width::Word).map_err(|e| syntax_error(s, e))? as u16;
		let value = match value {
			None => None,
			Some(value) => Some(parse_unsigned(value, width).map_err(|e| syntax_error(s, e))?),
		};

		Ok(RegisterCommand {
			offset,
			width,
			value,
		})
	}
}

fn run_command(devices: &mut Devices, command: &str) -> Result<(), PciError> {
	let cmd: RegisterCommand = command.parse()?;
	let offset = u64::from(cmd.offset);

	match cmd.value {
		None => {
			let values = devices.read_config_register(offset, cmd.width.bits())?;
			for (d, value) in devices.iter_mut().zip(values) {
				if let Some(line) = cmd.format_read(value) {
					d.extra_info.push(line);
				}
			}
		},
		Some(value) => {
			devices.write_config_register(offset, cmd.width.bits(), value)?;
			debug!("wrote 0x{:x} to {}-bit register 0x{:x} of {} devices", value, cmd.width.bits(), offset, devices.len());
		},
	}
	Ok(())
}

/// Parses the commands without issuing them and logs every syntax error.
///
/// Returns the number of invalid commands.
pub fn check_commands<S: AsRef<str>>(commands: &[S]) -> usize {
	let mut invalid = 0;
	for command in commands {
		match command.as_ref().parse::<RegisterCommand>() {
			Ok(cmd) => debug!("not issuing {} {:?}", if cmd.is_write() { "write" } else { "read" }, command.as_ref()),
			Err(e) => {
				error!("{}", e);
				invalid += 1;
			},
		}
	}
	invalid
}

/// Runs the commands in order against all devices.
///
/// The first failing command stops processing: later commands are only
/// checked for syntax errors, not issued; output of earlier commands stays
/// in the devices' extra info.
pub fn run_commands<S: AsRef<str>>(devices: &mut Devices, commands: &[S]) -> Result<(), PciError> {
	for (i, command) in commands.iter().enumerate() {
		if let Err(e) = run_command(devices, command.as_ref()) {
			error!("{}. Due to this error no more commands will be issued", e);
			check_commands(&commands[i + 1..]);
			return Err(e);
		}
	}
	Ok(())
}

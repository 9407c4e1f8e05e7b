#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

extern crate pcitool;
use pcitool::*;

use std::io;
use std::path::Path;
use std::process::exit;

use pcitool::names::{
	NameResolver,
	NumericNames,
	PciIds,
};
use pcitool::pci::{
	BusReader,
	Filter,
};

// config space bytes to capture for -v, -vv, -vvv
fn read_size(verbose: u64) -> usize {
	match verbose {
		0 => 0,
		1 => 48,
		2 => 256,
		_ => 4096,
	}
}

// config space bytes to dump for -x, -xx, -xxx, -xxxx
fn dump_size(dumps: u64) -> usize {
	match dumps {
		0 => 0,
		1 => 48,
		2 => 64,
		3 => 256,
		_ => 4096,
	}
}

fn load_names(matches: &clap::ArgMatches) -> Box<dyn NameResolver> {
	let path = matches.value_of("ids").unwrap_or(names::PCI_IDS_PATH);
	match PciIds::load(Path::new(path)) {
		Ok(ids) => {
			debug!("loaded {} vendors from {}", ids.vendor_count(), path);
			Box::new(ids)
		},
		Err(e) => {
			warn!("{}; showing numeric IDs", e);
			Box::new(NumericNames)
		},
	}
}

/// Returns whether all register commands succeeded.
fn main_app() -> AResult<bool> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg numbers: -n "Show numeric IDs")
		(@arg select: -s +takes_value default_value("*") "Devices to match (comma separated globs on the PCI address)")
		(@arg json: --json "Dump the bus in JSON")
		(@arg verbose: -v ... "Decode control/status words; read 48 (-v), 256 (-vv) or 4096 (-vvv) bytes of config space")
		(@arg dump: -x ... "Dump 48 (-x), 64 (-xx), 256 (-xxx) or 4096 (-xxxx) bytes of config space")
		(@arg root: --root +takes_value default_value(pci::DEVICES_ROOT) "Directory with one entry per PCI device")
		(@arg ids: --ids +takes_value default_value(names::PCI_IDS_PATH) "PCI ID database for vendor and device names")
		(@arg REGISTER: ... "Register to read or write on all devices: OFFSET[.SIZE][=VALUE] with SIZE one of b, w, l (default)")
	).get_matches();

	let verbose = matches.occurrences_of("verbose");
	let dump_size = dump_size(matches.occurrences_of("dump"));
	let json = matches.is_present("json");
	let numbers = matches.is_present("numbers") && !json;

	let conf_size = if json {
		4096
	} else {
		read_size(verbose).max(dump_size)
	};

	let names: Box<dyn NameResolver> = if numbers {
		Box::new(NumericNames)
	} else {
		load_names(&matches)
	};

	let select = pci::address_glob(matches.value_of("select").unwrap_or("*"));
	let filters: [Filter; 1] = [&select];
	let reader = BusReader::new(matches.value_of("root").unwrap_or(pci::DEVICES_ROOT), conf_size, &*names);
	debug!("reading {} bytes of config space for PCI devices in {:?}", conf_size, reader.root());

	let mut devices = match reader.read(&filters) {
		Ok(devices) => devices,
		Err(e) => {
			if let PciError::PermissionLikely { .. } = e {
				if 0 != unsafe { libc::geteuid() } {
					info!("Only root can read config space beyond the first {} bytes", pci::UNPRIVILEGED_CONFIG_SIZE);
				}
			}
			return Err(e.into());
		},
	};

	if !numbers {
		devices.set_vendor_device_name(&*names);
	}

	let commands: Vec<&str> = matches.values_of("REGISTER").map(|v| v.collect()).unwrap_or_default();
	let commands_ok = registers::run_commands(&mut devices, &commands).is_ok();

	if json {
		println!("{}", output::to_json(&devices)?);
	} else {
		let stdout = io::stdout();
		output::print(&mut stdout.lock(), &devices, verbose > 0, dump_size)?;
	}

	Ok(commands_ok)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match main_app() {
		Ok(true) => (),
		// already logged; the output of earlier commands was still printed
		Ok(false) => exit(1),
		Err(e) => {
			error!("Error: {}", e);
			exit(1);
		},
	}
}

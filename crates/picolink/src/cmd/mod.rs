use clap::{Args, Subcommand};
use std::path::PathBuf;

use picolink_link::{Link, LinkConfig, OpenConfig};
use picolink_transport::{SerialConfig, SerialStream};

use crate::exit::{link_error, CliResult};
use crate::output::OutputFormat;

pub mod dump;
pub mod load;
pub mod probe;
pub mod read;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find the bridge and check its firmware version.
    Probe(ProbeArgs),
    /// Read one register.
    Read(ReadArgs),
    /// Write one register.
    Write(WriteArgs),
    /// Read a range of registers.
    Dump(DumpArgs),
    /// Write a range of registers.
    Load(LoadArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Probe(args) => probe::run(args, conn, format),
        Command::Read(args) => read::run(args, conn, format),
        Command::Write(args) => write::run(args, conn, format),
        Command::Dump(args) => dump::run(args, conn, format),
        Command::Load(args) => load::run(args, conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the bridge, from the global flags.
#[derive(Debug, Clone)]
pub struct Connection {
    pub port: Option<PathBuf>,
    pub baud_rate: u32,
    pub firmware_version: u32,
}

impl Connection {
    pub fn open_config(&self) -> OpenConfig {
        OpenConfig {
            serial: SerialConfig {
                baud_rate: self.baud_rate,
                ..SerialConfig::default()
            },
            link: LinkConfig {
                firmware_version: self.firmware_version,
                ..LinkConfig::default()
            },
            ..OpenConfig::default()
        }
    }

    /// Open the configured port, or probe the default candidates.
    pub fn open(&self) -> CliResult<Link<SerialStream>> {
        let config = self.open_config();
        let result = match &self.port {
            Some(path) => picolink_link::open_path(path, &config),
            None => picolink_link::open_with_config(&config),
        };
        result.map_err(|err| link_error("open failed", err))
    }
}

/// Release the link after a command, surfacing close failures.
pub fn close(link: Link<SerialStream>) -> CliResult<()> {
    link.close().map_err(|err| link_error("close failed", err))
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input:?}"))
}

pub fn parse_u8(input: &str) -> Result<u8, String> {
    let value = parse_number(input)?;
    u8::try_from(value).map_err(|_| format!("{input} does not fit in 8 bits"))
}

pub fn parse_u32(input: &str) -> Result<u32, String> {
    let value = parse_number(input)?;
    u32::try_from(value).map_err(|_| format!("{input} does not fit in 32 bits"))
}

/// Burst length: 1 to 65535 bytes.
pub fn parse_burst_size(input: &str) -> Result<usize, String> {
    let value = parse_number(input)?;
    if value == 0 || value > u64::from(u16::MAX) {
        return Err(format!("burst size must be in 1..={} (got {value})", u16::MAX));
    }
    Ok(value as usize)
}

#[derive(Args, Debug, Default)]
pub struct ProbeArgs {}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Register address (decimal or 0x hex).
    #[arg(value_parser = parse_u8)]
    pub address: u8,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Register address (decimal or 0x hex).
    #[arg(value_parser = parse_u8)]
    pub address: u8,
    /// Value to store (decimal or 0x hex).
    #[arg(value_parser = parse_u8)]
    pub value: u8,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// First register address (decimal or 0x hex).
    #[arg(value_parser = parse_u8)]
    pub address: u8,
    /// Number of bytes to read.
    #[arg(value_parser = parse_burst_size)]
    pub size: usize,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// First register address (decimal or 0x hex).
    #[arg(value_parser = parse_u8)]
    pub address: u8,
    /// Payload as hex digits.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the payload from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(not(unix))]
compile_error!("the picolink CLI needs a Unix serial device layer");

mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use picolink_link::DEFAULT_FIRMWARE_VERSION;
use picolink_transport::DEFAULT_BAUD_RATE;

use crate::cmd::{parse_u32, Command, Connection};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "picolink", version, about = "MCU radio bridge CLI")]
struct Cli {
    /// Serial device of the bridge. Default: probe /dev/ttyACM0..9.
    #[arg(long, value_name = "PATH", env = "PICOLINK_PORT", global = true)]
    port: Option<PathBuf>,

    /// Serial line rate.
    #[arg(long, value_name = "BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    baud: u32,

    /// Firmware version to announce in the handshake (decimal or 0x hex).
    #[arg(long, value_name = "VERSION", value_parser = parse_u32, global = true)]
    fw_version: Option<u32>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn connection(&self) -> Connection {
        Connection {
            port: self.port.clone(),
            baud_rate: self.baud,
            firmware_version: self.fw_version.unwrap_or(DEFAULT_FIRMWARE_VERSION),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let conn = cli.connection();
    let result = cmd::run(cli.command, &conn, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

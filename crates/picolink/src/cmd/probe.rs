use serde::Serialize;

use crate::cmd::{close, Connection, ProbeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct ProbeOutput {
    port: String,
    transport: &'static str,
    baud_rate: u32,
    firmware_version: String,
    atomic_tx: usize,
    atomic_rx: usize,
}

pub fn run(_args: ProbeArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let link = conn.open()?;

    let out = ProbeOutput {
        port: link.port_path().display().to_string(),
        transport: link.transport_name(),
        baud_rate: conn.baud_rate,
        firmware_version: format!("{:#010x}", link.config().firmware_version),
        atomic_tx: link.config().atomic_tx,
        atomic_rx: link.config().atomic_rx,
    };
    close(link)?;

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Pretty => {
            println!("Bridge:");
            println!("  Port:             {}", out.port);
            println!("  Transport:        {} @ {} baud", out.transport, out.baud_rate);
            println!("  Firmware version: {} (accepted)", out.firmware_version);
            println!("  Chunk limits:     tx={} rx={}", out.atomic_tx, out.atomic_rx);
        }
        OutputFormat::Raw => println!("{}", out.port),
    }
    Ok(SUCCESS)
}

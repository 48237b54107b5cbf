use std::fs;

use serde::Serialize;
use tracing::debug;

use crate::cmd::{close, Connection, LoadArgs};
use crate::exit::{io_error, link_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{parse_hex, print_json, OutputFormat};

#[derive(Serialize)]
struct LoadOutput {
    address: u8,
    size: usize,
}

pub fn run(args: LoadArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    if payload.is_empty() || payload.len() > usize::from(u16::MAX) {
        return Err(CliError::new(
            USAGE,
            format!(
                "payload must be 1..={} bytes (got {})",
                u16::MAX,
                payload.len()
            ),
        ));
    }
    debug!(address = args.address, size = payload.len(), "loading registers");

    let link = conn.open()?;
    link.write_burst(args.address, &payload)
        .map_err(|err| link_error("burst write failed", err))?;
    close(link)?;

    let out = LoadOutput {
        address: args.address,
        size: payload.len(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Pretty => println!("wrote {} bytes at {:#04x}", out.size, out.address),
        OutputFormat::Raw => {}
    }
    Ok(SUCCESS)
}

fn resolve_payload(args: &LoadArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex).map_err(|err| CliError::new(USAGE, format!("--hex: {err}")));
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --hex or --file is required"))
}

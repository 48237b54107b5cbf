use serde::Serialize;

use crate::cmd::{close, Connection, DumpArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{hex_dump, hex_string, print_json, print_raw, OutputFormat};

#[derive(Serialize)]
struct DumpOutput {
    address: u8,
    size: usize,
    data: String,
}

pub fn run(args: DumpArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let link = conn.open()?;
    let data = link
        .read_burst(args.address, args.size)
        .map_err(|err| link_error("burst read failed", err))?;
    close(link)?;

    match format {
        OutputFormat::Json => print_json(&DumpOutput {
            address: args.address,
            size: data.len(),
            data: hex_string(&data),
        }),
        OutputFormat::Pretty => print!("{}", hex_dump(args.address, &data)),
        OutputFormat::Raw => print_raw(&data),
    }
    Ok(SUCCESS)
}

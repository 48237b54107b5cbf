use serde::Serialize;

use crate::cmd::{close, Connection, ReadArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, OutputFormat};

#[derive(Serialize)]
pub struct RegisterOutput {
    pub address: u8,
    pub value: u8,
}

pub fn run(args: ReadArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let link = conn.open()?;
    let value = link
        .read_register(args.address)
        .map_err(|err| link_error("read failed", err))?;
    close(link)?;

    print_register(
        &RegisterOutput {
            address: args.address,
            value,
        },
        format,
    );
    Ok(SUCCESS)
}

pub fn print_register(out: &RegisterOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Pretty => println!("{:#04x} = {:#04x}", out.address, out.value),
        OutputFormat::Raw => print_raw(&[out.value]),
    }
}

use crate::cmd::read::{print_register, RegisterOutput};
use crate::cmd::{close, Connection, WriteArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: WriteArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let link = conn.open()?;
    link.write_register(args.address, args.value)
        .map_err(|err| link_error("write failed", err))?;
    close(link)?;

    print_register(
        &RegisterOutput {
            address: args.address,
            value: args.value,
        },
        format,
    );
    Ok(SUCCESS)
}

use crate::cmd::{ConnectArgs, OffArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: OffArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = connect.open()?;
    session
        .set_off(args.channel)
        .map_err(|err| session_error("switch off failed", err))?;

    print_status(&session, format);
    session
        .close()
        .map_err(|err| session_error("close failed", err))?;
    Ok(SUCCESS)
}

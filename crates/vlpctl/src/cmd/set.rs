use crate::cmd::{ConnectArgs, SetArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: SetArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = connect.open()?;

    session
        .set_intensity(args.channel, args.value)
        .map_err(|err| session_error("set intensity failed", err))?;
    session
        .set_on(args.channel)
        .map_err(|err| session_error("switch on failed", err))?;

    print_status(&session, format);
    session
        .close()
        .map_err(|err| session_error("close failed", err))?;
    Ok(SUCCESS)
}

//! Stage an intensity while a channel is off, then switch it on.
//!
//! ```text
//! cargo run -p vlpctl --example staged-intensity -- 192.168.11.20 2 180
//! ```

use std::env;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use vlpctl::{connect, SessionError};

fn run(host: &str, channel: usize, value: u16) -> Result<(), SessionError> {
    let mut session = connect(4, host)?;

    // Nothing reaches the controller while the channel is off.
    session.set_intensity(channel, value)?;
    session.set_on(channel)?;
    thread::sleep(Duration::from_secs(2));

    session.set_off(channel)?;
    session.close()
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| vlpctl::transport::DEFAULT_HOST.to_string());
    let channel = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let value = args.next().and_then(|s| s.parse().ok()).unwrap_or(128);

    match run(&host, channel, value) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error ({:?}): {err}", err.kind());
            ExitCode::FAILURE
        }
    }
}

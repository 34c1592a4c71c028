use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use vlpctl_session::Session;

use crate::cmd::{parse_duration, ConnectArgs, HoldArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_status, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: HoldArgs, connect: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let deadline = args
        .hold_for
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    // Ctrl-C must end in a release, with or without --for.
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut session = connect.open()?;
    for &(channel, value) in &args.settings {
        session
            .set_intensity(channel, value)
            .map_err(|err| session_error("set intensity failed", err))?;
        session
            .set_on(channel)
            .map_err(|err| session_error("switch on failed", err))?;
    }
    print_status(&session, format);

    if !wait(&running, deadline) {
        tracing::info!("interrupted, releasing channels");
    }

    release(&mut session, &args.settings)?;
    session
        .close()
        .map_err(|err| session_error("close failed", err))?;
    Ok(SUCCESS)
}

/// Block until `running` is cleared or `hold_for` elapses, whichever comes
/// first. Returns `true` when the duration ran out.
fn wait(running: &AtomicBool, hold_for: Option<Duration>) -> bool {
    let start = Instant::now();
    while running.load(Ordering::SeqCst) {
        if let Some(limit) = hold_for {
            let elapsed = start.elapsed();
            if elapsed >= limit {
                return true;
            }
            thread::sleep(POLL_INTERVAL.min(limit - elapsed));
        } else {
            thread::sleep(POLL_INTERVAL);
        }
    }
    false
}

fn release(session: &mut Session, settings: &[(usize, u16)]) -> CliResult<()> {
    let mut released = Vec::with_capacity(settings.len());
    for &(channel, _) in settings {
        if released.contains(&channel) {
            continue;
        }
        session
            .set_off(channel)
            .map_err(|err| session_error("switch off failed", err))?;
        released.push(channel);
    }
    Ok(())
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

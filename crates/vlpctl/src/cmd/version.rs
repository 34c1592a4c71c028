use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("vlpctl {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!(
        "target: {}",
        option_env!("VLPCTL_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("os: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    println!(
        "checksum: modulus {} (legacy {})",
        vlpctl_frame::CHECKSUM_MODULUS,
        vlpctl_frame::LEGACY_CHECKSUM_MODULUS
    );
    println!(
        "channels: {}..={}",
        vlpctl_session::MIN_CHANNELS,
        vlpctl_session::MAX_CHANNELS
    );

    Ok(SUCCESS)
}

//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod audio;
pub mod config_cmd;
pub mod lights;
pub mod music;
pub mod sounds;
pub mod status;
pub mod system;
pub mod util;
pub mod watch;

use std::time::Duration;

use deichwave_core::Remote;

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Everything a box-bound handler needs.
pub struct Context {
    pub remote: Remote,
    pub output: OutputFormat,
    pub quiet: bool,
    /// Upper bound on host discovery.
    pub wait: Duration,
    /// Human-readable candidate list for error messages.
    pub hosts: String,
}

/// Dispatch a box-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::status(ctx).await,
        Command::Ping => status::ping(ctx).await,
        Command::Watch => watch::handle(ctx).await,
        Command::Volume(args) => audio::handle(ctx, audio::Level::Volume, args).await,
        Command::Intensity(args) => audio::handle(ctx, audio::Level::Intensity, args).await,
        Command::Music(args) => music::handle(ctx, args).await,
        Command::Sounds(args) => sounds::handle(ctx, args).await,
        Command::Lights(args) => lights::handle_lights(ctx, args).await,
        Command::Profiles(args) => lights::handle_profiles(ctx, args).await,
        Command::Battery => system::battery(ctx).await,
        Command::Shell(args) => system::shell(ctx, args).await,
        Command::Info(args) => system::info(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not need a box".into(),
        )),
    }
}

//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod config_cmd;
pub mod firmware;
pub mod health;
pub mod profiles;
pub mod settings;
pub mod status;
pub mod util;
pub mod validate;
pub mod watch;

use gaggiuino_core::CoordinatorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a machine-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: CoordinatorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Profiles(args) => profiles::handle(config, args, global).await,
        Command::Settings(args) => settings::handle(config, args, global).await,
        Command::Health => health::handle(config, global).await,
        Command::Firmware => firmware::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        // Config, Completions and Validate are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Validate(_) => unreachable!(),
    }
}

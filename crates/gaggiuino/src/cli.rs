//! Clap derive structures for the `gaggiuino` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gaggiuino -- read and control a Gaggiuino espresso machine
#[derive(Debug, Parser)]
#[command(
    name = "gaggiuino",
    version,
    about = "Monitor and control Gaggiuino espresso machines from the command line",
    long_about = "Talks to the Gaggiuino controller's local HTTP API.\n\n\
        One-shot commands read a single snapshot; `watch` keeps polling\n\
        and re-renders every entity value as the machine changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configured machine to use
    #[arg(long, short = 'm', env = "GAGGIUINO_MACHINE", global = true)]
    pub machine: Option<String>,

    /// Machine host or URL (overrides the configured machine)
    #[arg(long, short = 'H', env = "GAGGIUINO_HOST", global = true)]
    pub host: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GAGGIUINO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "GAGGIUINO_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "GAGGIUINO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// On/off switch value for settings flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show live machine status
    #[command(alias = "st")]
    Status,

    /// List and select brew profiles
    #[command(alias = "p")]
    Profiles(ProfilesArgs),

    /// Show and change machine settings
    #[command(alias = "set")]
    Settings(SettingsArgs),

    /// Probe the machine's health endpoint
    Health,

    /// Show component versions and firmware update progress
    #[command(alias = "fw")]
    Firmware,

    /// Poll continuously and print entity values on every change
    Watch(WatchArgs),

    /// Check that a host answers like a Gaggiuino controller
    Validate(ValidateArgs),

    /// Manage CLI configuration and machines
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List brew profiles
    #[command(alias = "ls")]
    List,

    /// Make a profile active
    Select {
        /// Profile id, or its display name as shown by `profiles list`
        profile: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show every settings group
    Show,

    /// Show or change boiler settings
    Boiler {
        /// Steam set point in °C (100-165)
        #[arg(long)]
        steam_set_point: Option<f64>,
    },

    /// Show or change the LED strip
    Led {
        /// Turn the strip on or off
        #[arg(long)]
        state: Option<Toggle>,

        /// Colour as "R,G,B" (implies --state on)
        #[arg(long, value_parser = parse_rgb)]
        color: Option<(u8, u8, u8)>,

        /// Disco mode
        #[arg(long)]
        disco: Option<Toggle>,
    },

    /// Show or change scales settings
    Scales {
        /// Force predictive scales
        #[arg(long)]
        force_predictive: Option<Toggle>,

        /// Hardware scales
        #[arg(long)]
        hw_scales: Option<Toggle>,

        /// Bluetooth scales
        #[arg(long)]
        bt_scales: Option<Toggle>,
    },
}

fn parse_rgb(s: &str) -> Result<(u8, u8, u8), String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected R,G,B, got '{s}'"));
    };
    let channel = |v: &str| {
        v.parse::<u8>()
            .map_err(|_| format!("colour channel '{v}' must be 0-255"))
    };
    Ok((channel(r)?, channel(g)?, channel(b)?))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / VALIDATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides config)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Include entities that are disabled by default
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Host or URL to probe (defaults to --host / the configured machine)
    pub host: Option<String>,

    /// Save the host as a named machine when validation succeeds
    #[arg(long)]
    pub save: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with a single machine
    Init {
        /// Machine host or URL
        #[arg(long, default_value = "gaggiuino.local")]
        host: String,

        /// Machine name
        #[arg(long, default_value = "default")]
        name: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Add or replace a machine
    Add {
        /// Machine name
        name: String,

        /// Machine host or URL
        host: String,

        /// Request timeout override in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Poll interval override in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Remove a machine
    #[command(alias = "rm")]
    Remove {
        /// Machine name
        name: String,
    },

    /// Set the default machine
    Use {
        /// Machine name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rgb_triplets() {
        assert_eq!(parse_rgb("255, 0,128").unwrap(), (255, 0, 128));
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gaggiuino",
            "profiles",
            "select",
            "2",
            "--host",
            "10.0.0.5",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.global.host.as_deref(), Some("10.0.0.5"));
        assert!(matches!(cli.global.output, OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::Profiles(ProfilesArgs {
                command: ProfilesCommand::Select { ref profile }
            }) if profile == "2"
        ));
    }
}

//! Clap derive structures for the `deichwave` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// deichwave -- remote control for a Deichwave party box
#[derive(Debug, Parser)]
#[command(
    name = "deichwave",
    version,
    about = "Control a Deichwave party box from the command line",
    long_about = "Finds the box among the configured hosts, then drives its music,\n\
        sounds, lights and levels. `deichwave watch` follows live state\n\
        changes pushed by the box.",
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
    /// Host candidate to probe (repeatable, replaces the configured list)
    #[arg(
        long,
        short = 'H',
        env = "DEICHWAVE_HOST",
        value_delimiter = ',',
        global = true
    )]
    pub host: Vec<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "DEICHWAVE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "DEICHWAVE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Seconds to wait for a host to answer
    #[arg(long, env = "DEICHWAVE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the state of every store on the box
    #[command(alias = "st")]
    Status,

    /// Follow live state changes until interrupted
    #[command(alias = "w")]
    Watch,

    /// Find the box and measure its reply time
    Ping,

    /// Show or change the playback volume
    #[command(alias = "vol")]
    Volume(LevelArgs),

    /// Show or change the party intensity
    Intensity(LevelArgs),

    /// Control music playback and playlists
    #[command(alias = "m")]
    Music(MusicArgs),

    /// Play and loop sound effects
    #[command(alias = "snd")]
    Sounds(SoundsArgs),

    /// Switch light effects
    Lights(LightsArgs),

    /// Apply profiles
    Profiles(ProfilesArgs),

    /// Read the battery charge, if the box has one
    Battery,

    /// Run a command configured on the box
    Shell(ShellArgs),

    /// Look up a configuration value of the box
    Info(InfoArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Levels ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LevelArgs {
    /// New level (0-100); omit to show the current one
    #[arg(value_parser = clap::value_parser!(i64).range(0..=100), conflicts_with = "by")]
    pub level: Option<i64>,

    /// Change the level relative to its current value
    #[arg(long, allow_negative_numbers = true)]
    pub by: Option<i64>,
}

// ── Music ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MusicArgs {
    #[command(subcommand)]
    pub command: MusicCommand,
}

#[derive(Debug, Subcommand)]
pub enum MusicCommand {
    /// Start or resume playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Skip to the next song
    Next,
    /// Drop the upcoming song of a playlist
    Skip {
        /// Playlist name
        playlist: String,
    },
    /// List playlists with their position and chance
    #[command(alias = "ls")]
    List,
    /// List the upcoming songs of a playlist
    Songs {
        /// Playlist name
        playlist: String,
    },
    /// Show the song currently playing
    #[command(alias = "now")]
    Playing,
}

// ── Sounds ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SoundsArgs {
    #[command(subcommand)]
    pub command: SoundsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SoundsCommand {
    /// List sound effects
    #[command(alias = "ls")]
    List,
    /// Show details of a sound effect
    Show {
        /// Sound name
        name: String,
    },
    /// Play a sound effect once
    Play {
        /// Sound name
        name: String,
    },
    /// Play a sound effect in a loop
    Loop {
        /// Sound name
        name: String,
    },
    /// Stop looping a sound effect
    Unloop {
        /// Sound name
        name: String,
    },
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List light effects
    #[command(alias = "ls")]
    List,
    /// Start a light effect
    Set {
        /// Effect name
        effect: String,
    },
    /// Stop a light effect
    Stop {
        /// Effect name
        effect: String,
    },
    /// Stop every running light effect
    Clear,
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List profiles
    #[command(alias = "ls")]
    List,
    /// Apply a profile
    Set {
        /// Profile name
        profile: String,
    },
}

// ── Misc ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShellArgs {
    /// Name of the command as configured on the box
    pub command: String,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Dotted configuration path, e.g. `hardware.battery`
    pub path: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}

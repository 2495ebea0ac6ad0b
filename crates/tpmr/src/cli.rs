//! Clap derive structures for the `tpmr` CLI.
//!
//! Only depends on clap + clap_complete so `build.rs` can include it for
//! man page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-level CLI ────────────────────────────────────────────────────

/// tpmr -- talk to TP-Link MR series LTE routers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "tpmr",
    version,
    about = "Query and control TP-Link MR series LTE routers",
    long_about = "Query and control TP-Link MR series LTE routers.\n\n\
        Logs in with the router's web-management credentials, runs one command \
        and logs out again. Connection details come from a named profile in \
        the config file, from flags, or from TPMR_* environment variables.",
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
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "TPMR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router address (overrides profile), e.g. 192.168.1.1 or http://router.lan
    #[arg(long = "host", short = 'H', env = "TPMR_HOST", global = true)]
    pub host: Option<String>,

    /// Web-management username (overrides profile)
    #[arg(long, short = 'u', env = "TPMR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Web-management password (overrides profile and keyring)
    #[arg(long, env = "TPMR_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TPMR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TPMR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    JsonCompact,
    Yaml,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Top-level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full status snapshot: device, LTE link, traffic, clients and SMS
    Status,

    /// Device identity and WAN addressing
    Info,

    /// LTE link, traffic counters and provider profile
    Lte,

    /// Connected LAN and Wi-Fi clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Read and send SMS through the modem
    Sms(SmsArgs),

    /// Reboot the router
    Reboot,

    /// Read or toggle a Wi-Fi radio
    Wifi(WifiArgs),

    /// Validate connection settings: log in, read device info, log out
    Check,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Clients ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClientsArgs {
    /// Only show clients the router reports as active
    #[arg(long)]
    pub active: bool,
}

// ── SMS ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SmsArgs {
    #[command(subcommand)]
    pub command: SmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SmsCommand {
    /// List the first page of the inbox
    #[command(alias = "ls")]
    List {
        /// Only show unread messages
        #[arg(long)]
        unread: bool,
    },

    /// Send a text message
    Send {
        /// Recipient phone number, digits with an optional leading +
        #[arg(value_parser = parse_phone_number)]
        number: String,

        /// Message text, on a single line
        #[arg(value_parser = parse_sms_text)]
        text: String,
    },
}

fn parse_phone_number(raw: &str) -> Result<String, String> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a phone number"));
    }
    Ok(raw.to_owned())
}

fn parse_sms_text(raw: &str) -> Result<String, String> {
    if raw.contains(['\r', '\n']) {
        return Err("message text cannot contain line breaks".into());
    }
    Ok(raw.to_owned())
}

// ── Wi-Fi ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiArgs {
    #[command(subcommand)]
    pub command: WifiCommand,
}

#[derive(Debug, Subcommand)]
pub enum WifiCommand {
    /// Show whether a radio is enabled
    Get {
        #[command(flatten)]
        target: WifiTarget,
    },

    /// Turn a radio on or off
    Set {
        #[command(flatten)]
        target: WifiTarget,

        /// Desired state
        state: Toggle,
    },
}

#[derive(Debug, Args)]
pub struct WifiTarget {
    /// Radio band
    #[arg(long, short = 'b')]
    pub band: BandArg,

    /// Address the guest network instead of the main one
    #[arg(long)]
    pub guest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BandArg {
    #[value(name = "2.4", alias = "2g")]
    TwoPointFour,
    #[value(name = "5", alias = "5g")]
    Five,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Display resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "roster-sync")]
#[command(about = "Reconcile a membership roster export against the member store")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compare a roster with the store and list the proposed changes
    Detect(DetectArgs),
    /// Apply a reviewed batch written by `detect --out`
    Apply(ApplyArgs),
    /// Detect and apply in one step, accepting everything not rejected
    Sync(SyncArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct DetectArgs {
    /// Roster CSV export (overrides roster.path)
    #[arg(long)]
    pub roster: Option<String>,

    /// Member store CSV (overrides store.path)
    #[arg(long)]
    pub store: Option<String>,

    /// Write the review batch here (overrides review.output)
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ApplyArgs {
    /// Member store CSV (overrides store.path)
    #[arg(long)]
    pub store: Option<String>,

    /// Review batch written by `detect`
    #[arg(long)]
    pub changes: String,

    #[arg(long, conflicts_with = "reject_all")]
    pub accept_all: bool,

    #[arg(long)]
    pub reject_all: bool,

    /// Change numbers to accept, applied after the bulk flags
    #[arg(long, value_delimiter = ',')]
    pub accept: Vec<usize>,

    /// Change numbers to reject, applied last
    #[arg(long, value_delimiter = ',')]
    pub reject: Vec<usize>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    #[arg(long)]
    pub roster: Option<String>,

    #[arg(long)]
    pub store: Option<String>,

    /// Stop after detection
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_delimiter = ',')]
    pub reject: Vec<usize>,
}

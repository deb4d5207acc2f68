use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "carryover",
    version,
    about = "Carry translations forward across revisions of extracted source text"
)]
pub struct Cli {
    /// Configuration file (default: carryover.toml in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug details
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(flatten)]
    pub dirs: DirOverrides,
    #[command(subcommand)]
    pub command: Command,
}

/// Directory settings that take precedence over the configuration file
#[derive(Args, Debug, Default)]
pub struct DirOverrides {
    /// Extracted source segments and placeholdered XML
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,
    /// Machine-translated segments used by `merge`
    #[arg(long, global = true)]
    pub target_dir: Option<PathBuf>,
    /// Translation tables
    #[arg(long, global = true)]
    pub table_dir: Option<PathBuf>,
    /// Output of `apply`
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create tables from source and machine-translated segment files
    Merge,
    /// Reconcile every source file with its table after re-extraction
    Upsert {
        /// Minimum similarity for a translation to be carried
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Scan for suspiciously short translations and write the report
    Check {
        #[arg(long)]
        ratio: Option<f64>,
    },
    /// Show how many empty entries `fill` could complete
    Preview,
    /// Fill empty entries from identical source texts elsewhere
    Fill {
        #[arg(long, value_enum, default_value_t = Policy::Prompt)]
        policy: Policy,
    },
    /// List source texts with conflicting translations
    Inconsistencies {
        /// Choose one translation per source text and apply it everywhere
        #[arg(long)]
        resolve: bool,
        #[arg(long, value_enum, default_value_t = Policy::Prompt)]
        policy: Policy,
    },
    /// List suspiciously short translations
    Short {
        /// Replace the flagged translations
        #[arg(long)]
        fix: bool,
        #[arg(long)]
        ratio: Option<f64>,
        #[arg(long, value_enum, default_value_t = Policy::Prompt)]
        policy: Policy,
    },
    /// Substitute translations into the placeholdered XML files
    Apply,
}

/// How ambiguous cases are decided
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Ask on the terminal
    Prompt,
    /// Take the longest candidate
    Longest,
    /// Leave every ambiguous case alone
    Skip,
}

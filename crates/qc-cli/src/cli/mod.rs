use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `qcon` binary.
#[derive(Debug, Parser)]
#[command(name = "qcon", version, about = "Quest platform admin console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Response rendering (json, table or raw)
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log session transitions and requests at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Flags every handler receives.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

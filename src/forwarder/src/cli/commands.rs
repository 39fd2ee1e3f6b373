use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "insights-forwarder",
    about = "Forwards newline-delimited JSON events to the New Relic Insights insert API",
    version,
    after_help = "Every option can also be set with an INSIGHTS_<OPTION> environment variable, e.g. INSIGHTS_ACCOUNT_ID"
)]
pub struct Cli {
    /// TOML configuration file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read events (one JSON object per line) and forward them until end of input or Ctrl-C
    Run {
        /// Read from this file instead of stdin
        #[clap(long)]
        input: Option<PathBuf>,
    },

    /// Shows the resolved configuration with secrets redacted
    Config,
}

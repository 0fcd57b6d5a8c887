use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcp-agent-inspector")]
#[command(about = "Standalone control plane for the mcp-agent-inspector sidecar", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a config.toml, overriding the default
    /// `~/.config/mcp-agent-inspector/config.toml` lookup.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the standalone HTTP gateway (the default when no subcommand
    /// is given).
    Serve {
        /// Override the resolved config's port for this run.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration and advisory-lock state without
    /// starting a server.
    Status,
}

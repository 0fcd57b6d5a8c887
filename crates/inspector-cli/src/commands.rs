use crate::args::{Cli, Commands};
use crate::config::Config;
use crate::handlers;
use anyhow::Result;

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => handlers::serve::handle(config, port).await,
        Commands::Status => handlers::status::handle(&config),
    }
}

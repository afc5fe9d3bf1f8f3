#![allow(clippy::missing_errors_doc)]
use clap::Parser;

use crate::ui::{Cli, Colors, Commands, ListCommands, colors};

mod config;
mod pipeline;
mod sources;
mod ui;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { list_command } => match list_command {
      ListCommands::Paths { input } => ui::commands::list_paths(&input, &colors).await?,
      ListCommands::Refs { input, paths } => ui::commands::list_refs(&input, &paths, &colors).await?,
    },
    Commands::Compose(command) => {
      let settings = ui::commands::ComposeSettings::from_command(command);
      ui::commands::compose_documents(settings, &colors).await?;
    }
  }

  Ok(())
}

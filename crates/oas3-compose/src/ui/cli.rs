use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-compose")]
#[command(author, version, about = "Compose Swagger 2 / OpenAPI 3 documents into one OpenAPI 3 document")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Generate every document described by a configuration file
  Compose(ComposeCommand),
  /// List information from a source document
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
}

#[derive(Args, Debug, Clone)]
pub struct ComposeCommand {
  /// Path to the JSON configuration file
  #[arg(short, long, value_name = "FILE")]
  pub config: PathBuf,

  /// Treat validation errors in source and generated documents as fatal
  #[arg(long, default_value_t = false)]
  pub strict: bool,

  /// Print every rewritten reference and per-source statistics
  #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List the paths and operations of a source document
  Paths {
    /// URL or path of the Swagger / OpenAPI JSON document
    #[arg(short, long, value_name = "URL|FILE")]
    input: String,
  },
  /// List the components a path selection would import
  Refs {
    /// URL or path of the Swagger / OpenAPI JSON document
    #[arg(short, long, value_name = "URL|FILE")]
    input: String,

    /// Paths to select (repeatable); all paths when omitted
    #[arg(short, long = "path", value_name = "PATH")]
    paths: Vec<String>,
  },
}

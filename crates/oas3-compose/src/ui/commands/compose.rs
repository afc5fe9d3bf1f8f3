use std::{io::Write, path::PathBuf};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  config::{GenerationConfig, load_configs},
  pipeline::{ComposeFailure, ComposeStats, GenerationError, Orchestrator},
  sources::write_document,
  ui::{Colors, ComposeCommand, Role},
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct ComposeSettings {
  pub config: PathBuf,
  pub strict: bool,
  pub verbose: bool,
  pub quiet: bool,
}

impl ComposeSettings {
  pub fn from_command(command: ComposeCommand) -> Self {
    let ComposeCommand {
      config,
      strict,
      verbose,
      quiet,
    } = command;

    Self {
      config,
      strict,
      verbose,
      quiet,
    }
  }

  fn apply(&self, config: GenerationConfig) -> GenerationConfig {
    if self.strict { config.strict() } else { config }
  }
}

struct ComposeLogger<'a> {
  settings: &'a ComposeSettings,
  colors: &'a Colors,
}

impl<'a> ComposeLogger<'a> {
  fn new(settings: &'a ComposeSettings, colors: &'a Colors) -> Self {
    Self { settings, colors }
  }

  fn info(&self, message: &str) {
    if !self.settings.quiet {
      println!(
        "{} {}",
        format_timestamp().with(self.colors.color(Role::Timestamp)),
        message.with(self.colors.color(Role::Primary))
      );
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.settings.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.color(Role::Label)),
        value.with(self.colors.color(Role::Value))
      );
    }
  }

  fn error(&self, error: &GenerationError) {
    eprintln!(
      "{} {}",
      "Error:".with(self.colors.color(Role::Accent)),
      error.to_string().with(self.colors.color(Role::Primary))
    );
    if let GenerationError::Validation { report, .. } = error {
      for issue in &report.errors {
        eprintln!(
          "       {} {}",
          issue.path.as_str().with(self.colors.color(Role::Label)),
          issue.message.as_str().with(self.colors.color(Role::Primary))
        );
      }
    }
  }

  fn log_loading(&self) {
    self.info(&format!("Loading configuration from: {}", self.settings.config.display()));
  }

  fn log_composing(&self, config: &GenerationConfig) {
    self.info(&format!(
      "Composing {} from {} source(s)...",
      config.destination.display(),
      config.docs.len()
    ));
  }

  fn print_statistics(&self, stats: &ComposeStats) {
    if self.settings.quiet {
      return;
    }

    self.stat("Sources composed:", stats.sources_composed.to_string());
    if stats.sources_converted > 0 {
      self.stat("", format!("{} converted from Swagger 2", stats.sources_converted));
    }
    self.stat("Paths imported:", stats.paths_imported.to_string());
    self.stat("Components captured:", stats.components_captured.to_string());
    self.stat("References rewritten:", stats.references_rewritten.to_string());
    if stats.doc_hooks_applied > 0 {
      self.stat("Document hooks applied:", stats.doc_hooks_applied.to_string());
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_sources(stats);
    self.print_warnings(stats);
  }

  fn print_sources(&self, stats: &ComposeStats) {
    if !self.settings.verbose {
      return;
    }

    for source in &stats.sources {
      println!();
      self.stat("Source:", source.location.clone());
      self.stat(
        "",
        format!(
          "{} paths imported, {} dropped, {} renamed",
          source.paths_imported, source.paths_dropped, source.paths_renamed
        ),
      );
      self.stat("", format!("{} components captured", source.components_captured));
      for rewrite in &source.rewrites {
        println!(
          "              {} '{}' to '{}'",
          "Converting component path reference from".with(self.colors.color(Role::Accent)),
          rewrite.original.as_str().with(self.colors.color(Role::Value)),
          rewrite.rewritten.as_str().with(self.colors.color(Role::Value))
        );
      }
    }
  }

  fn print_warnings(&self, stats: &ComposeStats) {
    let _ = self.write_warnings(&mut std::io::stderr().lock(), stats);
  }

  /// Writes the warning block, blank separator included, to a single stream.
  fn write_warnings(&self, out: &mut impl Write, stats: &ComposeStats) -> std::io::Result<()> {
    if stats.warnings.is_empty() {
      return Ok(());
    }

    writeln!(out)?;
    for warning in &stats.warnings {
      writeln!(
        out,
        "{} {}",
        "Warning:".with(self.colors.color(Role::Warning)),
        warning.to_string().with(self.colors.color(Role::Primary))
      )?;
    }
    Ok(())
  }

  fn log_writing(&self, destination: &std::path::Path) {
    self.info(&format!("Writing to: {}", destination.display()));
  }

  fn log_success(&self) {
    if !self.settings.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.color(Role::Timestamp)),
        "Successfully composed OpenAPI documents".with(self.colors.color(Role::Success))
      );
    }
  }
}

/// Runs every generation config of the configuration file.
///
/// Configs are independent: a failing one does not stop the rest. The destination of a config is
/// only written when all of its sources composed. The first error collected is returned.
pub async fn compose_documents(settings: ComposeSettings, colors: &Colors) -> anyhow::Result<()> {
  let logger = ComposeLogger::new(&settings, colors);

  logger.log_loading();
  let configs = load_configs(&settings.config).await?;

  let mut first_error = None;
  for config in configs {
    if let Err(failure) = run_config(settings.apply(config), &logger).await
      && first_error.is_none()
    {
      first_error = failure.into_first();
    }
  }

  match first_error {
    Some(err) => Err(err.into()),
    None => {
      logger.log_success();
      Ok(())
    }
  }
}

async fn run_config(config: GenerationConfig, logger: &ComposeLogger<'_>) -> Result<(), ComposeFailure> {
  logger.log_composing(&config);
  let orchestrator = Orchestrator::new(config);

  let output = orchestrator.compose().await.inspect_err(|failure| {
    logger.print_statistics(&failure.stats);
    for err in &failure.errors {
      logger.error(err);
    }
  })?;
  logger.print_statistics(&output.stats);

  let destination = &orchestrator.config().destination;
  logger.log_writing(destination);
  write_document(destination, &output.document).await.map_err(|err| {
    logger.error(&err);
    ComposeFailure {
      errors: vec![err],
      stats: output.stats,
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{pipeline::ComposeWarning, ui::colors::Theme};

  fn settings() -> ComposeSettings {
    ComposeSettings {
      config: PathBuf::from("compose.json"),
      strict: false,
      verbose: false,
      quiet: false,
    }
  }

  #[test]
  fn test_warning_block_is_written_to_one_stream() {
    let settings = settings();
    let colors = Colors::new(false, Theme::Dark);
    let logger = ComposeLogger::new(&settings, &colors);
    let stats = ComposeStats {
      warnings: vec![ComposeWarning::MissingPath {
        location: "petstore.json".to_string(),
        path: "/stores".to_string(),
      }],
      ..ComposeStats::default()
    };

    let mut out = Vec::new();
    logger.write_warnings(&mut out, &stats).unwrap();
    let written = String::from_utf8(out).unwrap();

    assert!(written.starts_with('\n'), "separator belongs to the warning block: {written:?}");
    assert_eq!(written.lines().count(), 2);
    assert!(written.contains("Warning:"));
    assert!(written.contains("petstore.json: path '/stores' is configured but not present in the source"));
  }

  #[test]
  fn test_no_warnings_writes_nothing() {
    let settings = settings();
    let colors = Colors::new(false, Theme::Dark);
    let logger = ComposeLogger::new(&settings, &colors);

    let mut out = Vec::new();
    logger.write_warnings(&mut out, &ComposeStats::default()).unwrap();

    assert!(out.is_empty());
  }
}

use oas3_compose_core::{AssemblyReport, ReferenceRewrite};
use strum::Display;

use crate::sources::validate::ValidationReport;

/// What one source contributed to the composed document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceStats {
  pub location: String,
  pub converted_from_swagger: bool,
  pub paths_imported: usize,
  pub paths_dropped: usize,
  pub paths_renamed: usize,
  pub components_captured: usize,
  pub references_rewritten: usize,
  pub rewrites: Vec<ReferenceRewrite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeStats {
  pub sources_composed: usize,
  pub sources_converted: usize,
  pub paths_imported: usize,
  pub components_captured: usize,
  pub references_rewritten: usize,
  pub doc_hooks_applied: usize,
  pub sources: Vec<SourceStats>,
  pub warnings: Vec<ComposeWarning>,
}

impl ComposeStats {
  pub fn record_source(&mut self, location: &str, converted_from_swagger: bool, report: &AssemblyReport) {
    self.sources_composed += 1;
    if converted_from_swagger {
      self.sources_converted += 1;
    }
    self.paths_imported += report.paths_imported;
    self.components_captured += report.captured.len();
    self.references_rewritten += report.rewrite.rewrites.len();

    self.sources.push(SourceStats {
      location: location.to_string(),
      converted_from_swagger,
      paths_imported: report.paths_imported,
      paths_dropped: report.dropped_paths.len(),
      paths_renamed: report.renamed_paths.len(),
      components_captured: report.captured.len(),
      references_rewritten: report.rewrite.rewrites.len(),
      rewrites: report.rewrite.rewrites.clone(),
    });
  }

  pub fn record_doc_hook(&mut self) {
    self.doc_hooks_applied += 1;
  }

  pub fn record_warning(&mut self, warning: ComposeWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = ComposeWarning>) {
    self.warnings.extend(warnings);
  }

  /// Turns every issue of a non-fatal validation into a warning.
  pub fn record_validation(&mut self, location: &str, report: &ValidationReport) {
    self.record_warnings(report.errors.iter().chain(&report.warnings).map(|issue| {
      ComposeWarning::Validation {
        location: location.to_string(),
        path: issue.path.clone(),
        message: issue.message.clone(),
      }
    }));
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ComposeWarning {
  #[strum(to_string = "{location} at '{path}': {message}")]
  Validation {
    location: String,
    path: String,
    message: String,
  },
  #[strum(to_string = "{location}: path '{path}' is configured but not present in the source")]
  MissingPath { location: String, path: String },
}

#[cfg(test)]
mod tests {
  use oas3_compose_core::{CapturedComponent, RewriteReport};

  use super::*;
  use crate::sources::validate::ValidationIssue;

  #[test]
  fn test_record_source_accumulates_totals() {
    let report = AssemblyReport {
      paths_imported: 2,
      dropped_paths: vec!["/orders".to_string()],
      renamed_paths: vec![],
      captured: vec![CapturedComponent {
        pointer: "#/components/schemas/Pet".to_string(),
        depth: 0,
      }],
      rewrite: RewriteReport {
        rewrites: vec![ReferenceRewrite {
          original: "#/components/schemas/Pet".to_string(),
          rewritten: "#/components/schemas/PetStorePet".to_string(),
        }],
        relocations: vec![],
      },
    };

    let mut stats = ComposeStats::default();
    stats.record_source("petstore.json", true, &report);
    stats.record_source("store.json", false, &report);

    assert_eq!(stats.sources_composed, 2);
    assert_eq!(stats.sources_converted, 1);
    assert_eq!(stats.paths_imported, 4);
    assert_eq!(stats.components_captured, 2);
    assert_eq!(stats.references_rewritten, 2);
    assert_eq!(stats.sources[0].paths_dropped, 1);
  }

  #[test]
  fn test_validation_issues_become_warnings() {
    let report = ValidationReport {
      errors: vec![ValidationIssue::new("#/paths/~1pets/get", "missing responses")],
      warnings: vec![ValidationIssue::new("#/paths/~1pets/post", "operation has no operationId")],
    };

    let mut stats = ComposeStats::default();
    stats.record_validation("petstore.json", &report);

    assert_eq!(stats.warnings.len(), 2);
    assert_eq!(
      stats.warnings[0].to_string(),
      "petstore.json at '#/paths/~1pets/get': missing responses"
    );
  }
}

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
  error::{ComposeError, Result},
  index::{REF_KEY, find_reference_nodes},
  pointer::JsonPointer,
};

/// A single `$ref` value that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRewrite {
  pub original: String,
  pub rewritten: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
  /// One entry per reference node, in traversal order.
  pub rewrites: Vec<ReferenceRewrite>,
  /// Components relocated inside the fragment, once per distinct original pointer.
  pub relocations: Vec<ReferenceRewrite>,
}

/// Segments of `#/components/<kind>/<name>`, the deepest pointer a component can be renamed at.
const COMPONENT_DEPTH: usize = 3;

/// Namespaces every reference inside `fragment` with `prefix`.
///
/// Each `$ref` gets `prefix` inserted before its final segment, and the object the original
/// pointer addressed inside `fragment` is moved to the rewritten location. Several nodes may share
/// one pointer: the object is moved the first time and later nodes only get their `$ref` updated.
/// `None` or an empty prefix leaves `fragment` untouched.
///
/// All `$ref` values are rewritten before anything is moved, so node locations collected up front
/// stay valid. Every relocated component is taken out before any is stored again, so a new name
/// that equals another component's old name (`Pet` and `XPet` under prefix `X`) loses nothing.
///
/// A reference into the inside of a component, such as `#/components/schemas/Pet/properties/tag`,
/// fails with [`ComposeError::UnmovableReference`]: its owner is renamed too, so no prefixed form
/// of the pointer would resolve.
pub fn rewrite(fragment: &mut Value, prefix: Option<&str>) -> Result<RewriteReport> {
  let mut report = RewriteReport::default();
  let Some(prefix) = prefix.filter(|prefix| !prefix.is_empty()) else {
    return Ok(report);
  };

  let mut pending: IndexMap<String, String> = IndexMap::new();
  for site in find_reference_nodes(fragment) {
    let pointer = JsonPointer::parse(&site.pointer)?;
    let segments = pointer.segments();
    if segments.first().is_some_and(|kind| kind == "components") && segments.len() > COMPONENT_DEPTH {
      return Err(ComposeError::UnmovableReference { pointer: site.pointer });
    }
    let rewritten = pointer.with_prefixed_name(prefix);
    if let Some(node) = site.node_mut(fragment) {
      node.insert(REF_KEY.to_string(), Value::String(rewritten.clone()));
    }
    pending
      .entry(site.pointer.clone())
      .or_insert_with(|| rewritten.clone());
    report.rewrites.push(ReferenceRewrite {
      original: site.pointer,
      rewritten,
    });
  }

  let mut taken = Vec::new();
  for (original, rewritten) in pending {
    if let Some(component) = JsonPointer::parse(&original)?.take(fragment)? {
      taken.push((JsonPointer::parse(&rewritten)?, component));
      report.relocations.push(ReferenceRewrite { original, rewritten });
    }
  }
  for (to, component) in taken {
    to.insert(fragment, component)?;
  }

  Ok(report)
}

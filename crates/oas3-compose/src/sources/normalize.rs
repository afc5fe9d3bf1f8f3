//! Normalization of source documents to the OpenAPI 3 shape.
//!
//! OpenAPI 3.x documents pass through untouched. Swagger 2.x documents are converted
//! structurally: definitions, parameters, responses and security definitions move under
//! `components`, body and form parameters become request bodies, response schemas move into
//! `content`, and every `$ref` is re-pointed at its new location.

use std::collections::HashSet;

use oas3_compose_core::{HttpMethod, find_reference_nodes, index::REF_KEY};
use serde_json::{Map, Value, json};
use strum::Display;

use crate::pipeline::errors::GenerationError;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";
const CONVERTED_VERSION: &str = "3.0.3";

/// Keywords of a Swagger 2 non-body parameter or header that describe its value.
const SCHEMA_KEYWORDS: &[&str] = &[
  "type",
  "format",
  "items",
  "enum",
  "default",
  "maximum",
  "exclusiveMaximum",
  "minimum",
  "exclusiveMinimum",
  "maxLength",
  "minLength",
  "pattern",
  "maxItems",
  "minItems",
  "uniqueItems",
  "multipleOf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SpecVersion {
  #[strum(to_string = "Swagger 2.x")]
  Swagger2,
  #[strum(to_string = "OpenAPI 3.x")]
  OpenApi3,
}

/// A document in OpenAPI 3 shape, together with the version it was read as.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
  pub document: Value,
  pub source_version: SpecVersion,
}

impl Normalized {
  pub fn was_converted(&self) -> bool {
    self.source_version != SpecVersion::OpenApi3
  }
}

pub fn detect_version(doc: &Value) -> Option<SpecVersion> {
  let marker = |key: &str, major: char| {
    doc
      .get(key)
      .and_then(Value::as_str)
      .is_some_and(|version| version.starts_with(major))
  };

  if marker("openapi", '3') {
    Some(SpecVersion::OpenApi3)
  } else if marker("swagger", '2') {
    Some(SpecVersion::Swagger2)
  } else {
    None
  }
}

/// Converts `doc` to OpenAPI 3 shape, or fails when it carries no recognizable version marker.
pub fn to_v3(location: &str, doc: Value) -> Result<Normalized, GenerationError> {
  match detect_version(&doc) {
    Some(SpecVersion::OpenApi3) => Ok(Normalized {
      document: doc,
      source_version: SpecVersion::OpenApi3,
    }),
    Some(SpecVersion::Swagger2) => {
      let Value::Object(source) = &doc else {
        return Err(GenerationError::unrecognized(location));
      };
      Ok(Normalized {
        document: Swagger2Converter::new(source).convert(),
        source_version: SpecVersion::Swagger2,
      })
    }
    None => Err(GenerationError::unrecognized(location)),
  }
}

struct Swagger2Converter<'a> {
  source: &'a Map<String, Value>,
  consumes: Vec<String>,
  produces: Vec<String>,
  /// Names of shared parameters that are `in: body`; they become request bodies.
  body_parameters: HashSet<String>,
}

impl<'a> Swagger2Converter<'a> {
  fn new(source: &'a Map<String, Value>) -> Self {
    let body_parameters = object(source.get("parameters"))
      .map(|parameters| {
        parameters
          .iter()
          .filter(|(_, parameter)| location_of(parameter) == Some("body"))
          .map(|(name, _)| name.clone())
          .collect()
      })
      .unwrap_or_default();

    Self {
      source,
      consumes: media_types(source.get("consumes")).unwrap_or_else(|| vec![DEFAULT_MEDIA_TYPE.to_string()]),
      produces: media_types(source.get("produces")).unwrap_or_else(|| vec![DEFAULT_MEDIA_TYPE.to_string()]),
      body_parameters,
    }
  }

  fn convert(&self) -> Value {
    let mut out = Map::new();
    out.insert("openapi".to_string(), json!(CONVERTED_VERSION));
    for key in ["info", "tags", "security", "externalDocs"] {
      if let Some(value) = self.source.get(key) {
        out.insert(key.to_string(), value.clone());
      }
    }
    out.insert("servers".to_string(), self.servers());
    for (key, value) in self.source {
      if key.starts_with("x-") {
        out.insert(key.clone(), value.clone());
      }
    }
    out.insert("paths".to_string(), Value::Object(self.paths()));

    let components = self.components();
    if !components.is_empty() {
      out.insert("components".to_string(), Value::Object(components));
    }

    let mut document = Value::Object(out);
    self.repoint_references(&mut document);
    document
  }

  fn servers(&self) -> Value {
    let base_path = self.source.get("basePath").and_then(Value::as_str).unwrap_or("");
    let Some(host) = self.source.get("host").and_then(Value::as_str) else {
      let url = if base_path.is_empty() { "/" } else { base_path };
      return json!([{ "url": url }]);
    };

    let schemes = media_types(self.source.get("schemes")).unwrap_or_else(|| vec!["https".to_string()]);
    Value::Array(
      schemes
        .iter()
        .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
        .collect(),
    )
  }

  fn components(&self) -> Map<String, Value> {
    let mut components = Map::new();

    if let Some(definitions) = self.source.get("definitions") {
      components.insert("schemas".to_string(), definitions.clone());
    }

    if let Some(shared) = object(self.source.get("parameters")) {
      let mut parameters = Map::new();
      let mut request_bodies = Map::new();
      for (name, parameter) in shared {
        match location_of(parameter) {
          Some("body") => {
            request_bodies.insert(name.clone(), self.body_request(parameter, &self.consumes));
          }
          Some("formData") => {}
          _ => {
            parameters.insert(name.clone(), convert_parameter(parameter));
          }
        }
      }
      if !parameters.is_empty() {
        components.insert("parameters".to_string(), Value::Object(parameters));
      }
      if !request_bodies.is_empty() {
        components.insert("requestBodies".to_string(), Value::Object(request_bodies));
      }
    }

    if let Some(responses) = object(self.source.get("responses")) {
      let converted = responses
        .iter()
        .map(|(name, response)| (name.clone(), convert_response(response, &self.produces)))
        .collect();
      components.insert("responses".to_string(), Value::Object(converted));
    }

    if let Some(definitions) = object(self.source.get("securityDefinitions")) {
      let schemes = definitions
        .iter()
        .map(|(name, scheme)| (name.clone(), convert_security_scheme(scheme)))
        .collect();
      components.insert("securitySchemes".to_string(), Value::Object(schemes));
    }

    components
  }

  fn paths(&self) -> Map<String, Value> {
    let Some(paths) = object(self.source.get("paths")) else {
      return Map::new();
    };

    paths
      .iter()
      .map(|(path, item)| (path.clone(), self.path_item(item)))
      .collect()
  }

  fn path_item(&self, item: &Value) -> Value {
    let Value::Object(item) = item else {
      return item.clone();
    };

    let shared_parameters = array(item.get("parameters"));
    let mut out = Map::new();
    for (key, value) in item {
      if key == "parameters" {
        let kept: Vec<Value> = shared_parameters
          .iter()
          .filter(|parameter| !self.is_request_parameter(parameter))
          .map(convert_parameter)
          .collect();
        if !kept.is_empty() {
          out.insert(key.clone(), Value::Array(kept));
        }
      } else if key.parse::<HttpMethod>().is_ok() {
        out.insert(key.clone(), self.operation(value, &shared_parameters));
      } else {
        out.insert(key.clone(), value.clone());
      }
    }
    Value::Object(out)
  }

  fn operation(&self, operation: &Value, shared_parameters: &[Value]) -> Value {
    let Value::Object(operation) = operation else {
      return operation.clone();
    };

    let consumes = media_types(operation.get("consumes")).unwrap_or_else(|| self.consumes.clone());
    let produces = media_types(operation.get("produces")).unwrap_or_else(|| self.produces.clone());

    let own_parameters = array(operation.get("parameters"));
    let own_request = own_parameters.iter().any(|parameter| self.is_request_parameter(parameter));
    let request_parameters: Vec<&Value> = if own_request {
      own_parameters.iter().filter(|p| self.is_request_parameter(p)).collect()
    } else {
      shared_parameters.iter().filter(|p| self.is_request_parameter(p)).collect()
    };

    let mut out = Map::new();
    for (key, value) in operation {
      match key.as_str() {
        "consumes" | "produces" | "schemes" => {}
        "parameters" => {
          let kept: Vec<Value> = own_parameters
            .iter()
            .filter(|parameter| !self.is_request_parameter(parameter))
            .map(convert_parameter)
            .collect();
          if !kept.is_empty() {
            out.insert(key.clone(), Value::Array(kept));
          }
        }
        "responses" => {
          let responses = object(Some(value))
            .map(|responses| {
              responses
                .iter()
                .map(|(status, response)| (status.clone(), convert_response(response, &produces)))
                .collect()
            })
            .unwrap_or_default();
          out.insert(key.clone(), Value::Object(responses));
        }
        _ => {
          out.insert(key.clone(), value.clone());
        }
      }
    }

    if let Some(request_body) = self.request_body(&request_parameters, &consumes) {
      out.insert("requestBody".to_string(), request_body);
    }
    Value::Object(out)
  }

  fn request_body(&self, parameters: &[&Value], consumes: &[String]) -> Option<Value> {
    let mut form_fields = Vec::new();
    for parameter in parameters {
      if let Some(name) = self.shared_parameter_name(parameter) {
        if self.body_parameters.contains(name) {
          return Some(json!({ REF_KEY: format!("#/parameters/{name}") }));
        }
        if let Some(shared) = object(self.source.get("parameters")).and_then(|shared| shared.get(name)) {
          form_fields.push(shared);
        }
      } else if location_of(parameter) == Some("body") {
        return Some(self.body_request(parameter, consumes));
      } else {
        form_fields.push(parameter);
      }
    }

    (!form_fields.is_empty()).then(|| form_request(&form_fields, consumes))
  }

  fn body_request(&self, parameter: &Value, consumes: &[String]) -> Value {
    let schema = parameter.get("schema").cloned().unwrap_or_else(|| json!({}));
    let content: Map<String, Value> = consumes
      .iter()
      .map(|media_type| (media_type.clone(), json!({ "schema": schema })))
      .collect();

    let mut body = Map::new();
    copy_keys(parameter, &mut body, &["description", "required"]);
    copy_extensions(parameter, &mut body);
    body.insert("content".to_string(), Value::Object(content));
    Value::Object(body)
  }

  /// Body and form parameters, inline or referenced, end up in the request body.
  fn is_request_parameter(&self, parameter: &Value) -> bool {
    if let Some(name) = self.shared_parameter_name(parameter) {
      return self.body_parameters.contains(name)
        || object(self.source.get("parameters"))
          .and_then(|shared| shared.get(name))
          .is_some_and(|shared| location_of(shared) == Some("formData"));
    }
    matches!(location_of(parameter), Some("body" | "formData"))
  }

  fn shared_parameter_name<'p>(&self, parameter: &'p Value) -> Option<&'p str> {
    parameter
      .get(REF_KEY)
      .and_then(Value::as_str)
      .and_then(|pointer| pointer.strip_prefix("#/parameters/"))
  }

  fn repoint_references(&self, document: &mut Value) {
    for site in find_reference_nodes(document) {
      let Some(repointed) = self.repoint(&site.pointer) else {
        continue;
      };
      if let Some(node) = site.node_mut(document) {
        node.insert(REF_KEY.to_string(), Value::String(repointed));
      }
    }
  }

  fn repoint(&self, pointer: &str) -> Option<String> {
    if let Some(name) = pointer.strip_prefix("#/definitions/") {
      Some(format!("#/components/schemas/{name}"))
    } else if let Some(name) = pointer.strip_prefix("#/parameters/") {
      if self.body_parameters.contains(name) {
        Some(format!("#/components/requestBodies/{name}"))
      } else {
        Some(format!("#/components/parameters/{name}"))
      }
    } else {
      pointer
        .strip_prefix("#/responses/")
        .map(|name| format!("#/components/responses/{name}"))
    }
  }
}

fn convert_parameter(parameter: &Value) -> Value {
  let Value::Object(parameter) = parameter else {
    return parameter.clone();
  };
  if parameter.contains_key(REF_KEY) {
    return Value::Object(parameter.clone());
  }

  let mut out = Map::new();
  let mut schema = Map::new();
  for (key, value) in parameter {
    match key.as_str() {
      "collectionFormat" => {}
      "items" => {
        schema.insert(key.clone(), strip_collection_format(value));
      }
      _ if SCHEMA_KEYWORDS.contains(&key.as_str()) => {
        schema.insert(key.clone(), value.clone());
      }
      _ => {
        out.insert(key.clone(), value.clone());
      }
    }
  }

  if let Some((style, explode)) = parameter
    .get("collectionFormat")
    .and_then(Value::as_str)
    .and_then(|format| collection_style(format, location_of_map(parameter)))
  {
    out.insert("style".to_string(), json!(style));
    out.insert("explode".to_string(), json!(explode));
  }
  if !schema.is_empty() {
    out.insert("schema".to_string(), Value::Object(schema));
  }
  Value::Object(out)
}

fn convert_response(response: &Value, produces: &[String]) -> Value {
  let Value::Object(response) = response else {
    return response.clone();
  };
  if response.contains_key(REF_KEY) {
    return Value::Object(response.clone());
  }

  let mut out = Map::new();
  out.insert(
    "description".to_string(),
    response.get("description").cloned().unwrap_or_else(|| json!("")),
  );

  if let Some(headers) = object(response.get("headers")) {
    let converted = headers
      .iter()
      .map(|(name, header)| (name.clone(), convert_header(header)))
      .collect();
    out.insert("headers".to_string(), Value::Object(converted));
  }

  if let Some(schema) = response.get("schema") {
    let examples = object(response.get("examples"));
    let content: Map<String, Value> = produces
      .iter()
      .map(|media_type| {
        let mut entry = Map::new();
        entry.insert("schema".to_string(), schema.clone());
        if let Some(example) = examples.and_then(|examples| examples.get(media_type)) {
          entry.insert("example".to_string(), example.clone());
        }
        (media_type.clone(), Value::Object(entry))
      })
      .collect();
    out.insert("content".to_string(), Value::Object(content));
  }

  copy_extensions(&Value::Object(response.clone()), &mut out);
  Value::Object(out)
}

fn convert_header(header: &Value) -> Value {
  let Value::Object(header) = header else {
    return header.clone();
  };

  let mut out = Map::new();
  let mut schema = Map::new();
  for (key, value) in header {
    if key == "collectionFormat" {
      continue;
    }
    if SCHEMA_KEYWORDS.contains(&key.as_str()) {
      schema.insert(key.clone(), value.clone());
    } else {
      out.insert(key.clone(), value.clone());
    }
  }
  out.insert("schema".to_string(), Value::Object(schema));
  Value::Object(out)
}

fn convert_security_scheme(scheme: &Value) -> Value {
  let mut out = Map::new();
  match scheme.get("type").and_then(Value::as_str) {
    Some("basic") => {
      out.insert("type".to_string(), json!("http"));
      out.insert("scheme".to_string(), json!("basic"));
    }
    Some("oauth2") => {
      let scopes = scheme.get("scopes").cloned().unwrap_or_else(|| json!({}));
      let mut flow = Map::new();
      copy_keys(scheme, &mut flow, &["authorizationUrl", "tokenUrl"]);
      flow.insert("scopes".to_string(), scopes);
      let flow_name = match scheme.get("flow").and_then(Value::as_str) {
        Some("password") => "password",
        Some("application") => "clientCredentials",
        Some("accessCode") => "authorizationCode",
        _ => "implicit",
      };
      out.insert("type".to_string(), json!("oauth2"));
      out.insert("flows".to_string(), json!({ flow_name: flow }));
    }
    _ => {
      copy_keys(scheme, &mut out, &["type", "name", "in"]);
    }
  }
  copy_keys(scheme, &mut out, &["description"]);
  copy_extensions(scheme, &mut out);
  Value::Object(out)
}

fn form_request(fields: &[&Value], consumes: &[String]) -> Value {
  let mut properties = Map::new();
  let mut required = Vec::new();
  let mut has_file = false;

  for field in fields {
    let Some(name) = field.get("name").and_then(Value::as_str) else {
      continue;
    };
    let mut schema = convert_parameter(field).get("schema").cloned().unwrap_or_else(|| json!({}));
    if schema.get("type").and_then(Value::as_str) == Some("file") {
      has_file = true;
      schema = json!({ "type": "string", "format": "binary" });
    }
    if let Some(description) = field.get("description")
      && let Value::Object(schema) = &mut schema
    {
      schema.insert("description".to_string(), description.clone());
    }
    if field.get("required").and_then(Value::as_bool) == Some(true) {
      required.push(json!(name));
    }
    properties.insert(name.to_string(), schema);
  }

  let media_type = if has_file || consumes.iter().any(|media_type| media_type == MULTIPART) {
    MULTIPART
  } else {
    FORM_URLENCODED
  };

  let mut schema = json!({ "type": "object", "properties": properties });
  if !required.is_empty() {
    schema["required"] = Value::Array(required);
  }
  json!({ "content": { media_type: { "schema": schema } } })
}

fn collection_style(format: &str, location: Option<&str>) -> Option<(&'static str, bool)> {
  let simple = matches!(location, Some("path" | "header"));
  match format {
    "csv" if simple => Some(("simple", false)),
    "csv" => Some(("form", false)),
    "multi" => Some(("form", true)),
    "ssv" => Some(("spaceDelimited", false)),
    "pipes" => Some(("pipeDelimited", false)),
    _ => None,
  }
}

fn strip_collection_format(items: &Value) -> Value {
  match items {
    Value::Object(items) => Value::Object(
      items
        .iter()
        .filter(|(key, _)| *key != "collectionFormat")
        .map(|(key, value)| {
          let value = if key == "items" {
            strip_collection_format(value)
          } else {
            value.clone()
          };
          (key.clone(), value)
        })
        .collect(),
    ),
    other => other.clone(),
  }
}

fn media_types(value: Option<&Value>) -> Option<Vec<String>> {
  let types: Vec<String> = value?
    .as_array()?
    .iter()
    .filter_map(Value::as_str)
    .map(str::to_string)
    .collect();
  (!types.is_empty()).then_some(types)
}

fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
  value.and_then(Value::as_object)
}

fn array(value: Option<&Value>) -> Vec<Value> {
  value.and_then(Value::as_array).cloned().unwrap_or_default()
}

fn location_of(parameter: &Value) -> Option<&str> {
  parameter.get("in").and_then(Value::as_str)
}

fn location_of_map(parameter: &Map<String, Value>) -> Option<&str> {
  parameter.get("in").and_then(Value::as_str)
}

fn copy_keys(from: &Value, to: &mut Map<String, Value>, keys: &[&str]) {
  for key in keys {
    if let Some(value) = from.get(*key) {
      to.insert((*key).to_string(), value.clone());
    }
  }
}

fn copy_extensions(from: &Value, to: &mut Map<String, Value>) {
  if let Some(from) = from.as_object() {
    for (key, value) in from {
      if key.starts_with("x-") {
        to.insert(key.clone(), value.clone());
      }
    }
  }
}

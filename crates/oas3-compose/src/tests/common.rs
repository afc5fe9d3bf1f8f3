use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

pub(crate) fn petstore_v3() -> Value {
  json!({
    "openapi": "3.0.3",
    "info": { "title": "Petstore", "version": "1.0.0" },
    "servers": [{ "url": "https://petstore.example.com/v1" }],
    "paths": {
      "/pets": {
        "get": {
          "operationId": "listPets",
          "summary": "List pets",
          "x-internal": false,
          "responses": {
            "200": {
              "description": "pets",
              "content": {
                "application/json": {
                  "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                }
              }
            }
          }
        }
      },
      "/admin": {
        "get": {
          "operationId": "admin",
          "responses": { "200": { "$ref": "#/components/responses/Admin" } }
        }
      }
    },
    "components": {
      "schemas": {
        "Pet": {
          "type": "object",
          "properties": { "id": { "type": "integer" }, "category": { "$ref": "#/components/schemas/Category" } }
        },
        "Category": { "type": "object", "properties": { "name": { "type": "string" } } },
        "Secret": { "type": "string" }
      },
      "responses": {
        "Admin": {
          "description": "admin",
          "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Secret" } } }
        }
      }
    }
  })
}

pub(crate) fn store_swagger2() -> Value {
  json!({
    "swagger": "2.0",
    "info": { "title": "Store", "version": "2.0.0" },
    "host": "store.example.com",
    "basePath": "/api",
    "paths": {
      "/orders": {
        "get": {
          "operationId": "listOrders",
          "produces": ["application/json"],
          "responses": {
            "200": {
              "description": "orders",
              "schema": { "type": "array", "items": { "$ref": "#/definitions/Pet" } }
            }
          }
        }
      }
    },
    "definitions": {
      "Pet": { "type": "object", "properties": { "sku": { "type": "string" } } }
    }
  })
}

pub(crate) fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
  let path = dir.join(name);
  std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
  path
}

pub(crate) fn source_dir() -> (TempDir, String, String) {
  let dir = tempfile::tempdir().unwrap();
  let petstore = write_json(dir.path(), "petstore.json", &petstore_v3());
  let store = write_json(dir.path(), "store.json", &store_swagger2());
  (
    dir,
    petstore.to_string_lossy().into_owned(),
    store.to_string_lossy().into_owned(),
  )
}

use serde_json::{Value, json};

pub(crate) fn petstore_doc() -> Value {
  json!({
    "openapi": "3.0.0",
    "info": { "title": "Swagger Petstore", "version": "1.0.0" },
    "paths": {
      "/pets": {
        "get": {
          "operationId": "findPets",
          "tags": ["pets"],
          "responses": {
            "200": {
              "description": "pet response",
              "content": {
                "application/json": {
                  "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                }
              }
            }
          }
        },
        "post": {
          "operationId": "addPet",
          "requestBody": {
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } }
          },
          "responses": {
            "200": {
              "description": "pet response",
              "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
            }
          }
        }
      },
      "/pets/{id}": {
        "get": {
          "operationId": "findPetById",
          "responses": {
            "200": {
              "description": "pet response",
              "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
            },
            "default": {
              "description": "unexpected error",
              "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
            }
          }
        },
        "delete": {
          "operationId": "deletePet",
          "responses": {
            "204": { "description": "pet deleted" },
            "default": {
              "description": "unexpected error",
              "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
            }
          }
        }
      }
    },
    "components": {
      "schemas": {
        "Pet": {
          "allOf": [
            { "$ref": "#/components/schemas/NewPet" },
            { "type": "object", "required": ["id"], "properties": { "id": { "type": "integer", "format": "int64" } } }
          ]
        },
        "NewPet": {
          "type": "object",
          "required": ["name"],
          "properties": { "name": { "type": "string" }, "tag": { "type": "string" } }
        },
        "Error": {
          "type": "object",
          "required": ["code", "message"],
          "properties": { "code": { "type": "integer", "format": "int32" }, "message": { "type": "string" } }
        }
      }
    }
  })
}

pub(crate) fn store_doc() -> Value {
  json!({
    "openapi": "3.0.0",
    "info": { "title": "Store", "version": "0.1.0" },
    "paths": {
      "/orders": {
        "get": {
          "operationId": "listOrders",
          "parameters": [{ "$ref": "#/components/parameters/limit" }],
          "responses": {
            "200": { "$ref": "#/components/responses/Orders" }
          }
        }
      }
    },
    "components": {
      "parameters": {
        "limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
      },
      "responses": {
        "Orders": {
          "description": "orders",
          "content": {
            "application/json": {
              "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
            }
          }
        }
      },
      "schemas": {
        "Pet": { "type": "object", "properties": { "sku": { "type": "string" } } }
      }
    }
  })
}

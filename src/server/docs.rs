//! OpenAPI document derived from the route table
//!
//! Nothing here is written by hand per endpoint: paths come from
//! [`ResourceRegistry::route_table`] and schemas from each resource's rule
//! table.

use serde_json::{Map, Value, json};

use super::resource_registry::{ResourceRegistry, RouteInfo, RouteKind};
use crate::core::validation::{FieldKind, FieldRule, RuleSet};

pub const OPENAPI_VERSION: &str = "3.0.3";

/// Build the OpenAPI document
pub fn openapi(registry: &ResourceRegistry, cookie_name: &str) -> Value {
    let mut paths = Map::new();
    for route in registry.route_table() {
        let entry = paths
            .entry(route.path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            methods.insert(route.method.to_ascii_lowercase(), operation(&route));
        }
    }

    let mut schemas = Map::new();
    for descriptor in registry.descriptors() {
        let rules = descriptor.rules();
        schemas.insert(descriptor.title().to_string(), record_schema(&rules, true));
        schemas.insert(
            format!("{}Update", descriptor.title()),
            record_schema(&rules, false),
        );
    }
    schemas.insert("CreatedId".to_string(), created_id_schema());
    schemas.insert("Message".to_string(), message_schema());
    schemas.insert("ValidationErrors".to_string(), validation_errors_schema());

    let tags: Vec<Value> = registry
        .descriptors()
        .map(|d| json!({ "name": d.tag(), "description": d.description() }))
        .collect();

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Nature Notes API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Trails, wildlife sightings, hiking gear and hikers. Reads are public; writes need a Google sign-in session.",
        },
        "tags": tags,
        "paths": paths,
        "components": {
            "schemas": schemas,
            "securitySchemes": {
                "session": { "type": "apiKey", "in": "cookie", "name": cookie_name }
            }
        }
    })
}

fn operation(route: &RouteInfo) -> Value {
    let mut op = Map::new();
    op.insert("summary".into(), json!(route.summary));
    op.insert("tags".into(), json!([route.tag]));
    op.insert(
        "operationId".into(),
        json!(format!("{:?}{}", route.kind, route.title).to_lowercase()),
    );

    if route.kind.targets_record() {
        op.insert(
            "parameters".into(),
            json!([{
                "name": "id",
                "in": "path",
                "required": true,
                "description": format!("{} ID (24 hex characters)", route.title),
                "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }
            }]),
        );
    }

    match route.kind {
        RouteKind::Create => {
            op.insert("requestBody".into(), request_body(route.title));
        }
        RouteKind::Update => {
            op.insert(
                "requestBody".into(),
                request_body(&format!("{}Update", route.title)),
            );
        }
        _ => {}
    }

    if route.auth_required {
        op.insert("security".into(), json!([{ "session": [] }]));
    }

    let mut responses = Map::new();
    responses.insert(
        route.success_status.to_string(),
        success_response(route),
    );
    for status in route.failure_statuses {
        responses.insert(status.to_string(), failure_response(*status));
    }
    op.insert("responses".into(), Value::Object(responses));

    Value::Object(op)
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn request_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(schema) } }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn success_response(route: &RouteInfo) -> Value {
    match route.kind {
        RouteKind::List => json_response(
            "All records",
            json!({ "type": "array", "items": schema_ref(route.title) }),
        ),
        RouteKind::Get => json_response("The record", schema_ref(route.title)),
        RouteKind::Create => json_response("Created", schema_ref("CreatedId")),
        RouteKind::Update => json_response("Updated", schema_ref("Message")),
        RouteKind::Delete => json!({ "description": "Deleted" }),
    }
}

fn failure_response(status: u16) -> Value {
    match status {
        400 => json_response("Malformed ID or body", schema_ref("Message")),
        401 => json_response("Not signed in", schema_ref("Message")),
        404 => json_response("Not found", schema_ref("Message")),
        422 => json_response("Validation failed", schema_ref("ValidationErrors")),
        _ => json_response("Server error", schema_ref("Message")),
    }
}

/// JSON schema of one field
pub fn field_schema(rule: &FieldRule) -> Value {
    let mut schema = match rule.kind {
        FieldKind::Text => json!({ "type": "string" }),
        FieldKind::Number { min, max } => {
            let mut s = json!({ "type": "number" });
            if let Some(min) = min {
                s["minimum"] = json!(min);
            }
            if let Some(max) = max {
                s["maximum"] = json!(max);
            }
            s
        }
        FieldKind::Integer { min } => {
            let mut s = json!({ "type": "integer" });
            if let Some(min) = min {
                s["minimum"] = json!(min);
            }
            s
        }
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Email => json!({ "type": "string", "format": "email" }),
        FieldKind::OneOf(values) => json!({ "type": "string", "enum": values }),
        FieldKind::Reference => json!({ "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }),
    };
    schema["description"] = json!(rule.label);
    schema
}

fn record_schema(rules: &RuleSet, create: bool) -> Value {
    let properties: Map<String, Value> = rules
        .rules()
        .iter()
        .map(|rule| (rule.field.to_string(), field_schema(rule)))
        .collect();

    let mut schema = json!({ "type": "object", "properties": properties });
    if create {
        let required: Vec<&str> = rules.required_fields().collect();
        schema["required"] = json!(required);
    } else {
        schema["minProperties"] = json!(1);
    }
    schema
}

fn created_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "id": { "type": "string", "pattern": "^[0-9a-f]{24}$" } },
        "required": ["id"]
    })
}

fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "message": { "type": "string" } },
        "required": ["message"]
    })
}

fn validation_errors_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "errors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "message": { "type": "string" }
                    }
                }
            }
        },
        "required": ["message", "errors"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Hikers, Trails};

    fn document() -> Value {
        let mut registry = ResourceRegistry::new();
        registry.register_resource::<Trails>();
        registry.register_resource::<Hikers>();
        openapi(&registry, "nature_notes.sid")
    }

    #[test]
    fn test_paths_follow_route_table() {
        let doc = document();
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 4);

        let collection = &doc["paths"]["/trails"];
        assert!(collection["get"].is_object());
        assert!(collection["post"]["security"].is_array());
        assert!(collection["get"].get("security").is_none());

        let record = &doc["paths"]["/hikers/{id}"];
        assert!(record["put"]["responses"]["422"].is_object());
        assert!(record["delete"]["responses"]["204"].is_object());
        assert_eq!(record["get"]["parameters"][0]["name"], "id");
    }

    #[test]
    fn test_schemas_follow_rules() {
        let doc = document();
        let trail = &doc["components"]["schemas"]["Trail"];
        assert_eq!(
            trail["properties"]["difficulty"]["enum"],
            json!(["Easy", "Moderate", "Hard", "Expert"])
        );
        assert_eq!(trail["properties"]["rating"]["maximum"], json!(5.0));
        assert!(
            !trail["required"]
                .as_array()
                .unwrap()
                .contains(&json!("rating"))
        );

        let hiker_update = &doc["components"]["schemas"]["HikerUpdate"];
        assert!(hiker_update.get("required").is_none());
        assert_eq!(hiker_update["minProperties"], 1);
        assert_eq!(
            doc["components"]["schemas"]["Hiker"]["properties"]["email"]["format"],
            "email"
        );
    }

    #[test]
    fn test_security_scheme_uses_cookie_name() {
        let doc = document();
        assert_eq!(
            doc["components"]["securitySchemes"]["session"]["name"],
            "nature_notes.sid"
        );
        assert_eq!(doc["openapi"], OPENAPI_VERSION);
        assert_eq!(doc["tags"].as_array().unwrap().len(), 2);
    }
}

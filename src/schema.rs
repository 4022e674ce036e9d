//! Structural validation of payloads received from the counterparty.
//!
//! The channel operations work on typed values only. Layers decoding raw
//! payloads validate them first, [update_params_schema] describes the JSON
//! shape of [UpdateParams](crate::channel::UpdateParams) per update type.

use serde_json::{json, Value};

use crate::channel::UpdateType;

/// Validates a payload against a JSON schema.
pub trait SchemaValidator {
    /// `None` if the payload is valid, otherwise one message per violation.
    fn validate(&self, payload: &Value, schema: &Value) -> Option<Vec<String>>;
}

/// [SchemaValidator] backed by the `jsonschema` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, payload: &Value, schema: &Value) -> Option<Vec<String>> {
        let validator = match jsonschema::validator_for(schema) {
            Ok(validator) => validator,
            Err(e) => return Some(vec![format!("invalid schema: {e}")]),
        };

        let violations: Vec<String> = validator
            .iter_errors(payload)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    format!("(root): {e}")
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect();

        if violations.is_empty() {
            None
        } else {
            Some(violations)
        }
    }
}

fn address() -> Value {
    json!({ "type": "string", "pattern": "^0x[0-9a-fA-F]{40}$" })
}

fn bytes32() -> Value {
    json!({ "type": "string", "pattern": "^0x[0-9a-fA-F]{64}$" })
}

fn amount() -> Value {
    json!({ "type": "string", "pattern": "^[0-9]+$" })
}

fn balance() -> Value {
    json!({
        "type": "object",
        "required": ["to", "amount"],
        "properties": {
            "to": { "type": "array", "items": address(), "minItems": 2, "maxItems": 2 },
            "amount": { "type": "array", "items": amount(), "minItems": 2, "maxItems": 2 },
        },
    })
}

fn details(update_type: UpdateType, required: &[&str], properties: Value) -> Value {
    let mut properties = properties;
    properties["type"] = json!({ "const": update_type.as_str() });
    properties["meta"] = json!({});

    let mut required: Vec<&str> = required.to_vec();
    required.push("type");

    json!({
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

/// JSON schema of an [UpdateParams](crate::channel::UpdateParams) payload of
/// the given type.
pub fn update_params_schema(update_type: UpdateType) -> Value {
    let details = match update_type {
        UpdateType::Setup => details(
            update_type,
            &["counterpartyIdentifier", "timeout", "networkContext"],
            json!({
                "counterpartyIdentifier": { "type": "string", "minLength": 1 },
                "timeout": amount(),
                "networkContext": {
                    "type": "object",
                    "required": ["chainId", "channelFactoryAddress", "transferRegistryAddress"],
                    "properties": {
                        "chainId": { "type": "integer", "minimum": 1 },
                        "channelFactoryAddress": address(),
                        "transferRegistryAddress": address(),
                    },
                },
            }),
        ),
        UpdateType::Deposit => details(
            update_type,
            &["channelAddress", "assetId"],
            json!({
                "channelAddress": address(),
                "assetId": address(),
            }),
        ),
        UpdateType::Create => details(
            update_type,
            &[
                "channelAddress",
                "balance",
                "assetId",
                "transferDefinition",
                "transferInitialState",
                "timeout",
            ],
            json!({
                "channelAddress": address(),
                "balance": balance(),
                "assetId": address(),
                "transferDefinition": address(),
                "transferInitialState": {
                    "type": "object",
                    "required": ["balance"],
                    "properties": { "balance": balance() },
                },
                "timeout": amount(),
            }),
        ),
        UpdateType::Resolve => details(
            update_type,
            &["channelAddress", "transferId", "transferResolver"],
            json!({
                "channelAddress": address(),
                "transferId": bytes32(),
                "transferResolver": {},
            }),
        ),
    };

    json!({
        "type": "object",
        "required": ["channelAddress", "details"],
        "properties": {
            "channelAddress": address(),
            "details": details,
        },
    })
}

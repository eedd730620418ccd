//! Catalog document validation against the bundled JSON Schema.
//!
//! The schema ships inside the binary so loaders do not depend on the working
//! directory. Validation runs on the raw JSON value before deserialization,
//! which turns structural mistakes (missing ids, ids with path separators)
//! into one readable report instead of a serde error for the first field.

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

const CATALOG_SCHEMA_TEXT: &str = include_str!("../schema/catalog.schema.json");

fn catalog_schema() -> Result<&'static Value> {
    static SCHEMA: OnceLock<Option<Value>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| serde_json::from_str(CATALOG_SCHEMA_TEXT).ok())
        .as_ref()
        .ok_or_else(|| anyhow!("bundled catalog schema is not valid JSON"))
}

/// Validator compiled from the bundled schema on first use.
fn catalog_validator() -> Result<&'static JSONSchema> {
    static VALIDATOR: OnceLock<Result<JSONSchema, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema = catalog_schema().map_err(|err| err.to_string())?;
            JSONSchema::compile(schema).map_err(|err| format!("compiling catalog schema: {err}"))
        })
        .as_ref()
        .map_err(|msg| anyhow!("{msg}"))
}

/// Validate an unwrapped catalog object, collecting every schema violation.
pub(crate) fn validate_catalog_value(value: &Value) -> Result<()> {
    let compiled = catalog_validator()?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed schema validation:\n{details}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_nested_groups_and_controls() {
        let value = json!({
            "groups": [{
                "id": "ac",
                "title": "Access Control",
                "groups": [{"id": "ac-sub", "controls": [{"id": "ac-9"}]}],
                "controls": [{
                    "id": "ac-1",
                    "params": [{"id": "ac-1_prm_1", "values": ["daily"]}],
                    "parts": [{"name": "statement", "parts": [{"name": "item", "prose": "x"}]}],
                    "controls": [{"id": "ac-1.1"}]
                }]
            }]
        });
        validate_catalog_value(&value).expect("fixture should validate");
    }

    #[test]
    fn reports_every_violation() {
        let value = json!({
            "controls": [
                {"id": "ac/1"},
                {"id": "ac-2", "parts": [{"prose": "no name"}]}
            ]
        });
        let err = validate_catalog_value(&value).expect_err("should fail");
        let message = err.to_string();
        assert!(message.contains("/controls/0/id"), "{message}");
        assert!(message.contains("/controls/1/parts/0"), "{message}");
    }

    #[test]
    fn dot_segments_are_not_ids() {
        for id in [".", ".."] {
            let value = json!({ "groups": [{ "id": id, "controls": [{ "id": "ac-1" }] }] });
            let err = validate_catalog_value(&value).expect_err("dot group id");
            assert!(err.to_string().contains("/groups/0/id"), "{err}");

            let value = json!({ "controls": [{ "id": id }] });
            assert!(validate_catalog_value(&value).is_err());
        }
        let hidden = json!({ "groups": [{ "id": ".ac", "controls": [{ "id": "ac-1" }] }] });
        validate_catalog_value(&hidden).expect("leading dot is allowed");
    }

    #[test]
    fn validator_is_compiled_once() {
        let first = catalog_validator().expect("validator");
        let second = catalog_validator().expect("validator");
        assert!(std::ptr::eq(first, second));
    }
}

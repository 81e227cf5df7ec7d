//! Response shaping: locating result arrays and projecting records.

use log::debug;
use serde_json::{Map, Value};

use super::error::BridgeError;
use super::models::Record;
use crate::selector::{self, PathOutcome};

/// Locates the result objects inside a response payload.
///
/// When the payload carries the accessor key, its value is the result set;
/// otherwise the whole payload is. A lone object is treated as a one-element
/// result set, and anything that is neither object nor array as empty.
pub fn locate_results(payload: &Value, accessor: &str) -> Vec<Value> {
    let target = match payload.get(accessor) {
        Some(value) => value,
        None => payload,
    };
    match target {
        Value::Array(items) => items.clone(),
        Value::Object(_) => vec![target.clone()],
        _ => Vec::new(),
    }
}

/// Projects one upstream object into a record with exactly the requested
/// fields.
///
/// Plain fields read top-level keys, path expressions are evaluated into the
/// object. Data that is absent yields `null`; a selector that cannot be
/// parsed fails the whole projection.
pub fn build_record(fields: &[String], object: &Value) -> Result<Record, BridgeError> {
    let mut values = Map::new();
    for field in fields {
        if selector::is_path_selector(field) {
            match selector::evaluate(field, object) {
                PathOutcome::Found(value) => {
                    values.insert(field.clone(), value);
                }
                PathOutcome::MissingLeaf => {
                    debug!("{} was not found, setting value to null", field);
                    values.insert(field.clone(), Value::Null);
                }
                PathOutcome::InvalidExpression(reason) => {
                    return Err(BridgeError::PathEvaluation {
                        selector: field.clone(),
                        reason,
                    });
                }
            }
        } else {
            let value = object.get(field).cloned().unwrap_or(Value::Null);
            values.insert(field.clone(), value);
        }
    }
    Ok(Record {
        fields: fields.to_vec(),
        values,
    })
}

/// The fields a record should carry: the caller's, or when none were
/// requested, every top-level key of the sample object in its natural order.
pub fn effective_fields(fields: &[String], sample: &Value) -> Vec<String> {
    if !fields.is_empty() {
        return fields.to_vec();
    }
    match sample.as_object() {
        Some(object) => object.keys().cloned().collect(),
        None => Vec::new(),
    }
}

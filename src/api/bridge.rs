//! The bridge orchestrator: count, retrieve, and search.
//!
//! All three operations share one preparation pipeline (structure dispatch,
//! placeholder substitution, path building, accessor resolution) and differ
//! only in how they execute the request and shape its payload.

use std::collections::HashMap;

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use super::client::Transport;
use super::error::BridgeError;
use super::models::{Count, QueryRequest, Record, RecordList};
use super::records;
use super::structures::{self, ParsedQuery, PathPlan, Structure};
use crate::qualification;
use crate::selector::{self, PathOutcome};

static PROPERTY_NAME_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"properties\.(.+)").expect("valid property pattern"));

static PROPERTY_NAME_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"properties\["([^"]+)"\]"#).expect("valid property pattern"));

/// Translates tabular queries into HubSpot CRM v3 requests.
pub struct Bridge<T: Transport> {
    transport: T,
}

/// Everything the operations need after the shared preparation pipeline.
struct PreparedRequest {
    path: String,
    accessor: String,
    params: HashMap<String, String>,
    /// The resolved `body` parameter value, before the path builder consumed
    /// its key. Its presence switches search into POST mode.
    body: Option<String>,
}

impl<T: Transport> Bridge<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Counts the records matching the query.
    pub async fn count(&self, request: &QueryRequest) -> Result<Count, BridgeError> {
        trace!("Counting records");
        trace!("  Structure: {}", request.structure);
        trace!("  Query: {}", request.query);

        let prepared = self.prepare(request)?;
        let payload = self
            .transport
            .get(&target(&prepared.path, &prepared.params))
            .await?;
        derive_count(&payload)
    }

    /// Retrieves the single record matching the query.
    pub async fn retrieve(&self, request: &QueryRequest) -> Result<Record, BridgeError> {
        trace!("Retrieving record");
        trace!("  Structure: {}", request.structure);
        trace!("  Query: {}", request.query);
        trace!("  Fields: {}", request.fields.join(", "));

        let prepared = self.prepare(request)?;
        let payload = self
            .transport
            .get(&target(&prepared.path, &prepared.params))
            .await?;
        let results = records::locate_results(&payload, &prepared.accessor);

        match results.as_slice() {
            [] => {
                debug!("No results found for query: {}", request.query);
                Ok(Record::empty())
            }
            [only] => {
                let fields = records::effective_fields(&request.fields, only);
                records::build_record(&fields, only)
            }
            _ => Err(BridgeError::MultipleResults),
        }
    }

    /// Searches for the records matching the query, one page at a time.
    pub async fn search(&self, request: &QueryRequest) -> Result<RecordList, BridgeError> {
        trace!("Searching records");
        trace!("  Structure: {}", request.structure);
        trace!("  Query: {}", request.query);
        trace!("  Fields: {}", request.fields.join(", "));

        let PreparedRequest {
            path,
            accessor,
            mut params,
            body,
        } = self.prepare(request)?;

        let payload = match body {
            Some(raw) => {
                let mut body = parse_search_body(&raw)?;
                apply_search_defaults(&mut body, request.metadata_value("order"))?;
                self.transport.post(&path, &Value::Object(body)).await?
            }
            None => {
                if let Some(page) = request.metadata_value("page") {
                    params
                        .entry("after".to_string())
                        .or_insert_with(|| page.to_string());
                }
                params
                    .entry("limit".to_string())
                    .or_insert_with(|| "100".to_string());
                if !request.fields.is_empty() {
                    if let Some(names) = property_names(&request.fields) {
                        params.insert("properties".to_string(), names);
                    }
                }
                self.transport.get(&target(&path, &params)).await?
            }
        };

        let results = records::locate_results(&payload, &accessor);
        let mut fields = request.fields.clone();
        let mut shaped = Vec::with_capacity(results.len());
        if let Some(first) = results.first() {
            fields = records::effective_fields(&fields, first);
            for object in &results {
                shaped.push(records::build_record(&fields, object)?);
            }
        }

        let mut metadata = HashMap::new();
        metadata.insert("next_page".to_string(), next_page_token(&payload));

        Ok(RecordList {
            fields,
            records: shaped,
            metadata,
        })
    }

    /// The shared pipeline: dispatch the structure, substitute placeholders,
    /// build the path, and resolve the accessor. Each stage takes the
    /// previous stage's output and returns a new value.
    fn prepare(&self, request: &QueryRequest) -> Result<PreparedRequest, BridgeError> {
        let segments = structures::split_structure(&request.structure);
        let root = segments.first().map(String::as_str).unwrap_or("");
        let structure = Structure::resolve(root)?;

        let parsed = structure.parse_query(&request.query);
        let parsed = resolve_placeholders(parsed, &request.parameters)?;
        let body = parsed.params.get("body").cloned();

        let PathPlan { path, params } = structure.build_path(parsed)?;
        let (accessor, params) = structure.resolve_accessor(params)?;

        Ok(PreparedRequest {
            path,
            accessor,
            params,
            body,
        })
    }
}

/// Substitutes placeholders in the path and every parameter value.
fn resolve_placeholders(
    parsed: ParsedQuery,
    scope: &HashMap<String, String>,
) -> Result<ParsedQuery, BridgeError> {
    let ParsedQuery { raw_path, params } = parsed;
    let raw_path = raw_path
        .map(|path| qualification::parse(&path, scope))
        .transpose()?;
    let mut resolved = HashMap::with_capacity(params.len());
    for (name, value) in params {
        resolved.insert(name, qualification::parse(&value, scope)?);
    }
    Ok(ParsedQuery {
        raw_path,
        params: resolved,
    })
}

/// Assembles the request target from the path and remaining parameters.
///
/// Parameters are appended in name order so the same query always produces
/// the same target. Values are URL-encoded, names are forwarded as is.
fn target(path: &str, params: &HashMap<String, String>) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by(|left, right| left.0.cmp(right.0));
    let query: Vec<String> = pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", path, query.join("&"))
}

/// Derives a count from a payload: an explicit total when the response is a
/// collection, one when it is a single object carrying an id.
fn derive_count(payload: &Value) -> Result<Count, BridgeError> {
    if let Some(total) = payload.get("total_entries").and_then(Value::as_u64) {
        return Ok(Count(total));
    }
    if payload.get("id").is_some() {
        return Ok(Count(1));
    }
    Err(BridgeError::UnexpectedPayload)
}

fn parse_search_body(raw: &str) -> Result<Map<String, Value>, BridgeError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(other) => Err(BridgeError::MalformedQuery(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(parse_error) => Err(BridgeError::MalformedQuery(parse_error.to_string())),
    }
}

/// Fills in what a search body must carry: a limit (HubSpot defaults to 10
/// otherwise) and, when the caller ordered the results and the body does not
/// sort already, a single-property `sorts` clause.
fn apply_search_defaults(
    body: &mut Map<String, Value>,
    order: Option<&str>,
) -> Result<(), BridgeError> {
    if let Some(order) = order {
        if !body.contains_key("sorts") {
            let items = qualification::parse_order(order);
            match items.as_slice() {
                [(property, direction)] => {
                    let direction = match direction.as_str() {
                        "DESC" => "DESCENDING",
                        _ => "ASCENDING",
                    };
                    body.insert(
                        "sorts".to_string(),
                        json!([{ "propertyName": property, "direction": direction }]),
                    );
                }
                items => {
                    return Err(BridgeError::UnsupportedSort {
                        properties: items.len(),
                    });
                }
            }
        }
    }
    body.entry("limit").or_insert_with(|| json!(100));
    Ok(())
}

/// Collects the distinct property names referenced by the field selectors,
/// in field order, as the comma-separated `properties` parameter value.
fn property_names(fields: &[String]) -> Option<String> {
    let mut names: Vec<String> = Vec::new();
    for field in fields {
        let name = PROPERTY_NAME_BRACKET
            .captures(field)
            .or_else(|| PROPERTY_NAME_DOT.captures(field))
            .map(|captures| captures[1].to_string());
        if let Some(name) = name {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join(","))
    }
}

/// The continuation token HubSpot buries under `paging.next.after`, empty
/// when there is no next page.
fn next_page_token(payload: &Value) -> String {
    match selector::evaluate("$.paging.next.after", payload) {
        PathOutcome::Found(Value::String(token)) => token,
        _ => String::new(),
    }
}

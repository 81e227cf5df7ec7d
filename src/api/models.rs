//! Request and result types exchanged with the bridge.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// A generic tabular query handed to the bridge.
///
/// The `query` string carries `name=value` pairs (an upstream path first for
/// Adhoc), `fields` name the output columns, `parameters` supply placeholder
/// values, and `metadata` carries paging and ordering hints.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub structure: String,
    pub query: String,
    pub fields: Vec<String>,
    pub parameters: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
}

impl QueryRequest {
    pub fn new(structure: impl Into<String>) -> Self {
        Self {
            structure: structure.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }
}

/// A single shaped record: one value per requested field.
///
/// `values` preserves insertion order, so a record built without explicit
/// fields lists its values in the order the upstream object declared them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub fields: Vec<String>,
    pub values: Map<String, Value>,
}

impl Record {
    /// The no-match result: no fields, no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

/// An ordered page of records plus paging metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordList {
    pub fields: Vec<String>,
    pub records: Vec<Record>,
    pub metadata: HashMap<String, String>,
}

impl RecordList {
    /// The continuation token for the next page, empty when exhausted.
    pub fn next_page(&self) -> &str {
        self.metadata
            .get("next_page")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Result of a count operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Count(pub u64);

impl Count {
    pub fn value(&self) -> u64 {
        self.0
    }
}

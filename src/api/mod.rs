//! HubSpot CRM v3 bridge module.
//!
//! The bridge answers three operations over the HubSpot API: count the
//! records matching a query, retrieve exactly one, and search one page at a
//! time. Queries arrive as generic `name=value` qualifications with
//! placeholder support and are translated into the API's paths, parameters,
//! and search bodies.

pub mod bridge;
pub mod client;
pub mod error;
pub mod models;
pub mod records;
pub mod structures;

pub use bridge::Bridge;
pub use client::{HubspotClient, Transport};
pub use error::BridgeError;
pub use models::{Count, QueryRequest, Record, RecordList};
pub use structures::{ParsedQuery, PathPlan, Structure};

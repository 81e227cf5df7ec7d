pub mod api;
pub mod config;
pub mod qualification;
pub mod selector;

pub use api::{
    Bridge, BridgeError, Count, HubspotClient, QueryRequest, Record, RecordList, Structure,
    Transport,
};
pub use config::HubspotConfig;

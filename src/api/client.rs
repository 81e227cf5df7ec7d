//! HTTP transport for the HubSpot CRM v3 API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error, trace};
use serde_json::{Map, Value};

use super::error::BridgeError;
use crate::config::HubspotConfig;

/// Boundary contract for executing upstream requests.
///
/// The bridge only ever issues a GET against a path-and-query or a POST with
/// a JSON body, both relative to a configured base URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path_and_query: &str) -> Result<Value, BridgeError>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value, BridgeError>;
}

/// HubSpot API client with connection pooling.
#[derive(Clone)]
pub struct HubspotClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HubspotClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("hubspot-bridge/1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http_client,
        }
    }

    pub fn from_config(config: &HubspotConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    /// Create a client with custom HTTP client configuration.
    pub fn with_custom_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http_client,
        }
    }

    /// Joins the base URL, the target, and the api key query parameter.
    fn authenticated_url(&self, path_and_query: &str) -> String {
        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}hapikey={}",
            self.base_url, path_and_query, separator, self.api_key
        )
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        target: &str,
    ) -> Result<Value, BridgeError> {
        let start = Instant::now();
        let response = request.send().await?;
        debug!(
            "Received response from \"{}\" in {}ms",
            target,
            start.elapsed().as_millis()
        );
        let status = response.status().as_u16();
        trace!("Request response code: {}", status);
        let text = response.text().await?;
        interpret_response(status, &text)
    }
}

#[async_trait]
impl Transport for HubspotClient {
    async fn get(&self, path_and_query: &str) -> Result<Value, BridgeError> {
        let request = self
            .http_client
            .get(self.authenticated_url(path_and_query))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        self.dispatch(request, path_and_query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, BridgeError> {
        let request = self
            .http_client
            .post(self.authenticated_url(path))
            .header("Content-Type", "application/json")
            .json(body);
        self.dispatch(request, path).await
    }
}

/// Turns a raw response into a payload or an upstream error.
///
/// The body is parsed first: HubSpot reports failures through a `message`
/// key, sometimes with a 200 status, so a message always wins over the
/// status code. A body that is not JSON is treated as an empty payload.
fn interpret_response(status: u16, body: &str) -> Result<Value, BridgeError> {
    let payload = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(parse_error) => {
            error!("The response body could not be parsed as JSON: {}", parse_error);
            Value::Object(Map::new())
        }
    };

    if let Some(message) = payload.get("message") {
        let message = match message {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(BridgeError::UpstreamHttp {
            status: Some(status),
            message: format!("The server responded with: \"{}\"", message),
        });
    }

    if status >= 400 {
        return Err(BridgeError::UpstreamHttp {
            status: Some(status),
            message: describe_status(status),
        });
    }

    Ok(payload)
}

fn describe_status(status: u16) -> String {
    match status {
        400 => "400: Bad Request".to_string(),
        401 => "401: Unauthorized".to_string(),
        404 => "404: Not Found".to_string(),
        405 => "405: Method Not Allowed".to_string(),
        500 => "500: Internal Server Error".to_string(),
        other => format!("Unexpected response from server ({})", other),
    }
}

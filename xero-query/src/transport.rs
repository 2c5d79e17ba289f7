#![doc = "HTTP transport: sends rendered queries to the accounting API with reqwest and reads the element list out of the JSON body."]
//
//! # Transport (CLI <-> Core)
//!
//! This module bridges the core [`Transport`] trait to a real `reqwest` client.
//!
//! - Construct [`HttpTransport`] with the API base URL; attach [`Credentials`]
//!   (read from `XERO_ACCESS_TOKEN` / `XERO_TENANT_ID`) before sending real requests.
//! - URL: `<base_url>/<api_stem>/<resource_uri>`, query parameters in request order.
//! - The element list is the array named after the resource (`Contacts`), or the
//!   first array-valued field (in document order) when that key is absent.
//! - `304 Not Modified` is an empty result, not an error.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::env;
use xero_query_core::{FieldMap, Request, Response, Transport, TransportError};

pub const ACCESS_TOKEN_VAR: &str = "XERO_ACCESS_TOKEN";
pub const TENANT_ID_VAR: &str = "XERO_TENANT_ID";

const TENANT_HEADER: &str = "Xero-tenant-id";

/// OAuth2 bearer token and the tenant (organisation) it acts for.
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub tenant_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

impl Credentials {
    pub fn new_from_env() -> anyhow::Result<Self> {
        match (env::var(ACCESS_TOKEN_VAR), env::var(TENANT_ID_VAR)) {
            (Ok(access_token), Ok(tenant_id)) => {
                tracing::info!(
                    access_token_set = !access_token.is_empty(),
                    tenant_id = %tenant_id,
                    "Loaded API credentials from environment"
                );
                Ok(Credentials {
                    access_token,
                    tenant_id,
                })
            }
            (Err(e), _) => {
                tracing::error!(error = ?e, "{ACCESS_TOKEN_VAR} missing in environment");
                Err(anyhow::anyhow!("{ACCESS_TOKEN_VAR} environment variable not set: {e}"))
            }
            (_, Err(e)) => {
                tracing::error!(error = ?e, "{TENANT_ID_VAR} missing in environment");
                Err(anyhow::anyhow!("{TENANT_ID_VAR} environment variable not set: {e}"))
            }
        }
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Absolute URL a request is sent to.
pub fn endpoint_url(base_url: &str, request: &Request) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        request.api_stem.trim_matches('/'),
        request.resource_uri.trim_start_matches('/')
    )
}

/// Pull the element records out of a JSON response body.
pub fn extract_elements(resource_uri: &str, body: &str) -> Result<Vec<FieldMap>, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("body is not JSON: {e}"))?;
    let serde_json::Value::Object(root) = value else {
        return Err("body is not a JSON object".to_string());
    };

    let key = resource_uri.rsplit('/').next().unwrap_or(resource_uri);
    let elements = match root.get(key) {
        Some(serde_json::Value::Array(items)) => items,
        _ => root
            .values()
            .find_map(|v| v.as_array())
            .ok_or_else(|| format!("no element list found (expected `{key}`)"))?,
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(fields) => Ok(fields.clone()),
            other => Err(format!("element {index} is not an object: {other}")),
        })
        .collect()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = endpoint_url(&self.base_url, &request);
        tracing::info!(
            url = %url,
            parameters = ?request.parameters,
            "Sending GET request"
        );

        let mut builder = self
            .client
            .get(&url)
            .query(&request.parameters)
            .header(ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(credentials) = &self.credentials {
            builder = builder
                .bearer_auth(&credentials.access_token)
                .header(TENANT_HEADER, credentials.tenant_id.as_str());
        } else {
            tracing::warn!(url = %url, "Sending request without credentials");
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = ?e, url = %url, "Request failed before a response arrived");
            TransportError::Network {
                url: url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            tracing::info!(url = %url, "Not modified since the given timestamp");
            return Ok(Response::default());
        }

        let body = response.text().await.map_err(|e| TransportError::Network {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::error!(url = %url, status = status.as_u16(), "API returned an error status");
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        match extract_elements(&request.resource_uri, &body) {
            Ok(elements) => {
                tracing::info!(url = %url, count = elements.len(), "Received elements");
                Ok(Response::new(elements))
            }
            Err(message) => {
                tracing::error!(url = %url, message = %message, "Could not decode response");
                Err(TransportError::Decode { url, message })
            }
        }
    }
}

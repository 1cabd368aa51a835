//! Backend REST client.
//!
//! Blocking HTTP over `reqwest`, authenticated by forwarding the session
//! cookie issued by the auth server. Every call is a single request: no
//! retries, no refresh.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::category::{Category, SortEntry, SortUpdate};
use crate::model::config::ApiConfig;
use crate::model::order::Order;
use crate::model::resource::{InvalidRecordId, Resource};

/// Marker the backend puts in authentication failure messages
const AUTH_MARKER: &str = "認證";

/// Error type for backend calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },
    #[error("cannot reach {url}: {detail}")]
    Network { url: String, detail: String },
    #[error("unexpected response from {path}: {detail}")]
    Decode { path: String, detail: String },
    #[error("cannot build HTTP client: {0}")]
    Build(String),
    #[error(transparent)]
    InvalidId(#[from] InvalidRecordId),
}

impl ApiError {
    /// Session expired or missing: the user has to supply a new token
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::Auth(_) => true,
            ApiError::Http { message, .. } => message.contains(AUTH_MARKER),
            _ => false,
        }
    }
}

/// Turn a non-success status and its message into an error
pub fn classify_failure(status: u16, message: String) -> ApiError {
    if status == StatusCode::UNAUTHORIZED.as_u16() || message.contains(AUTH_MARKER) {
        ApiError::Auth(message)
    } else {
        ApiError::Http { status, message }
    }
}

/// Normalise the backend origin:
/// - ensure a scheme (http for localhost, https otherwise)
/// - strip trailing slashes and a trailing `/api`
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Accept either a bare array or `{ "data": [...] }`
pub fn unwrap_list(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Accept either a bare object or `{ "data": {...} }`
pub fn unwrap_record(value: Value) -> Value {
    match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Pull a human-readable message out of an error body
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("error")
            .or_else(|| json.get("message"))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    });
    match from_json {
        Some(m) => m,
        None if !body.trim().is_empty() && body.len() < 300 => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// Where the reorder screen loads categories from and saves keys to
pub trait CategoryStore {
    fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;
    fn save_sort(&self, entries: &[SortEntry]) -> Result<(), ApiError>;
}

/// Authenticated client for the backend REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.token.trim().is_empty() {
            let cookie = format!("{}={}", config.cookie_name, config.token.trim());
            let value = HeaderValue::from_str(&cookie)
                .map_err(|_| ApiError::Build("token contains invalid header characters".into()))?;
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request. `path` includes the leading slash, e.g. `/api/orders`.
    /// Empty bodies decode to `Value::Null`.
    pub fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "api request");

        let mut req = self.http.request(method.clone(), &url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().map_err(|e| {
            warn!(%method, path, error = %e, "api request failed");
            ApiError::Network {
                url: self.base_url.clone(),
                detail: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            }
        })?;

        let status = resp.status();
        let text = resp.text().map_err(|e| ApiError::Decode {
            path: path.to_string(),
            detail: e.to_string(),
        })?;
        debug!(%method, path, status = status.as_u16(), "api response");

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), error_message(status, &text));
            warn!(%method, path, status = status.as_u16(), error = %err, "api call rejected");
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            detail: e.to_string(),
        })
    }

    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body))
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(body))
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None)
    }

    // -----------------------------------------------------------------------
    // Resource helpers
    // -----------------------------------------------------------------------

    /// All records of a collection
    pub fn list(&self, resource: Resource) -> Result<Vec<Value>, ApiError> {
        let path = resource.path();
        let value = self.get(&path)?;
        unwrap_list(value).ok_or_else(|| ApiError::Decode {
            path,
            detail: "expected an array or {\"data\": [...]}".into(),
        })
    }

    pub fn show(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        self.get(&resource.item_path(id)?).map(unwrap_record)
    }

    pub fn create(&self, resource: Resource, body: &Value) -> Result<Value, ApiError> {
        self.post(&resource.path(), body).map(unwrap_record)
    }

    pub fn update(&self, resource: Resource, id: &str, body: &Value) -> Result<Value, ApiError> {
        self.put(&resource.item_path(id)?, body).map(unwrap_record)
    }

    pub fn remove(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        self.delete(&resource.item_path(id)?)
    }

    /// All orders with their items
    pub fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let path = Resource::Orders.path();
        self.list(Resource::Orders)?
            .into_iter()
            .map(|v| {
                serde_json::from_value(v).map_err(|e| ApiError::Decode {
                    path: path.clone(),
                    detail: e.to_string(),
                })
            })
            .collect()
    }
}

impl CategoryStore for ApiClient {
    fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let path = "/api/categories?sortBy=id&order=ASC";
        let items = unwrap_list(self.get(path)?).ok_or_else(|| ApiError::Decode {
            path: path.to_string(),
            detail: "expected an array or {\"data\": [...]}".into(),
        })?;
        items
            .into_iter()
            .map(|v| {
                serde_json::from_value(v).map_err(|e| ApiError::Decode {
                    path: path.to_string(),
                    detail: e.to_string(),
                })
            })
            .collect()
    }

    fn save_sort(&self, entries: &[SortEntry]) -> Result<(), ApiError> {
        let body = serde_json::to_value(SortUpdate {
            sort_data: entries.to_vec(),
        })
        .map_err(|e| ApiError::Decode {
            path: "/api/categories/sort".into(),
            detail: e.to_string(),
        })?;
        self.put("/api/categories/sort", &body)?;
        info!(count = entries.len(), "saved category order");
        Ok(())
    }
}

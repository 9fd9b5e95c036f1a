use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::{HttpError, Result};

/// JSON request/response client over a shared [`reqwest::Client`].
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone, Default)]
pub struct CallbackClient {
    client: reqwest::Client,
}

impl CallbackClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// GET `url` with `params` appended to the query string.
    pub async fn json_get(
        &self,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        params: Option<&HashMap<String, String>>,
    ) -> Result<Value> {
        let url = complete_url(url, params);
        self.json_do("GET", &url, headers, None).await
    }

    /// POST `body` as JSON to `url`.
    pub async fn json_post(
        &self,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.json_do("POST", url, headers, body).await
    }

    /// Perform one JSON exchange. `method` must be `GET` or `POST`.
    ///
    /// Caller headers are applied first, then `Content-Type:
    /// application/json` is forced on top. Any status other than 200 is
    /// [`HttpError::Status`]; an empty response body decodes to
    /// [`Value::Null`].
    pub async fn json_do(
        &self,
        method: &str,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let method = match method {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => {
                return Err(HttpError::InvalidMethod {
                    method: other.to_string(),
                })
            }
        };

        debug!(%method, url, has_body = body.is_some(), "dispatching JSON request");

        let mut request = self.client.request(method, url);
        if let Some(headers) = headers {
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
        }
        request = request.header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(HttpError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Append `params` to `origin` as a query string.
///
/// Keys are sorted for a deterministic result; values are appended
/// verbatim, matching the callback contract (callers own any escaping).
pub fn complete_url(origin: &str, params: Option<&HashMap<String, String>>) -> String {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return origin.to_string();
    };

    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by_key(|(k, _)| k.as_str());

    let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", origin, query.join("&"))
}

//! reqwest transport
//!
//! [`ReqwestClient`] is the production [`HttpClient`]. Dropping the future it
//! returns drops the underlying reqwest call, which closes the connection.

use action_http_core::options::Method;
use action_http_core::{HttpClient, HttpError, HttpResponse, HttpResult, RequestOptions};
use futures::future::BoxFuture;
use std::collections::BTreeMap;

/// [`HttpClient`] backed by a shared `reqwest::Client`
///
/// # Example
///
/// ```ignore
/// let middleware = HttpMiddleware::new(
///     HttpConfig::default().with_base_url("https://api.example.com"),
///     ReqwestClient::new(),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Client with reqwest's default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already configured `reqwest::Client`
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    fn request(&self, options: RequestOptions) -> BoxFuture<'static, HttpResult> {
        let client = self.client.clone();
        Box::pin(async move { execute(&client, options).await })
    }
}

async fn execute(client: &reqwest::Client, options: RequestOptions) -> HttpResult {
    let url = options
        .resolved_url()
        .ok_or_else(|| HttpError::InvalidRequest("missing url".to_string()))?;

    let mut request = client.request(to_reqwest_method(options.method()), &url);
    if !options.params.is_empty() {
        request = request.query(&options.params);
    }
    for (name, value) in &options.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(data) = &options.data {
        request = request.json(data);
    }
    if let Some(timeout) = options.timeout() {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| send_error(&e, options.timeout_ms))?;

    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect();

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            HttpError::Timeout(options.timeout_ms.unwrap_or_default())
        } else {
            HttpError::Decode(e.to_string())
        }
    })?;
    let data = decode_body(&body);

    if (200..300).contains(&status) {
        Ok(HttpResponse {
            status,
            headers,
            data,
        })
    } else {
        Err(HttpError::Status { status, data })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn send_error(error: &reqwest::Error, timeout_ms: Option<u64>) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(timeout_ms.unwrap_or_default())
    } else if error.is_builder() {
        HttpError::InvalidRequest(error.to_string())
    } else {
        HttpError::Network(error.to_string())
    }
}

/// Empty bodies decode to `Null`, JSON to its value, anything else to a string.
fn decode_body(body: &[u8]) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

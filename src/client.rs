use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatCompletion, ChatCompletionCreateParams};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";

/// Environment variable the API key is read from.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A remote text-generation service.
///
/// One call is one request/response cycle: the full transcript and sampling
/// parameters go out, the completion comes back.  Implementations do not
/// retry.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Issue exactly one completion request.
    async fn complete(&self, params: &ChatCompletionCreateParams) -> Result<ChatCompletion>;
}

#[async_trait::async_trait]
impl<T: CompletionService + ?Sized> CompletionService for Arc<T> {
    async fn complete(&self, params: &ChatCompletionCreateParams) -> Result<ChatCompletion> {
        (**self).complete(params).await
    }
}

/// Client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAI {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl OpenAI {
    /// Create a new OpenAI client.
    ///
    /// The API key can be provided directly or read from the `OPENAI_API_KEY`
    /// environment variable.  No timeout is applied beyond the transport's
    /// own behavior.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] with the message
    /// `Missing OpenAI API Key.` when no non-empty key is available.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, || env::var(API_KEY_ENV).ok())?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and its outcome.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            Error::validation(
                "API key contains characters that cannot be sent in a header",
                Some(API_KEY_ENV.to_string()),
            )
        })?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        error_from_status(status_code, &error_body, request_id, retry_after)
    }

    /// Send a chat completion request and wait for the whole reply.
    pub async fn send(&self, params: &ChatCompletionCreateParams) -> Result<ChatCompletion> {
        if let Some(logger) = &self.logger {
            logger.log_request(params);
        }
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_inner(params).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(completion) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(completion);
                }
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }

    async fn send_inner(&self, params: &ChatCompletionCreateParams) -> Result<ChatCompletion> {
        let url = format!("{}chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        self.timeout.map(|t| t.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenAI {
    async fn complete(&self, params: &ChatCompletionCreateParams) -> Result<ChatCompletion> {
        self.send(params).await
    }
}

impl fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAI")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Pick the explicit key, else the looked-up one; empty counts as missing.
fn resolve_api_key(
    api_key: Option<String>,
    lookup: impl FnOnce() -> Option<String>,
) -> Result<String> {
    api_key
        .or_else(lookup)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(Error::missing_api_key)
}

/// Map a non-success status and its body to an [`Error`].
fn error_from_status(
    status_code: u16,
    body: &str,
    request_id: Option<String>,
    retry_after: Option<u64>,
) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
        param: Option<String>,
    }

    let parsed_error = serde_json::from_str::<ErrorResponse>(body).ok();
    let detail = parsed_error.as_ref().and_then(|e| e.error.as_ref());
    let error_type = detail.and_then(|e| e.error_type.clone());
    let error_message = detail
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());
    let error_param = detail.and_then(|e| e.param.clone());

    match status_code {
        400 => Error::bad_request(error_message, error_param),
        401 => Error::authentication(error_message),
        403 => Error::permission(error_message),
        404 => Error::not_found(error_message),
        408 => Error::timeout(error_message, None),
        429 => Error::rate_limit(error_message, retry_after),
        500 => Error::internal_server(error_message, request_id),
        502..=504 => Error::service_unavailable(error_message, retry_after),
        _ => Error::api(status_code, error_type, error_message, request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnownModel, Message};

    #[test]
    fn test_client_creation() {
        let client = OpenAI::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, None);

        let client = OpenAI::with_options(
            Some("test-key".to_string()),
            Some("http://localhost:8080/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1/");
        assert_eq!(client.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_key_reports_fixed_message() {
        let err = resolve_api_key(None, || None).unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.to_string(), "Missing OpenAI API Key.");
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let err = resolve_api_key(None, || Some(String::new())).unwrap_err();
        assert_eq!(err.to_string(), "Missing OpenAI API Key.");
        assert!(resolve_api_key(Some("  ".to_string()), || None).is_err());
    }

    #[test]
    fn explicit_key_wins_over_lookup() {
        let key = resolve_api_key(Some("explicit".to_string()), || {
            panic!("lookup must not run when a key is given")
        })
        .unwrap();
        assert_eq!(key, "explicit");
        let key = resolve_api_key(None, || Some("from-env".to_string())).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn headers_carry_bearer_token() {
        let client = OpenAI::new(Some("sk-test".to_string())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer sk-test");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = OpenAI::new(Some("sk-secret".to_string())).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn error_mapping_uses_structured_body() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;
        let err = error_from_status(401, body, None, None);
        assert!(err.is_authentication());
        assert_eq!(
            err.to_string(),
            "Authentication error: Incorrect API key provided"
        );

        let body = r#"{"error":{"message":"max_tokens is too large","type":"invalid_request_error","param":"max_tokens"}}"#;
        let err = error_from_status(400, body, None, None);
        assert_eq!(
            err.to_string(),
            "Bad request: max_tokens is too large (parameter: max_tokens)"
        );
    }

    #[test]
    fn error_mapping_by_status() {
        assert!(error_from_status(403, "", None, None).is_permission());
        assert!(error_from_status(404, "", None, None).is_not_found());
        assert!(error_from_status(408, "", None, None).is_timeout());
        assert!(error_from_status(500, "", None, None).is_server_error());
        assert!(error_from_status(503, "", None, None).is_server_error());

        let err = error_from_status(429, "quota", None, Some(20));
        assert!(err.is_rate_limit());
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded: quota (retry after 20 seconds)"
        );

        let err = error_from_status(418, "plain text body", Some("req_1".to_string()), None);
        assert_eq!(err.status_code(), Some(418));
        assert_eq!(err.to_string(), "API error: plain text body (Request ID: req_1)");
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error_not_a_panic() {
        // Port 9 (discard) on localhost is almost never listening.
        let client = OpenAI::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:9/v1/".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let params = ChatCompletionCreateParams::new(
            KnownModel::Gpt4,
            vec![Message::user("hi")],
            1.0,
            16,
            1.0,
        );
        assert!(client.send(&params).await.is_err());
    }
}

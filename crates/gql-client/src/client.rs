//! GraphQL HTTP client implementation.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use tracing::{debug, warn};

use crate::error::{GraphqlClientError, GraphqlError};
use crate::operation::{GraphqlOperation, GraphqlRequest, GraphqlResponse};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::upload::{self, FileUpload};

/// Whether outbound requests carry ambient credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialPolicy {
    /// Persist cookies and send them on every request, cross-origin included.
    #[default]
    Include,
    /// Never attach stored credentials.
    Omit,
}

/// GraphQL client configuration.
#[derive(Debug, Clone)]
pub struct GraphqlClientConfig {
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
    /// Credential policy.
    pub credentials: CredentialPolicy,
    /// Retry policy.
    pub retry: RetryPolicy,
}

impl Default for GraphqlClientConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout: Duration::from_secs(30),
            credentials: CredentialPolicy::Include,
            retry: RetryPolicy::default(),
        }
    }
}

/// GraphQL client builder.
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    config: GraphqlClientConfig,
}

impl GraphqlClientBuilder {
    /// Create a new builder for a fixed absolute endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config: GraphqlClientConfig::default(),
        }
    }

    /// Add a default header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the credential policy.
    #[must_use]
    pub const fn with_credentials(mut self, credentials: CredentialPolicy) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GraphqlClient, GraphqlClientError> {
        GraphqlClient::with_config(self.endpoint, self.config)
    }
}

/// GraphQL client.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
    config: GraphqlClientConfig,
}

impl GraphqlClient {
    /// Create a new client with default configuration.
    ///
    /// Construction itself never signals an error; failures surface when a
    /// request is executed.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self::with_config(endpoint.clone(), GraphqlClientConfig::default()).unwrap_or_else(|_| {
            Self {
                endpoint,
                http: reqwest::Client::new(),
                config: GraphqlClientConfig::default(),
            }
        })
    }

    /// Create a client with custom configuration.
    pub fn with_config(
        endpoint: impl Into<String>,
        config: GraphqlClientConfig,
    ) -> Result<Self, GraphqlClientError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(config.headers.clone())
            .timeout(config.timeout);
        if config.credentials == CredentialPolicy::Include {
            builder = builder.cookie_store(true);
        }
        let http = builder.build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            config,
        })
    }

    /// The endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a typed operation and return the full response.
    ///
    /// Application-level errors are logged and returned inside the response;
    /// transport-level errors are logged and returned as `Err`. Logging never
    /// alters what propagates to the caller.
    pub async fn execute<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        let request =
            GraphqlRequest::new(O::QUERY, variables).with_operation_name(O::OPERATION_NAME);
        let body = serde_json::to_vec(&request)
            .map_err(|err| self.transport_failure(O::OPERATION_NAME, err.into()))?;

        let bytes = self
            .send_json_with_retry(body, O::is_idempotent())
            .await
            .map_err(|err| self.transport_failure(O::OPERATION_NAME, err))?;

        self.parse_response(O::OPERATION_NAME, &bytes)
    }

    /// Execute a typed operation and return data only.
    ///
    /// Application-level errors become `Err(GraphqlErrors)`.
    pub async fn execute_strict<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<O::ResponseData, GraphqlClientError> {
        let response = self.execute::<O>(variables).await?;
        if !response.errors.is_empty() {
            return Err(GraphqlClientError::GraphqlErrors {
                errors: response.errors,
            });
        }
        response.data.ok_or_else(|| GraphqlClientError::Protocol {
            message: "missing GraphQL data".to_string(),
        })
    }

    /// Execute a typed operation as a multipart upload request.
    ///
    /// The serialized variables must carry `null` at each attached file's
    /// `variable_path`. Uploads are never retried.
    pub async fn execute_upload<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
        files: Vec<FileUpload>,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        let request =
            GraphqlRequest::new(O::QUERY, variables).with_operation_name(O::OPERATION_NAME);
        let operations = serde_json::to_string(&request)
            .map_err(|err| self.transport_failure(O::OPERATION_NAME, err.into()))?;
        let form = upload::build_form(operations, files)
            .map_err(|err| self.transport_failure(O::OPERATION_NAME, err))?;

        let sent = self.http.post(&self.endpoint).multipart(form).send().await;
        let bytes = match sent {
            Ok(response) => Self::read_body(response).await,
            Err(err) => Err(GraphqlClientError::from(err)),
        }
        .map_err(|err| self.transport_failure(O::OPERATION_NAME, err))?;

        self.parse_response(O::OPERATION_NAME, &bytes)
    }

    async fn send_json_with_retry(
        &self,
        body: Vec<u8>,
        idempotent: bool,
    ) -> Result<Vec<u8>, GraphqlClientError> {
        let mut attempt = 1;
        loop {
            match self.send_json_once(&body).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => match self.config.retry.decide(&err, attempt, idempotent) {
                    RetryDecision::RetryAfter(delay) => {
                        debug!(attempt, ?delay, "retrying GraphQL request");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryDecision::DoNotRetry => return Err(err),
                },
            }
        }
    }

    async fn send_json_once(&self, body: &[u8]) -> Result<Vec<u8>, GraphqlClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, GraphqlClientError> {
        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(GraphqlClientError::HttpStatus {
                status,
                body: truncate_body(&bytes),
                retry_after,
            });
        }
        Ok(bytes.to_vec())
    }

    fn parse_response<R: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        bytes: &[u8],
    ) -> Result<GraphqlResponse<R>, GraphqlClientError> {
        let response: GraphqlResponse<R> = serde_json::from_slice(bytes)
            .map_err(|err| self.transport_failure(operation, err.into()))?;
        log_application_errors(operation, &response.errors);
        Ok(response)
    }

    /// Log a transport-level failure and hand the error back unchanged.
    fn transport_failure(
        &self,
        operation: &str,
        err: GraphqlClientError,
    ) -> GraphqlClientError {
        warn!(
            operation,
            endpoint = %self.endpoint,
            error = %err,
            "transport error"
        );
        err
    }
}

/// Log each application-level error with message, locations, and path.
fn log_application_errors(operation: &str, errors: &[GraphqlError]) {
    for error in errors {
        warn!(
            operation,
            message = %error.message,
            locations = %error.locations_string(),
            path = %error.path_string(),
            "GraphQL error"
        );
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.parse::<u64>().ok().map(Duration::from_secs)
}

fn truncate_body(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 4096;
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_LEN {
        body.truncate(MAX_LEN);
        body.push('…');
    }
    body
}

//! HTTP adapter for the replication control plane, plus shared CLI error types.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use failback_core::defaults::{
    FABRIC_SEGMENT, JOB_SEGMENT, PROTECTED_ITEM_SEGMENT, PROTECTION_CONTAINER_SEGMENT,
};
use failback_core::{
    ApplyRecoveryPointRequest, FailbackError, FailbackResult, Job, JobTracker, ProtectedItemScope,
    ReplicationControlPlane, SubmissionAck,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

pub(crate) const HEADER_CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
pub(crate) const HEADER_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<FailbackError> for CliError {
    fn from(error: FailbackError) -> Self {
        let rejected_input = matches!(
            error,
            FailbackError::RemoteOperation {
                status: Some(400 | 409 | 422),
                ..
            }
        );
        if error.is_caller_error() || rejected_input {
            Self::Validation(error.to_string())
        } else {
            Self::Failure(error.into())
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) vault_id: Option<String>,
    pub(crate) api_version: String,
    pub(crate) access_token: Option<String>,
}

impl AppContext {
    /// Construct a configured HTTP client tagged with the invocation's trace id.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_CLIENT_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: cli.api_url.clone(),
            vault_id: cli.vault_id.clone(),
            api_version: cli.api_version.clone(),
            access_token: cli
                .access_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        })
    }
}

/// Control-plane adapter speaking the ARM-style replication REST surface.
#[derive(Clone)]
pub(crate) struct HttpControlPlane {
    client: Client,
    base_url: Url,
    vault_segments: Vec<String>,
    api_version: String,
    access_token: Option<String>,
}

impl HttpControlPlane {
    pub(crate) fn from_context(ctx: &AppContext) -> CliResult<Self> {
        let vault_id = ctx.vault_id.as_deref().map(str::trim).unwrap_or_default();
        let vault_segments: Vec<String> = vault_id
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if vault_segments.is_empty() {
            return Err(CliError::validation(
                "vault id is required (pass --vault-id or set FAILBACK_VAULT_ID)",
            ));
        }
        if ctx.base_url.cannot_be_a_base() {
            return Err(CliError::validation(format!(
                "API URL '{}' cannot carry a resource path",
                ctx.base_url
            )));
        }

        Ok(Self {
            client: ctx.client.clone(),
            base_url: ctx.base_url.clone(),
            vault_segments,
            api_version: ctx.api_version.clone(),
            access_token: ctx.access_token.clone(),
        })
    }

    fn resource_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(self.vault_segments.iter().map(String::as_str))
                .extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }
}

#[derive(Serialize)]
struct ArmEnvelope<'a, T> {
    properties: &'a T,
}

#[async_trait]
impl ReplicationControlPlane for HttpControlPlane {
    async fn apply_recovery_point(
        &self,
        scope: &ProtectedItemScope,
        request: &ApplyRecoveryPointRequest,
    ) -> FailbackResult<SubmissionAck> {
        const OPERATION: &str = "apply recovery point";
        let url = self.resource_url(&[
            FABRIC_SEGMENT,
            &scope.fabric,
            PROTECTION_CONTAINER_SEGMENT,
            &scope.protection_container,
            PROTECTED_ITEM_SEGMENT,
            &scope.protected_item,
            "applyRecoveryPoint",
        ]);

        let response = self
            .authorize(self.client.post(url))
            .json(&ArmEnvelope {
                properties: request,
            })
            .send()
            .await
            .map_err(|err| FailbackError::remote(OPERATION, err.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_problem(OPERATION, response).await);
        }

        let headers = response.headers();
        headers
            .get(LOCATION)
            .or_else(|| headers.get(HEADER_ASYNC_OPERATION))
            .and_then(|value| value.to_str().ok())
            .map(|location| SubmissionAck {
                location: location.to_string(),
            })
            .ok_or_else(|| {
                FailbackError::remote(OPERATION, "accepted response carried no location reference")
            })
    }
}

#[async_trait]
impl JobTracker for HttpControlPlane {
    async fn fetch(&self, job_id: &str) -> FailbackResult<Job> {
        const OPERATION: &str = "fetch job";
        let url = self.resource_url(&[JOB_SEGMENT, job_id]);

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|err| FailbackError::remote(OPERATION, err.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_problem(OPERATION, response).await);
        }

        let resource = response
            .json::<JobResource>()
            .await
            .map_err(|err| {
                FailbackError::remote(OPERATION, format!("invalid job payload: {err}"))
            })?;
        Ok(resource.into())
    }
}

#[derive(Debug, Deserialize)]
struct JobResource {
    id: String,
    name: String,
    #[serde(default)]
    properties: JobProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JobProperties {
    state: Option<String>,
    state_description: Option<String>,
    activity_id: Option<String>,
    scenario_name: Option<String>,
    target_object_id: Option<String>,
    target_object_name: Option<String>,
    target_instance_type: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    allowed_actions: Vec<String>,
    errors: Vec<JobErrorDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JobErrorDetails {
    service_error_details: Option<ServiceError>,
    provider_error_details: Option<ProviderError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProviderError {
    error_code: Option<i64>,
    error_message: Option<String>,
}

impl JobErrorDetails {
    fn summary(&self) -> Option<String> {
        if let Some(service) = &self.service_error_details {
            if let Some(message) = &service.message {
                return Some(service.code.as_ref().map_or_else(
                    || message.clone(),
                    |code| format!("{code}: {message}"),
                ));
            }
        }
        let provider = self.provider_error_details.as_ref()?;
        let message = provider.error_message.as_ref()?;
        Some(provider.error_code.map_or_else(
            || message.clone(),
            |code| format!("{code}: {message}"),
        ))
    }
}

impl From<JobResource> for Job {
    fn from(resource: JobResource) -> Self {
        let JobResource {
            id,
            name,
            properties,
        } = resource;
        Self {
            id,
            name,
            state: properties.state.unwrap_or_else(|| "Unknown".to_string()),
            state_description: properties.state_description,
            activity_id: properties.activity_id,
            scenario_name: properties.scenario_name,
            target_object_id: properties.target_object_id,
            target_object_name: properties.target_object_name,
            target_instance_type: properties.target_instance_type,
            start_time: properties.start_time,
            end_time: properties.end_time,
            allowed_actions: properties.allowed_actions,
            errors: properties
                .errors
                .iter()
                .filter_map(JobErrorDetails::summary)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Translate a failed HTTP response into a remote operation error.
pub(crate) async fn classify_problem(
    operation: &'static str,
    response: reqwest::Response,
) -> FailbackError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();

    let detail = serde_json::from_slice::<ArmErrorResponse>(&bytes)
        .ok()
        .and_then(|problem| match (problem.error.code, problem.error.message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (None, Some(message)) => Some(message),
            (Some(code), None) => Some(code),
            (None, None) => None,
        })
        .unwrap_or_else(|| {
            if body_text.is_empty() {
                format!("request failed with status {status}")
            } else {
                body_text
            }
        });

    FailbackError::RemoteOperation {
        operation,
        status: Some(status.as_u16()),
        detail,
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

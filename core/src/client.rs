//! Request dispatch and error classification for the Andon API.
//!
//! # Design
//! `AndonClient` holds only immutable configuration: the base endpoint, the
//! organization name, the API token and a shared `Transport`. Each operation
//! is split into a `build_*` step that produces an `HttpRequest` and
//! `parse_response`, which turns an `HttpResponse` into `Ok(())` or a
//! classified `AndonError`. The async operations run build, transport and
//! parse in sequence; both endpoints share one generic `post` routine.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use crate::config::{ClientConfig, DEFAULT_ENDPOINT};
use crate::error::AndonError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ErrorEnvelope, ReportDataRequest, Stamped, UpdateStationStatusRequest};

pub const REPORT_DATA_PATH: &str = "data/report";
pub const UPDATE_STATUS_PATH: &str = "station/update";

/// Client for reporting to Andon on behalf of one organization.
///
/// ```no_run
/// # async fn run() -> Result<(), andon_client::AndonError> {
/// use andon_client::{AndonClient, ReportDataRequest};
///
/// let client = AndonClient::new("My Org", "api-token")?;
/// client
///     .report_data(&ReportDataRequest::pass("line 1", "station 1", 120))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AndonClient {
    endpoint: Url,
    org_name: String,
    api_token: String,
    transport: Arc<dyn Transport>,
}

impl AndonClient {
    /// Create a client that talks to `DEFAULT_ENDPOINT` over `ReqwestTransport`.
    pub fn new(
        org_name: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, AndonError> {
        Self::with_transport(org_name, api_token, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client that sends every request through `transport`.
    pub fn with_transport(
        org_name: impl Into<String>,
        api_token: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, AndonError> {
        let org_name = check_not_empty(org_name.into(), "orgName cannot be empty")?;
        let api_token = check_not_empty(api_token.into(), "apiToken cannot be empty")?;

        Ok(Self {
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            org_name,
            api_token,
            transport,
        })
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, AndonError> {
        Self::from_config_with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn from_config_with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, AndonError> {
        let mut client = Self::with_transport(config.org_name, config.api_token, transport)?;
        if let Some(endpoint) = config.endpoint {
            client.set_endpoint(&endpoint)?;
        }
        Ok(client)
    }

    /// Change the endpoint that subsequent requests are sent to.
    ///
    /// Paths are resolved relative to it, so it should end with `/`.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<(), AndonError> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(())
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, AndonError> {
        self.set_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    /// Report the outcome of a process at a station.
    ///
    /// Fails with `ResourceNotFound` when the station does not exist,
    /// `InvalidRequest` when a field is rejected, `Unauthorized` when the
    /// token is not accepted, and the remaining `AndonError` variants as
    /// classified by `parse_response`.
    pub async fn report_data(&self, request: &ReportDataRequest) -> Result<(), AndonError> {
        self.post(REPORT_DATA_PATH, request).await
    }

    /// Change the status of a station. Fails the same way as `report_data`.
    pub async fn update_station_status(
        &self,
        request: &UpdateStationStatusRequest,
    ) -> Result<(), AndonError> {
        self.post(UPDATE_STATUS_PATH, request).await
    }

    pub fn build_report_data(&self, request: &ReportDataRequest) -> Result<HttpRequest, AndonError> {
        self.build_request(REPORT_DATA_PATH, request)
    }

    pub fn build_update_station_status(
        &self,
        request: &UpdateStationStatusRequest,
    ) -> Result<HttpRequest, AndonError> {
        self.build_request(UPDATE_STATUS_PATH, request)
    }

    /// `Ok(())` for any 2xx status, otherwise the classified error.
    pub fn parse_response(&self, response: HttpResponse) -> Result<(), AndonError> {
        if response.is_success() {
            return Ok(());
        }
        Err(classify(response.status, &response.body))
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, payload: &T) -> Result<(), AndonError> {
        let request = self.build_request(path, payload)?;
        debug!(path, url = %request.url, "sending andon request");

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(AndonError::Transport)?;

        let status = response.status;
        self.parse_response(response).inspect_err(|err| {
            debug!(path, status, kind = err.kind(), "andon request rejected");
        })
    }

    fn build_request<T: Serialize>(&self, path: &str, payload: &T) -> Result<HttpRequest, AndonError> {
        let url = self.endpoint.join(path).map_err(|e| {
            AndonError::InvalidArgument(format!("cannot resolve {path} against {}: {e}", self.endpoint))
        })?;
        let body = serde_json::to_string(&Stamped {
            org_name: &self.org_name,
            payload,
        })
        .map_err(|e| AndonError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            url: url.into(),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", self.api_token)),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }
}

impl fmt::Debug for AndonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndonClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("org_name", &self.org_name)
            .field("api_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn check_not_empty(value: String, message: &str) -> Result<String, AndonError> {
    if value.trim().is_empty() {
        return Err(AndonError::InvalidArgument(message.to_string()));
    }
    Ok(value)
}

fn parse_endpoint(endpoint: &str) -> Result<Url, AndonError> {
    if endpoint.trim().is_empty() {
        return Err(AndonError::InvalidArgument("endpoint cannot be empty".to_string()));
    }
    Url::parse(endpoint)
        .map_err(|e| AndonError::InvalidArgument(format!("invalid endpoint {endpoint:?}: {e}")))
}

/// Map a non-2xx response onto the error taxonomy.
///
/// The service's `errorType` wins over the framework's `status`. The framework
/// path only distinguishes 401, the rest of 4xx, and everything else, so it
/// never yields `InvalidRequest` or `ResourceNotFound`. Bodies with neither
/// field fall back to `App("Status {code}: {body}")`.
fn classify(status: u16, body: &str) -> AndonError {
    let envelope = serde_json::from_str::<Option<ErrorEnvelope>>(body)
        .ok()
        .flatten();

    if let Some(envelope) = envelope {
        if let Some(error_type) = envelope.error_type {
            let message = envelope.error_message.unwrap_or_default();
            return match error_type.as_str() {
                "BAD_REQUEST" => AndonError::BadRequest(message),
                "INVALID_REQUEST" => AndonError::InvalidRequest(message),
                "RESOURCE_NOT_FOUND" => AndonError::ResourceNotFound(message),
                "UNAUTHORIZED_REQUEST" => AndonError::Unauthorized(message),
                "INTERNAL_ERROR" => AndonError::InternalError(message),
                _ => AndonError::App(message),
            };
        }

        if let Some(code) = envelope.status {
            let message = envelope.message.unwrap_or_default();
            return match code {
                401 => AndonError::Unauthorized(message),
                400..=499 => AndonError::BadRequest(message),
                _ => AndonError::InternalError(message),
            };
        }
    }

    AndonError::App(format!("Status {status}: {body}"))
}

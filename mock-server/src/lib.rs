use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_PREFIX: &str = "/public/api/v1";
pub const REPORT_DATA_ROUTE: &str = "/public/api/v1/data/report";
pub const UPDATE_STATUS_ROUTE: &str = "/public/api/v1/station/update";

/// Organization, token and known stations the mock accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub org_name: String,
    pub api_token: String,
    pub stations: Vec<(String, String)>,
}

impl MockConfig {
    pub fn new(org_name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            api_token: api_token.into(),
            stations: Vec::new(),
        }
    }

    pub fn with_station(mut self, line: impl Into<String>, station: impl Into<String>) -> Self {
        self.stations.push((line.into(), station.into()));
        self
    }

    fn has_station(&self, line: &str, station: &str) -> bool {
        self.stations.iter().any(|(l, s)| l == line && s == station)
    }
}

/// A request body the mock accepted past authentication.
#[derive(Clone, Debug, PartialEq)]
pub struct Received {
    pub path: String,
    pub body: Value,
}

#[derive(Debug)]
pub struct MockState {
    config: MockConfig,
    received: RwLock<Vec<Received>>,
    forced: RwLock<Option<(StatusCode, String)>>,
}

impl MockState {
    pub fn new(config: MockConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            received: RwLock::new(Vec::new()),
            forced: RwLock::new(None),
        })
    }

    pub async fn received(&self) -> Vec<Received> {
        self.received.read().await.clone()
    }

    /// Answer every authenticated request with `status` and the raw `body`
    /// until cleared.
    pub async fn force_response(&self, status: StatusCode, body: impl Into<String>) {
        *self.forced.write().await = Some((status, body.into()));
    }

    pub async fn clear_forced_response(&self) {
        *self.forced.write().await = None;
    }
}

pub type Shared = Arc<MockState>;

type Rejection = (StatusCode, Value);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportData {
    org_name: Option<String>,
    line_name: Option<String>,
    station_name: Option<String>,
    pass_result: Option<String>,
    process_time_seconds: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatus {
    org_name: Option<String>,
    line_name: Option<String>,
    station_name: Option<String>,
    status_color: Option<String>,
}

pub fn app(state: Shared) -> Router {
    Router::new()
        .route(REPORT_DATA_ROUTE, post(report_data))
        .route(UPDATE_STATUS_ROUTE, post(update_status))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: Shared) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn report_data(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    handle(&state, &headers, REPORT_DATA_ROUTE, &body, validate_report).await
}

async fn update_status(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    handle(&state, &headers, UPDATE_STATUS_ROUTE, &body, validate_status).await
}

async fn handle(
    state: &MockState,
    headers: &HeaderMap,
    path: &str,
    body: &str,
    validate: fn(&MockConfig, Value) -> Result<(), Rejection>,
) -> Response {
    let expected = format!("Bearer {}", state.config.api_token);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        tracing::info!(path, "rejecting request with bad credentials");
        let body = framework_error(StatusCode::UNAUTHORIZED, "Unauthorized", path);
        return json_response(StatusCode::UNAUTHORIZED, body.to_string());
    }

    let parsed = serde_json::from_str::<Value>(body);
    state.received.write().await.push(Received {
        path: path.to_string(),
        body: parsed
            .as_ref()
            .cloned()
            .unwrap_or_else(|_| Value::String(body.to_string())),
    });

    if let Some((status, forced)) = state.forced.read().await.clone() {
        return json_response(status, forced);
    }

    let value = match parsed {
        Ok(value) => value,
        Err(e) => {
            let message = format!("JSON parse error: {e}");
            let body = framework_error(StatusCode::BAD_REQUEST, &message, path);
            return json_response(StatusCode::BAD_REQUEST, body.to_string());
        }
    };

    match validate(&state.config, value) {
        Ok(()) => json_response(StatusCode::OK, "{}".to_string()),
        Err((status, body)) => json_response(status, body.to_string()),
    }
}

fn validate_report(config: &MockConfig, value: Value) -> Result<(), Rejection> {
    let report: ReportData = serde_json::from_value(value).map_err(|e| {
        let message = e.to_string();
        (
            StatusCode::BAD_REQUEST,
            framework_error(StatusCode::BAD_REQUEST, &message, REPORT_DATA_ROUTE),
        )
    })?;

    check_org(config, report.org_name.as_deref())?;
    let line = require("lineName", report.line_name.as_deref())?;
    let station = require("stationName", report.station_name.as_deref())?;
    match report.pass_result.as_deref() {
        Some("PASS") | Some("FAIL") => {}
        Some(other) => return Err(invalid(&format!("'{other}' is not a valid pass result."))),
        None => return Err(invalid("passResult may not be null")),
    }
    if report.process_time_seconds.is_none() {
        return Err(invalid("processTimeSeconds may not be null"));
    }
    check_station(config, line, station)
}

fn validate_status(config: &MockConfig, value: Value) -> Result<(), Rejection> {
    let update: UpdateStatus = serde_json::from_value(value).map_err(|e| {
        let message = e.to_string();
        (
            StatusCode::BAD_REQUEST,
            framework_error(StatusCode::BAD_REQUEST, &message, UPDATE_STATUS_ROUTE),
        )
    })?;

    check_org(config, update.org_name.as_deref())?;
    let line = require("lineName", update.line_name.as_deref())?;
    let station = require("stationName", update.station_name.as_deref())?;
    match update.status_color.as_deref() {
        Some("GREEN") | Some("YELLOW") | Some("RED") => {}
        Some(other) => return Err(invalid(&format!("'{other}' is not a valid status color."))),
        None => return Err(invalid("statusColor may not be null")),
    }
    check_station(config, line, station)
}

fn check_org(config: &MockConfig, org_name: Option<&str>) -> Result<(), Rejection> {
    if org_name == Some(config.org_name.as_str()) {
        return Ok(());
    }
    Err(app_error(
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED_REQUEST",
        "Not authorized for organization",
    ))
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, Rejection> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(invalid(&format!("{field} may not be empty"))),
    }
}

fn check_station(config: &MockConfig, line: &str, station: &str) -> Result<(), Rejection> {
    if config.has_station(line, station) {
        return Ok(());
    }
    Err(app_error(
        StatusCode::BAD_REQUEST,
        "RESOURCE_NOT_FOUND",
        "Station not found",
    ))
}

fn invalid(message: &str) -> Rejection {
    app_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
}

fn app_error(status: StatusCode, error_type: &str, message: &str) -> Rejection {
    (
        status,
        json!({ "errorType": error_type, "errorMessage": message }),
    )
}

/// Error body in the shape the web framework produces before a request
/// reaches the service.
pub fn framework_error(status: StatusCode, message: &str, path: &str) -> Value {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    json!({
        "timestamp": millis.to_string(),
        "status": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Unknown"),
        "message": message,
        "path": path,
    })
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MockConfig {
        MockConfig::new("Test Org", "api-token").with_station("line 1", "station 1")
    }

    fn error_type(rejection: Rejection) -> (StatusCode, String) {
        let (status, body) = rejection;
        (status, body["errorType"].as_str().unwrap().to_string())
    }

    #[test]
    fn valid_report_is_accepted() {
        let body = json!({
            "orgName": "Test Org",
            "lineName": "line 1",
            "stationName": "station 1",
            "passResult": "PASS",
            "processTimeSeconds": 120
        });
        assert!(validate_report(&config(), body).is_ok());
    }

    #[test]
    fn missing_line_name_is_invalid_request() {
        let body = json!({
            "orgName": "Test Org",
            "stationName": "station 1",
            "passResult": "PASS",
            "processTimeSeconds": 100
        });
        let rejection = validate_report(&config(), body).unwrap_err();
        assert_eq!(rejection.1["errorMessage"], "lineName may not be empty");
        assert_eq!(
            error_type(rejection),
            (StatusCode::BAD_REQUEST, "INVALID_REQUEST".to_string())
        );
    }

    #[test]
    fn unknown_pass_result_is_invalid_request() {
        let body = json!({
            "orgName": "Test Org",
            "lineName": "line 1",
            "stationName": "station 1",
            "passResult": "PAS",
            "processTimeSeconds": 100
        });
        let rejection = validate_report(&config(), body).unwrap_err();
        assert_eq!(rejection.1["errorMessage"], "'PAS' is not a valid pass result.");
    }

    #[test]
    fn unknown_station_is_resource_not_found() {
        let body = json!({
            "orgName": "Test Org",
            "lineName": "line 1",
            "stationName": "station 2",
            "statusColor": "GREEN"
        });
        let rejection = validate_status(&config(), body).unwrap_err();
        assert_eq!(
            error_type(rejection),
            (StatusCode::BAD_REQUEST, "RESOURCE_NOT_FOUND".to_string())
        );
    }

    #[test]
    fn wrong_org_is_unauthorized() {
        let body = json!({
            "orgName": "Other Org",
            "lineName": "line 1",
            "stationName": "station 1",
            "statusColor": "RED"
        });
        let rejection = validate_status(&config(), body).unwrap_err();
        assert_eq!(
            error_type(rejection),
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED_REQUEST".to_string())
        );
    }

    #[test]
    fn framework_error_has_generic_shape() {
        let body = framework_error(StatusCode::UNAUTHORIZED, "Unauthorized", REPORT_DATA_ROUTE);
        assert_eq!(body["status"], 401);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["path"], REPORT_DATA_ROUTE);
        assert!(body.get("errorType").is_none());
    }
}

//! Request payloads and the server's error envelope.
//!
//! # Design
//! Request types describe only what the caller knows. The organization name is
//! added by the client when the payload is serialized (see `Stamped`), so a
//! request value can be shared between clients for different organizations.
//! Optional fields are left off the wire entirely when unset.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Outcome of a process run at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassResult {
    Pass,
    Fail,
}

/// Status color shown for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

/// Payload for reporting the outcome of a process at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDataRequest {
    pub line_name: String,
    pub station_name: String,
    pub pass_result: PassResult,
    pub process_time_seconds: i64,
    /// Reason of failure. Unset on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    /// Freeform notes on failure. Whether they are required depends on the
    /// organization's settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_notes: Option<String>,
}

impl ReportDataRequest {
    pub fn new(
        line_name: impl Into<String>,
        station_name: impl Into<String>,
        pass_result: PassResult,
        process_time_seconds: i64,
    ) -> Self {
        Self {
            line_name: line_name.into(),
            station_name: station_name.into(),
            pass_result,
            process_time_seconds,
            fail_reason: None,
            fail_notes: None,
        }
    }

    pub fn pass(
        line_name: impl Into<String>,
        station_name: impl Into<String>,
        process_time_seconds: i64,
    ) -> Self {
        Self::new(line_name, station_name, PassResult::Pass, process_time_seconds)
    }

    pub fn fail(
        line_name: impl Into<String>,
        station_name: impl Into<String>,
        process_time_seconds: i64,
        fail_reason: impl Into<String>,
    ) -> Self {
        Self {
            fail_reason: Some(fail_reason.into()),
            ..Self::new(line_name, station_name, PassResult::Fail, process_time_seconds)
        }
    }

    pub fn with_fail_notes(mut self, notes: impl Into<String>) -> Self {
        self.fail_notes = Some(notes.into());
        self
    }
}

/// Payload for changing the status of a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationStatusRequest {
    pub line_name: String,
    pub station_name: String,
    pub status_color: StatusColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_notes: Option<String>,
}

impl UpdateStationStatusRequest {
    pub fn new(
        line_name: impl Into<String>,
        station_name: impl Into<String>,
        status_color: StatusColor,
    ) -> Self {
        Self {
            line_name: line_name.into(),
            station_name: station_name.into(),
            status_color,
            status_reason: None,
            status_notes: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.status_notes = Some(notes.into());
        self
    }
}

/// Wire payload: the caller's request with `orgName` merged in.
#[derive(Debug, Serialize)]
pub(crate) struct Stamped<'a, T> {
    #[serde(rename = "orgName")]
    pub org_name: &'a str,
    #[serde(flatten)]
    pub payload: &'a T,
}

/// Body of a failed response.
///
/// The service's own errors carry `errorType` / `errorMessage`; errors raised
/// by the web framework before the request reaches the service carry
/// `timestamp` / `status` / `error` / `message` / `path`. Only the fields used
/// for classification are interpreted, and those accept any scalar. The rest
/// are kept as raw JSON so an unexpected shape never hides the error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub error_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<i64>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn report_data_omits_unset_optional_fields() {
        let req = ReportDataRequest::pass("line 1", "station 1", 120);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({
                "lineName": "line 1",
                "stationName": "station 1",
                "passResult": "PASS",
                "processTimeSeconds": 120
            })
        );
        assert!(json.get("failReason").is_none());
        assert!(json.get("failNotes").is_none());
    }

    #[test]
    fn report_data_fail_carries_reason_and_notes() {
        let req = ReportDataRequest::fail("line 1", "station 1", 200, "Test Failure")
            .with_fail_notes("notes");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["passResult"], "FAIL");
        assert_eq!(json["failReason"], "Test Failure");
        assert_eq!(json["failNotes"], "notes");
    }

    #[test]
    fn status_colors_serialize_uppercase() {
        for (color, expected) in [
            (StatusColor::Green, "GREEN"),
            (StatusColor::Yellow, "YELLOW"),
            (StatusColor::Red, "RED"),
        ] {
            assert_eq!(serde_json::to_value(color).unwrap(), expected);
        }
    }

    #[test]
    fn stamped_payload_merges_org_name() {
        let req = UpdateStationStatusRequest::new("line 1", "station 1", StatusColor::Green);
        let stamped = Stamped {
            org_name: "Test Org",
            payload: &req,
        };
        let json = serde_json::to_value(&stamped).unwrap();
        assert_eq!(
            json,
            json!({
                "orgName": "Test Org",
                "lineName": "line 1",
                "stationName": "station 1",
                "statusColor": "GREEN"
            })
        );
    }

    #[test]
    fn envelope_accepts_either_shape() {
        let app: ErrorEnvelope = serde_json::from_str(
            r#"{"errorType":"INVALID_REQUEST","errorMessage":"lineName may not be empty"}"#,
        )
        .unwrap();
        assert_eq!(app.error_type.as_deref(), Some("INVALID_REQUEST"));
        assert!(app.status.is_none());

        let framework: ErrorEnvelope = serde_json::from_str(
            r#"{"timestamp":"2018-03-07T16:15:19.033+0000","status":401,"error":"Unauthorized","message":"Unauthorized","path":"/public/api/v1/data/report"}"#,
        )
        .unwrap();
        assert_eq!(framework.status, Some(401));
        assert!(framework.error_type.is_none());

        let empty: ErrorEnvelope = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ErrorEnvelope::default());
    }

    #[test]
    fn envelope_tolerates_non_string_informational_fields() {
        let framework: ErrorEnvelope = serde_json::from_str(
            r#"{"timestamp":1520439319033,"status":401,"error":{"code":401},"message":"Unauthorized","path":null}"#,
        )
        .unwrap();
        assert_eq!(framework.status, Some(401));
        assert_eq!(framework.timestamp, Some(json!(1520439319033u64)));
        assert_eq!(framework.message.as_deref(), Some("Unauthorized"));
        assert!(framework.path.is_none());
    }

    #[test]
    fn envelope_reads_scalar_messages_and_string_status() {
        let app: ErrorEnvelope =
            serde_json::from_str(r#"{"errorType":"INVALID_REQUEST","errorMessage":42}"#).unwrap();
        assert_eq!(app.error_message.as_deref(), Some("42"));

        let framework: ErrorEnvelope =
            serde_json::from_str(r#"{"status":"404","message":true}"#).unwrap();
        assert_eq!(framework.status, Some(404));
        assert_eq!(framework.message.as_deref(), Some("true"));

        let odd: ErrorEnvelope =
            serde_json::from_str(r#"{"errorType":["x"],"status":{"code":500}}"#).unwrap();
        assert!(odd.error_type.is_none());
        assert!(odd.status.is_none());
    }
}

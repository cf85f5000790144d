//! Client for reporting manufacturing-line events to Andon.
//!
//! # Overview
//! Sends process outcomes and station status changes to the Andon API as
//! authenticated JSON `POST`s and turns the server's error responses into a
//! typed `AndonError` the caller can match on.
//!
//! # Design
//! - `AndonClient` holds only immutable configuration, so one instance can
//!   serve concurrent calls.
//! - Each operation is `build_*` (produces an `HttpRequest`) followed by
//!   `parse_response` (consumes an `HttpResponse`); a `Transport` performs the
//!   round-trip in between. `ReqwestTransport` is the default.
//! - Nothing is retried: every failure is returned to the caller on the first
//!   attempt.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{AndonClient, REPORT_DATA_PATH, UPDATE_STATUS_PATH};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{AndonError, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ErrorEnvelope, PassResult, ReportDataRequest, StatusColor, UpdateStationStatusRequest,
};

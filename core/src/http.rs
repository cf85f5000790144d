//! HTTP requests and responses as plain data.
//!
//! # Design
//! `AndonClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. A `Transport` sits in between and performs
//! the actual round-trip, so the pipeline can be exercised with canned
//! responses or driven by a caller-owned HTTP stack.
//!
//! Every request to the monitoring service is a JSON `POST`, so the method is
//! implied rather than carried.

/// An outbound `POST` described as plain data.
///
/// Built by `AndonClient::build_*` methods. `url` is already resolved against
/// the client's base endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` and consumed by `AndonClient::parse_response`.
/// Only the status and body take part in classification.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            url: "http://localhost/data/report".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: "{}".to_string(),
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn success_covers_whole_2xx_band() {
        let status = |status| HttpResponse {
            status,
            body: String::new(),
        };
        assert!(status(200).is_success());
        assert!(status(204).is_success());
        assert!(status(299).is_success());
        assert!(!status(199).is_success());
        assert!(!status(300).is_success());
        assert!(!status(401).is_success());
    }
}

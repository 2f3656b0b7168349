//! Forwarding matched requests to their backend.

use crate::error::ProxyError;
use crate::route::Route;
use reqwest::header::{CONTENT_LENGTH, HOST, HeaderMap, TRANSFER_ENCODING};
use reqwest::{Client, Method, StatusCode};
use rootcause::Report;
use std::time::Duration;

/// The backend's reply, ready to be relayed to the client.
#[derive(Debug)]
pub struct ForwardedResponse {
    /// Upstream status, relayed verbatim.
    pub status: StatusCode,
    /// Upstream headers minus framing headers the server re-establishes.
    pub headers: HeaderMap,
    /// Upstream body, relayed verbatim.
    pub body: Vec<u8>,
}

/// Relays requests to backends with an explicit per-call timeout.
///
/// No retry anywhere: a transport-level failure surfaces immediately as
/// [`ProxyError::Forward`] and the caller answers 500.
pub struct Forwarder {
    http: Client,
}

impl Forwarder {
    /// Creates a forwarder whose backend calls time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Configuration`] if the HTTP client cannot be
    /// constructed.
    pub fn new(timeout: Duration) -> Result<Self, Report<ProxyError>> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProxyError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { http })
    }

    /// Forwards one request along a matched route.
    ///
    /// The target URL is the route's base plus the rewritten path plus the
    /// original query string. All request headers are copied except Host
    /// and Content-Length; the method and body pass through unchanged.
    pub async fn forward(
        &self,
        route: &Route,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Vec<u8>,
    ) -> Result<ForwardedResponse, Report<ProxyError>> {
        let target = route.target_url(path, query);

        let mut outbound = HeaderMap::new();
        for (name, value) in headers {
            if name != &HOST && name != &CONTENT_LENGTH {
                outbound.append(name.clone(), value.clone());
            }
        }

        tracing::debug!(%method, path, %target, "forwarding request");

        let response = self
            .http
            .request(method, &target)
            .headers(outbound)
            .body(body)
            .send()
            .await
            .map_err(|e| ProxyError::Forward {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        // Framing is re-established when the relayed response is written.
        headers.remove(CONTENT_LENGTH);
        headers.remove(TRANSFER_ENCODING);

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Forward {
                target,
                reason: format!("failed to read upstream body: {e}"),
            })?
            .to_vec();

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteDef, RouteTable};
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn table_for(server: &MockServer, pattern: &str, rewrite: Option<&str>) -> RouteTable {
        RouteTable::new(vec![RouteDef {
            pattern: pattern.to_string(),
            target_base: server.uri(),
            rewrite_prefix: rewrite.map(str::to_string),
        }])
        .expect("valid table")
    }

    #[tokio::test]
    async fn forward_relays_method_path_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/titanic/predict"))
            .and(header("x-request-source", "frontend"))
            .and(body_string("{\"age\":29}"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-model-version", "3")
                    .set_body_string("{\"survived\":true}"),
            )
            .mount(&server)
            .await;

        let table = table_for(&server, "/api/ai/ml/**", Some("/titanic"));
        let route = table.matched("/api/ai/ml/predict").expect("matched");
        let forwarder = Forwarder::new(TIMEOUT).expect("forwarder");

        let mut headers = HeaderMap::new();
        headers.insert("x-request-source", HeaderValue::from_static("frontend"));
        headers.insert(HOST, HeaderValue::from_static("gateway.example.com"));

        let response = forwarder
            .forward(
                route,
                Method::POST,
                "/api/ai/ml/predict",
                None,
                &headers,
                b"{\"age\":29}".to_vec(),
            )
            .await
            .expect("forwarded");

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(
            response.headers.get("x-model-version"),
            Some(&HeaderValue::from_static("3"))
        );
        assert_eq!(response.body, b"{\"survived\":true}");
    }

    #[tokio::test]
    async fn forward_preserves_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/42"))
            .and(query_param("fields", "name"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let table = table_for(&server, "/api/users/**", None);
        let route = table.matched("/api/users/42").expect("matched");
        let forwarder = Forwarder::new(TIMEOUT).expect("forwarder");

        let response = forwarder
            .forward(
                route,
                Method::GET,
                "/api/users/42",
                Some("fields=name"),
                &HeaderMap::new(),
                Vec::new(),
            )
            .await
            .expect("forwarded");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, b"ok");
    }

    #[tokio::test]
    async fn forward_relays_upstream_error_statuses_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
            .mount(&server)
            .await;

        let table = table_for(&server, "/api/users/**", None);
        let route = table.matched("/api/users/missing").expect("matched");
        let forwarder = Forwarder::new(TIMEOUT).expect("forwarder");

        let response = forwarder
            .forward(
                route,
                Method::GET,
                "/api/users/missing",
                None,
                &HeaderMap::new(),
                Vec::new(),
            )
            .await
            .expect("forwarded");

        // An upstream 404 is the backend's answer, not a gateway error.
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, b"no such user");
    }

    #[tokio::test]
    async fn forward_fails_when_backend_is_unreachable() {
        let table = RouteTable::new(vec![RouteDef {
            pattern: "/api/users/**".to_string(),
            // Nothing listens here.
            target_base: "http://127.0.0.1:9".to_string(),
            rewrite_prefix: None,
        }])
        .expect("valid table");
        let route = table.matched("/api/users/1").expect("matched");
        let forwarder = Forwarder::new(Duration::from_millis(500)).expect("forwarder");

        let err = forwarder
            .forward(
                route,
                Method::GET,
                "/api/users/1",
                None,
                &HeaderMap::new(),
                Vec::new(),
            )
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to forward"));
    }
}

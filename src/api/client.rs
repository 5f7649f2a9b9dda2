//! The request dispatcher.
//!
//! Every API call funnels through [`ProxmoxClient::invoke`]: build the URL
//! from the relative path, attach the session cookie (and the CSRF header for
//! mutating verbs), execute, and normalize the response into an [`Envelope`].
//! A 401 whose body is not JSON means the ticket expired - the dispatcher
//! re-authenticates through the session lock and re-issues the identical
//! request exactly once, tracked with an explicit retry flag.

use std::sync::Arc;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiError, Envelope, Result};
use crate::auth::{Authenticator, Credentials, Session};
use crate::config::{ConnectOptions, Endpoint};

/// Cookie carrying the session ticket, on every verb.
const AUTH_COOKIE: &str = "PVEAuthCookie";

/// Header carrying the CSRF prevention token, on mutating verbs only.
const CSRF_HEADER: &str = "CSRFPreventionToken";

/// Form fields for a request body, encoded as `application/x-www-form-urlencoded`.
pub type FormData = Vec<(String, String)>;

/// Outcome of a single dispatch attempt.
enum Dispatched {
    Complete(Envelope),
    ExpiredTicket,
}

/// Client for one Proxmox VE cluster.
///
/// Authentication is lazy: the first call obtains a session ticket, later
/// calls reuse it, and a ticket the server has expired is refreshed
/// transparently. Clone is cheap - clones share the HTTP connection pool and
/// the session, so concurrent callers serialize re-authentication through one
/// lock instead of racing.
#[derive(Clone)]
pub struct ProxmoxClient {
    http: Client,
    endpoint: Endpoint,
    auth: Arc<Authenticator>,
}

impl ProxmoxClient {
    /// Build a client from connection options. No request is made yet.
    pub fn new(options: ConnectOptions) -> Result<Self> {
        options.validate()?;

        let mut builder = Client::builder().danger_accept_invalid_certs(!options.verify_tls);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let endpoint = Endpoint::new(&options.host, options.port);
        let credentials = Credentials::new(options.username, options.password);
        let auth = Arc::new(Authenticator::new(http.clone(), endpoint.clone(), credentials));

        Ok(Self {
            http,
            endpoint,
            auth,
        })
    }

    /// Authenticate eagerly, replacing any held session.
    ///
    /// Calling this is optional - [`invoke`](Self::invoke) logs in on first
    /// use - but useful to fail fast on bad credentials.
    pub async fn login(&self) -> Result<Session> {
        self.auth.authenticate().await
    }

    /// The currently held session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.auth.current_session().await
    }

    /// Execute one logical API call.
    ///
    /// `path` is relative to `/api2/json/`; `body` is form-encoded when
    /// present. Non-2xx responses with valid JSON bodies are returned as
    /// envelopes, not errors - inspect `http_status`. At most one
    /// re-authentication and retry happens per call, and only for the
    /// expired-ticket shape (401 with a non-JSON body).
    pub async fn invoke(
        &self,
        method: Method,
        path: &str,
        body: Option<&FormData>,
    ) -> Result<Envelope> {
        let session = self.auth.session_or_login().await?;

        match self.dispatch(method.clone(), path, body, &session, false).await? {
            Dispatched::Complete(envelope) => Ok(envelope),
            Dispatched::ExpiredTicket => {
                let fresh = self.auth.refresh_stale(session.ticket()).await?;
                match self.dispatch(method, path, body, &fresh, true).await? {
                    Dispatched::Complete(envelope) => Ok(envelope),
                    // With the retry flag set, dispatch surfaces a second
                    // rejection as an error instead of signalling expiry.
                    Dispatched::ExpiredTicket => Err(ApiError::Protocol {
                        code: 401,
                        detail: "ticket rejected after re-authentication".into(),
                    }),
                }
            }
        }
    }

    /// GET a resource path.
    pub async fn get(&self, path: &str) -> Result<Envelope> {
        self.invoke(Method::GET, path, None).await
    }

    /// POST to a resource path.
    pub async fn post(&self, path: &str, body: Option<&FormData>) -> Result<Envelope> {
        self.invoke(Method::POST, path, body).await
    }

    /// PUT to a resource path.
    pub async fn put(&self, path: &str, body: Option<&FormData>) -> Result<Envelope> {
        self.invoke(Method::PUT, path, body).await
    }

    /// DELETE a resource path.
    pub async fn delete(&self, path: &str, body: Option<&FormData>) -> Result<Envelope> {
        self.invoke(Method::DELETE, path, body).await
    }

    /// One attempt: build, send, classify the response.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&FormData>,
        session: &Session,
        is_retry: bool,
    ) -> Result<Dispatched> {
        let url = self.endpoint.url(path);
        debug!(%method, path, is_retry, "dispatching request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json")
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .header(header::COOKIE, format!("{AUTH_COOKIE}={}", session.ticket()));
        if method != Method::GET {
            request = request.header(CSRF_HEADER, session.csrf_token());
        }
        if let Some(fields) = body {
            request = request.form(fields);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => Ok(Dispatched::Complete(Envelope::from_json(parsed, status))),
            // The expired-ticket shape: the server answers 401 with its HTML
            // login page. A 401 carrying valid JSON is a remote application
            // error and lands in the arm above.
            Err(_) if status == StatusCode::UNAUTHORIZED && !is_retry => {
                warn!(path, "ticket rejected, re-authenticating");
                Ok(Dispatched::ExpiredTicket)
            }
            Err(err) => Err(ApiError::protocol(
                status.as_u16(),
                &format!("expected JSON: {err}"),
                &text,
            )),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str) -> Self {
        let http = Client::new();
        let endpoint = Endpoint::from_base(base_url);
        let auth = Arc::new(Authenticator::new(
            http.clone(),
            endpoint.clone(),
            Credentials::new("root@pam", "secret"),
        ));
        Self {
            http,
            endpoint,
            auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{auth_ok, data_ok, expired_ticket, MockServer};
    use serde_json::json;

    fn form(fields: &[(&str, &str)]) -> FormData {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn get_carries_cookie_but_never_csrf() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            data_ok("[]"),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let envelope = client.get("cluster/status").await.unwrap();
        assert!(envelope.is_ok());

        let requests = server.requests().await;
        assert_eq!(requests.len(), 2);
        let get = &requests[1];
        assert_eq!(get.method, "GET");
        assert_eq!(get.path, "/api2/json/cluster/status");
        assert_eq!(get.header("accept"), Some("application/json"));
        assert_eq!(get.header("cookie"), Some("PVEAuthCookie=PVE:root@pam:AAAA"));
        assert!(get.header("csrfpreventiontoken").is_none());
    }

    #[tokio::test]
    async fn create_vm_post_sends_csrf_and_returns_upid() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            data_ok(r#""UPID:node1:00001234:00ABCDEF:5F000000:qmcreate:100:root@pam:""#),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let params = form(&[("vmid", "100"), ("cores", "2"), ("memory", "1024")]);
        let envelope = client.post("nodes/node1/qemu", Some(&params)).await.unwrap();

        assert_eq!(envelope.http_status.code, 200);
        assert!(envelope.http_status.ok);
        assert_eq!(envelope.http_status.reason, "OK");
        assert_eq!(
            envelope.data,
            json!("UPID:node1:00001234:00ABCDEF:5F000000:qmcreate:100:root@pam:")
        );

        let requests = server.requests().await;
        let post = &requests[1];
        assert_eq!(post.method, "POST");
        assert_eq!(post.header("csrfpreventiontoken"), Some("csrf-1"));
        assert_eq!(
            post.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert!(post.body.contains("vmid=100"));
        assert!(post.body.contains("memory=1024"));
    }

    #[tokio::test]
    async fn put_and_delete_also_send_csrf() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            data_ok("null"),
            data_ok("null"),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        client
            .put("nodes/node1/dns", Some(&form(&[("search", "example.org")])))
            .await
            .unwrap();
        client.delete("pools/dev", None).await.unwrap();

        let requests = server.requests().await;
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].header("csrfpreventiontoken"), Some("csrf-1"));
        assert_eq!(requests[2].method, "DELETE");
        assert_eq!(requests[2].header("csrfpreventiontoken"), Some("csrf-1"));
    }

    #[tokio::test]
    async fn expired_ticket_reauthenticates_and_retries_once() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            expired_ticket(),
            auth_ok("PVE:root@pam:BBBB", "csrf-2"),
            data_ok(r#""UPID:node1:00001234:00ABCDEF:5F000000:qmstart:100:root@pam:""#),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let params = form(&[("timeout", "30")]);
        let envelope = client
            .post("nodes/node1/qemu/100/status/start", Some(&params))
            .await
            .unwrap();
        assert!(envelope.upid().is_some());

        let requests = server.requests().await;
        assert_eq!(requests.len(), 4);

        // First attempt with the original session.
        assert_eq!(requests[1].header("cookie"), Some("PVEAuthCookie=PVE:root@pam:AAAA"));
        assert_eq!(requests[1].header("csrfpreventiontoken"), Some("csrf-1"));

        // One re-authentication, then the identical request with the fresh pair.
        assert_eq!(requests[2].path, "/api2/json/access/ticket");
        let retry = &requests[3];
        assert_eq!(retry.method, "POST");
        assert_eq!(retry.path, "/api2/json/nodes/node1/qemu/100/status/start");
        assert_eq!(retry.header("cookie"), Some("PVEAuthCookie=PVE:root@pam:BBBB"));
        assert_eq!(retry.header("csrfpreventiontoken"), Some("csrf-2"));
        assert_eq!(retry.body, requests[1].body);
    }

    #[tokio::test]
    async fn second_rejection_is_terminal_with_one_reauth() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            expired_ticket(),
            auth_ok("PVE:root@pam:BBBB", "csrf-2"),
            expired_ticket(),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let err = client.get("cluster/status").await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol { code: 401, .. }));

        // Exactly one ticket refresh: login, attempt, refresh, retry.
        let requests = server.requests().await;
        assert_eq!(requests.len(), 4);
        let ticket_posts = requests
            .iter()
            .filter(|r| r.path == "/api2/json/access/ticket")
            .count();
        assert_eq!(ticket_posts, 2); // initial login + the single recovery
    }

    #[tokio::test]
    async fn remote_json_errors_pass_through_as_envelopes() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            (
                400,
                "Bad Request",
                r#"{"data":null,"errors":{"vmid":"invalid format - int expected"}}"#.into(),
            ),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let envelope = client
            .post("nodes/node1/qemu", Some(&form(&[("vmid", "abc")])))
            .await
            .unwrap();
        assert!(!envelope.is_ok());
        assert_eq!(envelope.http_status.code, 400);
        assert_eq!(
            envelope.errors,
            Some(json!({"vmid": "invalid format - int expected"}))
        );
    }

    #[tokio::test]
    async fn non_json_body_without_401_is_terminal() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            (502, "Bad Gateway", "<html>upstream down</html>".into()),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        let err = client.get("cluster/status").await.unwrap_err();
        match err {
            ApiError::Protocol { code, detail } => {
                assert_eq!(code, 502);
                assert!(detail.contains("upstream down"));
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
        assert_eq!(server.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn session_is_reused_across_calls() {
        let server = MockServer::start(vec![
            auth_ok("PVE:root@pam:AAAA", "csrf-1"),
            data_ok("[]"),
            data_ok("[]"),
        ])
        .await;
        let client = ProxmoxClient::for_tests(&server.base_url());

        client.get("cluster/status").await.unwrap();
        client.get("nodes").await.unwrap();

        let requests = server.requests().await;
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].header("cookie"), Some("PVEAuthCookie=PVE:root@pam:AAAA"));
    }
}

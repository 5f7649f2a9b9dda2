//! Session acquisition and refresh.
//!
//! The authenticator is the only writer of the session. All writes happen
//! under one lock, so concurrent callers that race into an expired ticket
//! serialize through a single critical section instead of each issuing their
//! own `access/ticket` request.

use reqwest::{header, Client};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::{ApiError, Result};
use crate::auth::{Credentials, Session};
use crate::config::Endpoint;

/// Fixed login endpoint, relative to the `api2/json` base.
const TICKET_PATH: &str = "access/ticket";

#[derive(Deserialize)]
struct TicketResponse {
    data: TicketData,
}

#[derive(Deserialize)]
struct TicketData {
    #[serde(default)]
    ticket: String,
    #[serde(rename = "CSRFPreventionToken", default)]
    csrf_token: String,
}

/// Obtains and holds exactly one valid [`Session`] for a credentials set.
pub struct Authenticator {
    http: Client,
    endpoint: Endpoint,
    credentials: Credentials,
    session: Mutex<Option<Session>>,
}

impl Authenticator {
    pub(crate) fn new(http: Client, endpoint: Endpoint, credentials: Credentials) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            session: Mutex::new(None),
        }
    }

    /// Establish a fresh session, replacing any held one.
    ///
    /// On a non-success response the held session is left untouched and an
    /// [`ApiError::AuthFailed`] carries the status code and reason. Repeated
    /// calls simply swap in a new ticket/token pair - this is used both for
    /// the initial login and for expiry recovery.
    pub async fn authenticate(&self) -> Result<Session> {
        let mut held = self.session.lock().await;
        let fresh = self.request_ticket().await?;
        *held = Some(fresh.clone());
        Ok(fresh)
    }

    /// The currently held session, if any.
    pub async fn current_session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    /// Return the held session, logging in first if there is none or the held
    /// ticket is close to its server-side expiry.
    pub(crate) async fn session_or_login(&self) -> Result<Session> {
        let mut held = self.session.lock().await;
        if let Some(session) = held.as_ref() {
            if !session.is_stale() {
                return Ok(session.clone());
            }
            debug!("held ticket is stale, re-authenticating");
        }
        let fresh = self.request_ticket().await?;
        *held = Some(fresh.clone());
        Ok(fresh)
    }

    /// Refresh after a rejected ticket, suppressing duplicate refreshes.
    ///
    /// `stale_ticket` is the ticket the failed request was sent with. If the
    /// held ticket already differs, another caller refreshed while this one
    /// was in flight and the current session is reused as-is.
    pub(crate) async fn refresh_stale(&self, stale_ticket: &str) -> Result<Session> {
        let mut held = self.session.lock().await;
        if let Some(session) = held.as_ref() {
            if session.ticket() != stale_ticket {
                debug!("session already refreshed by a concurrent caller");
                return Ok(session.clone());
            }
        }
        let fresh = self.request_ticket().await?;
        *held = Some(fresh.clone());
        Ok(fresh)
    }

    /// Issue the form-encoded `access/ticket` POST and parse the pair out of
    /// the response. Does not touch the held session.
    async fn request_ticket(&self) -> Result<Session> {
        let url = self.endpoint.url(TICKET_PATH);
        debug!(username = self.credentials.username(), "requesting session ticket");

        let response = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&self.credentials.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(code = status.as_u16(), "authentication rejected");
            return Err(ApiError::AuthFailed {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: TicketResponse = serde_json::from_str(&body).map_err(|err| {
            ApiError::protocol(status.as_u16(), &format!("bad ticket response: {err}"), &body)
        })?;

        if parsed.data.ticket.is_empty() || parsed.data.csrf_token.is_empty() {
            return Err(ApiError::protocol(
                status.as_u16(),
                "ticket response missing ticket or CSRF token",
                &body,
            ));
        }

        debug!("session established");
        Ok(Session::new(parsed.data.ticket, parsed.data.csrf_token))
    }
}

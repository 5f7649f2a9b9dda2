use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Proxmox ticket lifetime. The server invalidates tickets after two hours.
const TICKET_LIFETIME_MINUTES: i64 = 120;

/// Buffer before the hard expiry at which a session is considered stale and
/// refreshed proactively instead of waiting for a 401.
const REFRESH_BUFFER_MINUTES: i64 = 5;

/// One authenticated session: ticket plus CSRF prevention token.
///
/// Both values come from the same `access/ticket` response and are only ever
/// replaced together. The ticket is an opaque cookie value; the CSRF token is
/// attached as a header to mutating calls.
#[derive(Clone)]
pub struct Session {
    ticket: String,
    csrf_token: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(ticket: String, csrf_token: String) -> Self {
        Self {
            ticket,
            csrf_token,
            created_at: Utc::now(),
        }
    }

    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the ticket is close enough to its server-side expiry that it
    /// should be refreshed rather than used.
    pub fn is_stale(&self) -> bool {
        let refresh_at = self.created_at
            + Duration::minutes(TICKET_LIFETIME_MINUTES - REFRESH_BUFFER_MINUTES);
        Utc::now() > refresh_at
    }

    #[cfg(test)]
    pub(crate) fn aged(ticket: &str, csrf_token: &str, age_minutes: i64) -> Self {
        Self {
            ticket: ticket.to_string(),
            csrf_token: csrf_token.to_string(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }
}

// The ticket is a credential; keep it out of Debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("ticket", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

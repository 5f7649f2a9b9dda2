//! Client library for the Proxmox VE REST API.
//!
//! Proxmox authenticates with a session ticket obtained from `access/ticket`;
//! the ticket travels as the `PVEAuthCookie` cookie on every call, and
//! state-mutating calls additionally carry a `CSRFPreventionToken` header.
//! This crate owns that handshake: it logs in lazily, attaches the right auth
//! material per verb, detects ticket expiry (a 401 with a non-JSON body), and
//! transparently re-authenticates and retries exactly once.
//!
//! Every call returns an [`Envelope`]: the endpoint's `data` payload as raw
//! JSON next to the HTTP status metadata, kept as two separate values so a
//! payload field can never collide with the wrapper.
//!
//! # Quick start
//!
//! ```no_run
//! use pve_client::{ConnectOptions, ProxmoxClient};
//!
//! # async fn example() -> pve_client::Result<()> {
//! let client = ProxmoxClient::new(
//!     ConnectOptions::new("pve1.example.org", "automation@pve", "secret"),
//! )?;
//!
//! let status = client.cluster_status().await?;
//! println!("{}", status.data);
//!
//! // Long-running operations hand back a task id (UPID)
//! let started = client.start_vm("pve1", 100).await?;
//! if let Some(upid) = started.upid() {
//!     let task = client.task_status("pve1", upid).await?;
//!     println!("{}", task.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Clusters with self-signed certificates opt out of verification explicitly:
//!
//! ```no_run
//! # use pve_client::ConnectOptions;
//! let options = ConnectOptions::new("10.0.0.2", "root@pam", "secret")
//!     .verify_tls(false);
//! ```

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiError, Envelope, FormData, HttpStatus, ProxmoxClient, Result};
pub use auth::{Authenticator, Credentials, Session};
pub use config::ConnectOptions;

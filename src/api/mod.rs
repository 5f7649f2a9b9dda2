//! REST API dispatch and resource calls.
//!
//! [`ProxmoxClient`] is the single entry point: its [`invoke`](ProxmoxClient::invoke)
//! builds the request, attaches the session cookie and (for mutating verbs)
//! the CSRF header, executes the call, and recovers once from ticket expiry.
//! The resource modules (`cluster`, `nodes`, `qemu`, `lxc`, `storage`,
//! `pools`) are thin path-templating wrappers over `invoke`.

pub mod client;
pub mod cluster;
pub mod envelope;
pub mod error;
pub mod lxc;
pub mod nodes;
pub mod pools;
pub mod qemu;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{FormData, ProxmoxClient};
pub use envelope::{Envelope, HttpStatus};
pub use error::{ApiError, Result};

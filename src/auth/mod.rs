//! Authentication: credentials, session tickets, and the authenticator.
//!
//! Proxmox sessions are a pair of values issued together by `access/ticket`:
//! an opaque ticket (sent back as a cookie) and a CSRF prevention token (sent
//! as a header on mutating calls). The [`Authenticator`] owns the credentials
//! and the current [`Session`], and is the only place the pair is replaced -
//! always wholesale, never one half at a time.

pub mod authenticator;
pub mod credentials;
pub mod session;

pub use authenticator::Authenticator;
pub use credentials::Credentials;
pub use session::Session;

//! ticketcheck-auth: session client for the ticketcheck auth server
//!
//! This crate is the authentication collaborator used by the check-in
//! core. It talks to a better-auth server over HTTP, keeps the session
//! cookie in process memory, and exposes two narrow seams:
//!
//! - [`SessionSource`]: resolves the current [`SessionStatus`]
//! - [`CredentialSource`]: yields the `Cookie` header that authenticates
//!   requests to the check-in API
//!
//! ## Layer 0 - Identity
//!
//! The core never mutates session state; sign-in and sign-out go through
//! [`AuthClient`].

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;
#[cfg(feature = "test-util")]
pub mod testing;

pub use client::{AuthClient, SocialRedirect};
pub use config::AuthConfig;
pub use credentials::{CookieJar, CredentialSource, StaticCredentials};
pub use error::AuthError;
pub use session::{Session, SessionInfo, SessionPhase, SessionSource, SessionStatus, User};

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

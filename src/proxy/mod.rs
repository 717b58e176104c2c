//! Pass-through proxy in front of the remote content service.
//!
//! Exists so browser-side clients can reach the service without tripping
//! cross-origin checks. Runs as a local HTTP server ([`ProxyServer`]) or
//! handles one serverless-style [`ProxyEvent`] at a time ([`Forwarder`]).

pub mod connection;
pub mod error;
pub mod forward;
pub mod health;
pub mod router;
pub mod server;
pub mod shutdown;

pub use error::{ErrorResponse, ProxyError, UPSTREAM_FAILURE_BODY};
pub use forward::{Forwarder, ProxyEvent, ProxyReply};
pub use server::{ProxyHandle, ProxyServer};

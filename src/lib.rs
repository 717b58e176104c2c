//! Quran reader backend: a CORS-enabling forwarding proxy, a typed client
//! for the content API, persisted language preferences, and the page logic
//! the terminal frontend is built on.

pub mod api;
pub mod config;
pub mod logging;
pub mod preferences;
pub mod proxy;
pub mod view;

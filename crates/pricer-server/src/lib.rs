//! Nightly rate pricing server
//!
//! Router and configuration are exposed here so integration tests can drive
//! the API without binding a socket.

pub mod api;
pub mod config;

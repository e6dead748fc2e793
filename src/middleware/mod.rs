//! Middleware module
//!
//! Contains the request logger and the access gate.

pub mod auth;
pub mod request_log;

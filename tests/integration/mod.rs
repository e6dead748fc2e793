//! Integration tests for the gateway
//!
//! These tests drive the real router end to end: request logging, the access
//! gate, sanitization and forwarding to a stub upstream.

mod forwarding;

//! Mock infrastructure for testing external services
//!
//! Provides a stub of the upstream LLM gateway that records what it receives.


pub use upstream::*;

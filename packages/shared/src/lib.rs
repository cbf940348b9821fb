//! Shared utilities for Sketchbluff.
//!
//! Logger setup and time helpers used by the server crate and its tests.

pub mod logger;
pub mod time;

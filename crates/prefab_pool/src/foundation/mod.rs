//! Foundation module - Core utilities shared by the pool and its hosts
//!
//! Currently this is the logging setup used by binaries and tests.

pub mod logging;

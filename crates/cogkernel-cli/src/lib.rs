//! Cogkernel CLI library
//!
//! Scenario loading and logging setup shared by the `cogkernel` binary
//! and its tests.

pub mod logging;
pub mod scenario;

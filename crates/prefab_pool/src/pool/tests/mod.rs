//! Registry-level scenarios
//!
//! Exercise [`PoolRegistry`](super::PoolRegistry) end to end on top of the
//! in-memory scene runtime.

mod grouping;
mod registry_scenarios;

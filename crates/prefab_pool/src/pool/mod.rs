//! Prefab pooling
//!
//! Coordinates one [`TemplatePool`] per template behind a [`PoolRegistry`].
//!
//! # Architecture
//!
//! ```text
//! caller → PoolRegistry ──template key──→ TemplatePool ──→ ObjectRuntime
//!              |                              |
//!         live index                     idle stack
//!   (instance key → template key)     capacity, callbacks
//! ```
//!
//! The registry records every instance it hands out so `release` can route
//! the instance back without the caller naming its template, and can reject
//! objects it never handed out.

pub mod global;

mod error;
mod policy;
mod registry;
mod template_pool;

#[cfg(test)]
mod tests;

pub use error::PoolError;
pub use policy::{PoolCallback, PoolPolicy};
pub use registry::PoolRegistry;
pub use template_pool::TemplatePool;

/// Snapshot of a template pool's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Active plus idle instances
    pub all: usize,
    /// Instances checked out to callers
    pub active: usize,
    /// Instances waiting in the pool
    pub inactive: usize,
    /// Configured max capacity
    pub max_capacity: usize,
}

impl PoolStats {
    /// Fraction of the capacity currently in existence
    ///
    /// Unbounded pools always report zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f32 {
        if self.max_capacity == 0 || self.max_capacity == usize::MAX {
            0.0
        } else {
            self.all as f32 / self.max_capacity as f32
        }
    }

    /// Whether no further instance can be created
    pub const fn is_full(&self) -> bool {
        self.all >= self.max_capacity
    }
}

//! # Prefab Pool
//!
//! Object pooling for engine-managed prefab instances. Instead of instantiating
//! and destroying an object every time one is needed, callers check instances
//! out of a per-template pool and hand them back when done.
//!
//! ## Features
//!
//! - **Per-Template Pools**: One idle stack per template, keyed by template identity
//! - **Capacity Limits**: Hard caps with a fallible `try_get` and a strict `get`
//! - **Ownership Tracking**: Release routes by instance identity and rejects foreign objects
//! - **Grouping**: Optional reparenting of idle instances under a per-template container
//! - **Lifecycle Callbacks**: Create/get/release/destroy callbacks plus capability hooks
//! - **Default Registry**: A lazily created registry for callers that don't want to own one
//!
//! ## Quick Start
//!
//! ```rust
//! use prefab_pool::prelude::*;
//!
//! fn main() -> Result<(), PoolError> {
//!     let mut runtime = SceneRuntime::new();
//!     let bullet = runtime.spawn("Bullet");
//!
//!     let mut pool = PoolRegistry::with_items_container(runtime, "PooledItems");
//!     pool.configure(&bullet, PoolPolicy::new(32))?;
//!     pool.prewarm(&bullet, 8);
//!
//!     let instance = pool.get(&bullet)?;
//!     assert_eq!(pool.count_active(&bullet), 1);
//!
//!     pool.release(instance)?;
//!     assert_eq!(pool.count_inactive(&bullet), 8);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod pool;
pub mod runtime;

pub use pool::{global, PoolError, PoolPolicy, PoolRegistry, PoolStats, TemplatePool};
pub use runtime::{ObjectRuntime, PoolEvent, PoolHooks};

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PolicySettings, PoolSettings, TemplateSettings},
        pool::{global, PoolError, PoolPolicy, PoolRegistry, PoolStats, TemplatePool},
        runtime::{
            scene::{NodeId, SceneRuntime},
            ObjectRuntime, PoolEvent, PoolHooks,
        },
    };
}

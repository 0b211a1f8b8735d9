//! Pool error types

use thiserror::Error;

/// Errors reported by pools and registries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A policy asked for a max capacity of zero
    #[error("The max capacity must be greater than zero, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity
        capacity: usize,
    },

    /// No idle instance is left and the pool may not create another one
    #[error("The pool for template {template} has reached its max capacity of {max_capacity}")]
    CapacityExceeded {
        /// Identity of the template, as printed by the runtime
        template: String,
        /// Capacity that was reached
        max_capacity: usize,
    },

    /// The released object is not checked out from this registry
    #[error("Object {object} was not created by this pool, so it cannot be released")]
    NotOwned {
        /// Identity of the object, as printed by the runtime
        object: String,
    },

    /// The default registry was already created or initialized
    #[error("The default pool registry is already initialized")]
    AlreadyInitialized,
}

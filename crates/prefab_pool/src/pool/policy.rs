//! Per-template pool policy
//!
//! A [`PoolPolicy`] is a plain value: capacity, activation and grouping flags
//! plus four optional lifecycle callbacks. Cloning a policy shares its
//! callbacks.

use super::PoolError;
use crate::runtime::ObjectRuntime;
use std::fmt;
use std::rc::Rc;

/// Lifecycle callback invoked with the runtime and the affected instance
pub type PoolCallback<R> = Rc<dyn Fn(&mut R, &<R as ObjectRuntime>::Handle)>;

/// Configuration of a single template's pool
///
/// The default policy has no capacity limit, activates instances on get,
/// does not group returned instances and has no callbacks.
///
/// # Usage
///
/// ```rust
/// use prefab_pool::prelude::*;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let created = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&created);
///
/// let policy = PoolPolicy::<SceneRuntime>::new(16)
///     .activate_on_get(false)
///     .group_returned(true)
///     .on_create(move |_, _| counter.set(counter.get() + 1));
///
/// assert_eq!(policy.max_capacity(), 16);
/// assert!(policy.groups_returned());
/// ```
pub struct PoolPolicy<R: ObjectRuntime> {
    max_capacity: usize,
    activate_on_get: bool,
    group_returned: bool,
    on_create: Option<PoolCallback<R>>,
    on_get: Option<PoolCallback<R>>,
    on_release: Option<PoolCallback<R>>,
    on_destroy: Option<PoolCallback<R>>,
}

impl<R: ObjectRuntime> PoolPolicy<R> {
    /// Create a policy with the given max capacity and default flags
    ///
    /// The capacity is validated when the policy is applied to a pool.
    pub fn new(max_capacity: usize) -> Self {
        Self {
            max_capacity,
            ..Self::default()
        }
    }

    /// Set the max number of simultaneously existing instances
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Force instances active when they are taken from the pool
    ///
    /// When disabled, instances keep whatever active state they were
    /// created or returned with.
    #[must_use]
    pub fn activate_on_get(mut self, enabled: bool) -> Self {
        self.activate_on_get = enabled;
        self
    }

    /// Parent returned instances under a per-template group container
    #[must_use]
    pub fn group_returned(mut self, enabled: bool) -> Self {
        self.group_returned = enabled;
        self
    }

    /// Callback for every newly created instance
    #[must_use]
    pub fn on_create(mut self, callback: impl Fn(&mut R, &R::Handle) + 'static) -> Self {
        self.on_create = Some(Rc::new(callback));
        self
    }

    /// Callback for every instance taken from the pool
    #[must_use]
    pub fn on_get(mut self, callback: impl Fn(&mut R, &R::Handle) + 'static) -> Self {
        self.on_get = Some(Rc::new(callback));
        self
    }

    /// Callback for every live instance returned to the pool
    #[must_use]
    pub fn on_release(mut self, callback: impl Fn(&mut R, &R::Handle) + 'static) -> Self {
        self.on_release = Some(Rc::new(callback));
        self
    }

    /// Callback for every instance the pool destroys
    #[must_use]
    pub fn on_destroy(mut self, callback: impl Fn(&mut R, &R::Handle) + 'static) -> Self {
        self.on_destroy = Some(Rc::new(callback));
        self
    }

    /// Max number of simultaneously existing instances
    pub const fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Whether instances are forced active on get
    pub const fn activates_on_get(&self) -> bool {
        self.activate_on_get
    }

    /// Whether returned instances are grouped under a container
    pub const fn groups_returned(&self) -> bool {
        self.group_returned
    }

    /// Check the policy before it is applied
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_capacity == 0 {
            return Err(PoolError::InvalidCapacity {
                capacity: self.max_capacity,
            });
        }
        Ok(())
    }

    pub(crate) fn invoke_on_create(&self, runtime: &mut R, instance: &R::Handle) {
        Self::invoke(self.on_create.as_ref(), runtime, instance);
    }

    pub(crate) fn invoke_on_get(&self, runtime: &mut R, instance: &R::Handle) {
        Self::invoke(self.on_get.as_ref(), runtime, instance);
    }

    pub(crate) fn invoke_on_release(&self, runtime: &mut R, instance: &R::Handle) {
        Self::invoke(self.on_release.as_ref(), runtime, instance);
    }

    pub(crate) fn invoke_on_destroy(&self, runtime: &mut R, instance: &R::Handle) {
        Self::invoke(self.on_destroy.as_ref(), runtime, instance);
    }

    fn invoke(callback: Option<&PoolCallback<R>>, runtime: &mut R, instance: &R::Handle) {
        if let Some(callback) = callback {
            callback(runtime, instance);
        }
    }
}

impl<R: ObjectRuntime> Default for PoolPolicy<R> {
    fn default() -> Self {
        Self {
            max_capacity: usize::MAX,
            activate_on_get: true,
            group_returned: false,
            on_create: None,
            on_get: None,
            on_release: None,
            on_destroy: None,
        }
    }
}

// Manual impl: deriving would require `R: Clone`
impl<R: ObjectRuntime> Clone for PoolPolicy<R> {
    fn clone(&self) -> Self {
        Self {
            max_capacity: self.max_capacity,
            activate_on_get: self.activate_on_get,
            group_returned: self.group_returned,
            on_create: self.on_create.clone(),
            on_get: self.on_get.clone(),
            on_release: self.on_release.clone(),
            on_destroy: self.on_destroy.clone(),
        }
    }
}

impl<R: ObjectRuntime> fmt::Debug for PoolPolicy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolPolicy")
            .field("max_capacity", &self.max_capacity)
            .field("activate_on_get", &self.activate_on_get)
            .field("group_returned", &self.group_returned)
            .field("on_create", &self.on_create.is_some())
            .field("on_get", &self.on_get.is_some())
            .field("on_release", &self.on_release.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

//! Pool registry
//!
//! Owns the object runtime, one [`TemplatePool`] per template and the index of
//! checked-out instances.

use super::{PoolError, PoolPolicy, PoolStats, TemplatePool};
use crate::config::PolicySettings;
use crate::runtime::ObjectRuntime;
use std::collections::HashMap;
use std::fmt;

/// Prefab-oriented object pool
///
/// Pools are created lazily the first time a template is referenced, with the
/// default policy, and live as long as the registry.
///
/// # Usage
///
/// ```rust
/// use prefab_pool::prelude::*;
///
/// let mut runtime = SceneRuntime::new();
/// let rock = runtime.spawn("Rock");
/// let mut pool = PoolRegistry::new(runtime);
///
/// pool.configure(&rock, PoolPolicy::new(2)).unwrap();
/// let a = pool.get(&rock).unwrap();
/// let _b = pool.get(&rock).unwrap();
/// assert!(pool.try_get(&rock).is_none());
///
/// pool.release(a).unwrap();
/// assert!(pool.release(a).is_err());
/// ```
pub struct PoolRegistry<R: ObjectRuntime> {
    /// Host engine primitives
    runtime: R,

    /// One pool per template, keyed by template identity
    pools: HashMap<R::Key, TemplatePool<R>>,

    /// Checked-out instances, instance identity to template identity
    live: HashMap<R::Key, R::Key>,

    /// Parent for returned instances and group containers
    items_container: Option<R::Handle>,
}

impl<R: ObjectRuntime> PoolRegistry<R> {
    /// Create a registry without an items container
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            pools: HashMap::new(),
            live: HashMap::new(),
            items_container: None,
        }
    }

    /// Create a registry that parks returned instances under a named container
    ///
    /// The container is created inactive and persistent. An empty name means
    /// no container, the same as [`new`](Self::new).
    pub fn with_items_container(mut runtime: R, name: &str) -> Self {
        let items_container = if name.is_empty() {
            None
        } else {
            let container = runtime.create_container(name);
            runtime.mark_persistent(&container);
            runtime.set_active(&container, false);
            log::debug!("Created items container '{}'", name);
            Some(container)
        };

        Self {
            items_container,
            ..Self::new(runtime)
        }
    }

    /// Set the policy of a template's pool
    ///
    /// Rejects a zero capacity and keeps the previous policy in that case.
    pub fn configure(&mut self, template: &R::Handle, policy: PoolPolicy<R>) -> Result<(), PoolError> {
        let (runtime, pool) = self.pool_for(template);
        pool.set_policy(runtime, policy)
    }

    /// Configure a template from serialized settings and prewarm it
    ///
    /// Returns the number of prewarmed instances.
    pub fn apply_settings(&mut self, template: &R::Handle, settings: &PolicySettings) -> Result<usize, PoolError> {
        self.configure(template, settings.to_policy())?;
        Ok(self.prewarm(template, settings.prewarm))
    }

    /// Create up to `count` idle instances of a template
    ///
    /// Returns the number of instances created.
    pub fn prewarm(&mut self, template: &R::Handle, count: usize) -> usize {
        let (runtime, pool) = self.pool_for(template);
        pool.prewarm(runtime, count)
    }

    /// Active plus idle instances of a template
    pub fn count_all(&mut self, template: &R::Handle) -> usize {
        self.pool_for(template).1.count_all()
    }

    /// Instances of a template currently checked out
    pub fn count_active(&mut self, template: &R::Handle) -> usize {
        self.pool_for(template).1.count_active()
    }

    /// Idle instances of a template
    pub fn count_inactive(&mut self, template: &R::Handle) -> usize {
        self.pool_for(template).1.count_inactive()
    }

    /// Counter snapshot for a template
    pub fn stats(&mut self, template: &R::Handle) -> PoolStats {
        self.pool_for(template).1.stats()
    }

    /// Take an instance of a template, or `None` when its pool is at capacity
    pub fn try_get(&mut self, template: &R::Handle) -> Option<R::Handle> {
        let template_key = self.runtime.identity(template);
        let (runtime, pool) = self.pool_for(template);
        let instance = pool.try_get(runtime)?;
        self.track(template_key, &instance);
        Some(instance)
    }

    /// Take an instance of a template, failing when its pool is at capacity
    pub fn get(&mut self, template: &R::Handle) -> Result<R::Handle, PoolError> {
        let template_key = self.runtime.identity(template);
        let (runtime, pool) = self.pool_for(template);
        let instance = pool.get(runtime)?;
        self.track(template_key, &instance);
        Ok(instance)
    }

    /// Return an instance to the pool it came from
    ///
    /// Fails for objects this registry never handed out and for instances
    /// that were already released.
    pub fn release(&mut self, instance: R::Handle) -> Result<(), PoolError> {
        let key = self.runtime.identity(&instance);
        let not_owned = || PoolError::NotOwned {
            object: format!("{:?}", key),
        };

        let template_key = self.live.remove(&key).ok_or_else(not_owned)?;
        let pool = self.pools.get_mut(&template_key).ok_or_else(not_owned)?;
        pool.release(&mut self.runtime, instance)
    }

    /// Destroy the idle instances of one template
    ///
    /// Returns the number of destroyed instances.
    pub fn clear_idle(&mut self, template: &R::Handle) -> usize {
        let (runtime, pool) = self.pool_for(template);
        pool.clear_idle(runtime)
    }

    /// Destroy the idle instances of every template
    ///
    /// Returns the number of destroyed instances.
    pub fn clear_idle_all(&mut self) -> usize {
        let runtime = &mut self.runtime;
        let destroyed: usize = self.pools.values_mut().map(|pool| pool.clear_idle(runtime)).sum();
        log::debug!("Cleared {} idle instances across {} pools", destroyed, self.pools.len());
        destroyed
    }

    /// Whether an instance is currently checked out from this registry
    pub fn is_live(&self, instance: &R::Handle) -> bool {
        self.live.contains_key(&self.runtime.identity(instance))
    }

    /// Number of templates that have a pool
    pub fn template_count(&self) -> usize {
        self.pools.len()
    }

    /// Group container of a template's pool, if grouping is enabled
    pub fn group_container(&self, template: &R::Handle) -> Option<&R::Handle> {
        self.pools
            .get(&self.runtime.identity(template))
            .and_then(TemplatePool::group_container)
    }

    /// Container returned instances are parked under
    pub const fn items_container(&self) -> Option<&R::Handle> {
        self.items_container.as_ref()
    }

    /// The object runtime
    pub const fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Mutable access to the object runtime
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    fn pool_for(&mut self, template: &R::Handle) -> (&mut R, &mut TemplatePool<R>) {
        let key = self.runtime.identity(template);
        let items_container = &self.items_container;
        let pool = self.pools.entry(key).or_insert_with(|| {
            log::debug!("Created pool for template {:?}", key);
            TemplatePool::new(template.clone(), items_container.clone())
        });
        (&mut self.runtime, pool)
    }

    fn track(&mut self, template_key: R::Key, instance: &R::Handle) {
        let key = self.runtime.identity(instance);
        if self.live.insert(key, template_key).is_some() {
            log::warn!("Instance {:?} was handed out while already checked out", key);
        }
    }
}

impl<R: ObjectRuntime + Default> Default for PoolRegistry<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: ObjectRuntime> fmt::Debug for PoolRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools.len())
            .field("live", &self.live.len())
            .field("items_container", &self.items_container)
            .finish_non_exhaustive()
    }
}

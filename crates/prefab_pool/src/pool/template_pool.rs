//! Per-template pool
//!
//! Owns the idle instances of exactly one template and all bookkeeping that
//! goes with them: capacity, lifecycle callbacks, capability hooks and the
//! optional group container.
//!
//! # Instance lifecycle
//!
//! ```text
//! nonexistent ──create──→ idle ──get──→ active ──release──→ idle ...
//!                          |                  |
//!                          └──── destroyed ←──┘
//!            (clear_idle, capacity trim, external destruction)
//! ```
//!
//! `total` counts every instance created by this pool that has not been
//! destroyed. Checked-out instances are tracked by identity, so only an
//! instance this pool handed out can come back, and only once.

use super::{PoolError, PoolPolicy, PoolStats};
use crate::runtime::{ObjectRuntime, PoolEvent, PoolHooks};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Pool of instances created from a single template
///
/// Every operation takes the runtime explicitly, so one runtime can serve any
/// number of pools. [`PoolRegistry`](super::PoolRegistry) routes releases to
/// the right pool on top.
///
/// An instance destroyed outside the pool while checked out keeps its slot
/// until it is released; release it like any other instance.
pub struct TemplatePool<R: ObjectRuntime> {
    /// Object instances are created from
    template: R::Handle,

    /// Current policy, replaceable at runtime
    policy: PoolPolicy<R>,

    /// Idle instances, most recently returned last
    idle: Vec<R::Handle>,

    /// Active plus idle instances
    total: usize,

    /// Identities of checked-out instances
    active: HashSet<R::Key>,

    /// Outer parent for returned instances and the group container
    items_parent: Option<R::Handle>,

    /// Container for idle instances while grouping is enabled
    group_parent: Option<R::Handle>,

    /// Capabilities probed when each instance was created
    hooks: HashMap<R::Key, PoolHooks>,
}

impl<R: ObjectRuntime> TemplatePool<R> {
    /// Create an empty pool with the default policy
    ///
    /// `items_parent` is the object returned instances are parented under
    /// when grouping is off, and the parent of the group container when it
    /// is on.
    pub fn new(template: R::Handle, items_parent: Option<R::Handle>) -> Self {
        Self {
            template,
            policy: PoolPolicy::default(),
            idle: Vec::new(),
            total: 0,
            active: HashSet::new(),
            items_parent,
            group_parent: None,
            hooks: HashMap::new(),
        }
    }

    /// Replace the pool policy
    ///
    /// A policy with zero capacity is rejected and the current one is kept.
    /// Switching grouping on creates the group container and moves idle
    /// instances into it; switching it off moves them back out and destroys
    /// the container. Lowering the capacity below the current total does not
    /// destroy anything right away, surplus instances are trimmed as they are
    /// released.
    pub fn set_policy(&mut self, runtime: &mut R, policy: PoolPolicy<R>) -> Result<(), PoolError> {
        policy.validate()?;
        self.policy = policy;

        if self.policy.groups_returned() && self.group_parent.is_none() {
            self.enable_grouping(runtime);
        } else if !self.policy.groups_returned() && self.group_parent.is_some() {
            self.disable_grouping(runtime);
        }

        Ok(())
    }

    /// Create up to `count` idle instances
    ///
    /// Never goes past the max capacity. Returns the number of instances
    /// actually created.
    pub fn prewarm(&mut self, runtime: &mut R, count: usize) -> usize {
        let count = count.min(self.policy.max_capacity().saturating_sub(self.total));

        for _ in 0..count {
            let instance = self.create_instance(runtime);
            self.total += 1;
            self.park(runtime, &instance);
            self.idle.push(instance);
        }

        if count > 0 {
            log::debug!(
                "Prewarmed {} instances of {:?} ({} total)",
                count,
                runtime.identity(&self.template),
                self.total
            );
        }
        count
    }

    /// Take an instance, or `None` when the pool is at capacity
    ///
    /// Reuses the most recently returned idle instance first. Idle
    /// instances destroyed behind the pool's back are dropped from the
    /// accounting and skipped.
    pub fn try_get(&mut self, runtime: &mut R) -> Option<R::Handle> {
        let instance = match self.pop_idle(runtime) {
            Some(instance) => instance,
            None => {
                if self.total >= self.policy.max_capacity() {
                    log::debug!(
                        "Pool for {:?} is at max capacity {}",
                        runtime.identity(&self.template),
                        self.policy.max_capacity()
                    );
                    return None;
                }
                self.total += 1;
                self.create_instance(runtime)
            }
        };

        self.active.insert(runtime.identity(&instance));
        if self.policy.activates_on_get() {
            runtime.set_active(&instance, true);
        }
        self.policy.invoke_on_get(runtime, &instance);
        self.notify(runtime, &instance, PoolEvent::Get);

        Some(instance)
    }

    /// Take an instance, failing when the pool is at capacity
    pub fn get(&mut self, runtime: &mut R) -> Result<R::Handle, PoolError> {
        self.try_get(runtime).ok_or_else(|| PoolError::CapacityExceeded {
            template: format!("{:?}", runtime.identity(&self.template)),
            max_capacity: self.policy.max_capacity(),
        })
    }

    /// Return an instance to the pool
    ///
    /// Fails with [`PoolError::NotOwned`] unless the instance is currently
    /// checked out from this pool. An instance the runtime already reports as
    /// gone only frees its slot. A live instance returned while the pool is
    /// at or above capacity is destroyed instead of being kept.
    pub fn release(&mut self, runtime: &mut R, instance: R::Handle) -> Result<(), PoolError> {
        let key = runtime.identity(&instance);
        if !self.active.remove(&key) {
            return Err(PoolError::NotOwned {
                object: format!("{:?}", key),
            });
        }

        if !runtime.is_alive(&instance) {
            log::debug!("Released instance {:?} was destroyed externally", key);
            self.total = self.total.saturating_sub(1);
            self.hooks.remove(&key);
            return Ok(());
        }

        self.policy.invoke_on_release(runtime, &instance);
        self.notify(runtime, &instance, PoolEvent::Release);

        if self.total >= self.policy.max_capacity() {
            log::debug!(
                "Destroying released instance {:?}: {} instances with max capacity {}",
                key,
                self.total,
                self.policy.max_capacity()
            );
            self.total -= 1;
            self.destroy_instance(runtime, &instance);
            return Ok(());
        }

        self.park(runtime, &instance);
        self.idle.push(instance);
        Ok(())
    }

    /// Destroy every idle instance
    ///
    /// Active instances are left alone. Returns the number of destroyed
    /// instances.
    pub fn clear_idle(&mut self, runtime: &mut R) -> usize {
        let mut destroyed = 0;
        while let Some(instance) = self.idle.pop() {
            self.destroy_instance(runtime, &instance);
            self.total = self.total.saturating_sub(1);
            destroyed += 1;
        }

        if destroyed > 0 {
            log::debug!(
                "Cleared {} idle instances of {:?}",
                destroyed,
                runtime.identity(&self.template)
            );
        }
        destroyed
    }

    /// Active plus idle instances
    pub const fn count_all(&self) -> usize {
        self.total
    }

    /// Instances currently checked out
    pub fn count_active(&self) -> usize {
        self.active.len()
    }

    /// Whether an instance is currently checked out from this pool
    pub fn is_checked_out(&self, runtime: &R, instance: &R::Handle) -> bool {
        self.active.contains(&runtime.identity(instance))
    }

    /// Instances waiting in the pool
    pub fn count_inactive(&self) -> usize {
        self.idle.len()
    }

    /// Snapshot of the pool counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            all: self.count_all(),
            active: self.count_active(),
            inactive: self.count_inactive(),
            max_capacity: self.policy.max_capacity(),
        }
    }

    /// Template this pool instantiates
    pub const fn template(&self) -> &R::Handle {
        &self.template
    }

    /// Current policy
    pub const fn policy(&self) -> &PoolPolicy<R> {
        &self.policy
    }

    /// Group container, present while grouping is enabled
    pub const fn group_container(&self) -> Option<&R::Handle> {
        self.group_parent.as_ref()
    }

    fn create_instance(&mut self, runtime: &mut R) -> R::Handle {
        let instance = runtime.instantiate(&self.template);
        runtime.mark_persistent(&instance);
        self.policy.invoke_on_create(runtime, &instance);

        let hooks = runtime.capabilities(&instance);
        if !hooks.is_empty() {
            self.hooks.insert(runtime.identity(&instance), hooks);
        }
        instance
    }

    fn destroy_instance(&mut self, runtime: &mut R, instance: &R::Handle) {
        self.notify(runtime, instance, PoolEvent::Destroy);
        self.policy.invoke_on_destroy(runtime, instance);
        runtime.destroy(instance);
        self.hooks.remove(&runtime.identity(instance));
    }

    fn pop_idle(&mut self, runtime: &R) -> Option<R::Handle> {
        while let Some(instance) = self.idle.pop() {
            if runtime.is_alive(&instance) {
                return Some(instance);
            }
            log::debug!(
                "Dropping idle instance {:?} destroyed outside the pool",
                runtime.identity(&instance)
            );
            self.total = self.total.saturating_sub(1);
            self.hooks.remove(&runtime.identity(&instance));
        }
        None
    }

    /// Move an instance into its idle place in the hierarchy and deactivate it
    fn park(&self, runtime: &mut R, instance: &R::Handle) {
        let parent = self.group_parent.as_ref().or(self.items_parent.as_ref());
        if parent.is_some() {
            runtime.mark_persistent(instance);
        }
        runtime.set_parent(instance, parent, false);
        runtime.set_active(instance, false);
    }

    fn notify(&self, runtime: &mut R, instance: &R::Handle, event: PoolEvent) {
        let key = runtime.identity(instance);
        if self.hooks.get(&key).is_some_and(|hooks| hooks.contains(event.hook())) {
            runtime.notify(instance, event);
        }
    }

    fn enable_grouping(&mut self, runtime: &mut R) {
        let name = match runtime.name(&self.template) {
            Some(name) if !name.is_empty() => format!("{name}_Group"),
            _ => format!("{:032x}", rand::thread_rng().gen::<u128>()),
        };

        let container = runtime.create_container(&name);
        if self.items_parent.is_some() {
            runtime.mark_persistent(&container);
        }
        runtime.set_parent(&container, self.items_parent.as_ref(), true);
        runtime.set_active(&container, false);

        for instance in &self.idle {
            runtime.set_parent(instance, Some(&container), false);
        }

        log::debug!("Created group container '{}' for {} idle instances", name, self.idle.len());
        self.group_parent = Some(container);
    }

    fn disable_grouping(&mut self, runtime: &mut R) {
        let Some(container) = self.group_parent.take() else {
            return;
        };

        for child in runtime.children(&container) {
            runtime.set_parent(&child, self.items_parent.as_ref(), false);
        }
        runtime.destroy(&container);

        log::debug!("Removed group container {:?}", runtime.identity(&container));
    }
}

impl<R: ObjectRuntime> fmt::Debug for TemplatePool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePool")
            .field("template", &self.template)
            .field("policy", &self.policy)
            .field("total", &self.total)
            .field("idle", &self.idle.len())
            .field("active", &self.active.len())
            .field("group_parent", &self.group_parent)
            .finish_non_exhaustive()
    }
}

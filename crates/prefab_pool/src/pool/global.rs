//! Default registry
//!
//! Lazily created [`PoolRegistry`] per runtime type, for callers that do not
//! want to thread a registry through their code. A registry owns a
//! single-threaded runtime, so the default instance is scoped to the calling
//! thread: every thread that touches it gets its own.
//!
//! # Usage
//!
//! ```rust
//! use prefab_pool::global;
//! use prefab_pool::prelude::*;
//!
//! global::init(|| PoolRegistry::with_items_container(SceneRuntime::new(), "Pooled")).unwrap();
//!
//! let template = global::with(|pool: &mut PoolRegistry<SceneRuntime>| pool.runtime_mut().spawn("Star"));
//! let star = global::get::<SceneRuntime>(&template).unwrap();
//! global::release::<SceneRuntime>(star).unwrap();
//! assert_eq!(global::count_inactive::<SceneRuntime>(&template), 1);
//! ```

use super::{PoolError, PoolPolicy, PoolRegistry};
use crate::runtime::ObjectRuntime;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

thread_local! {
    static REGISTRIES: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Install the default registry for runtime type `R`
///
/// Must run before the first use of the default registry on this thread.
/// Fails with [`PoolError::AlreadyInitialized`] otherwise and leaves the
/// existing registry in place; `factory` is not called when the registry
/// already exists. A registry the factory itself causes to be created also
/// wins over the one it returns.
pub fn init<R, F>(factory: F) -> Result<(), PoolError>
where
    R: ObjectRuntime + 'static,
    F: FnOnce() -> PoolRegistry<R>,
{
    if is_initialized::<R>() {
        log::warn!("Default pool registry for {} is already initialized", std::any::type_name::<R>());
        return Err(PoolError::AlreadyInitialized);
    }

    // The factory runs outside the borrow so it may freely use other registries
    let registry = factory();
    let installed = REGISTRIES.with(|registries| match registries.borrow_mut().entry(TypeId::of::<R>()) {
        Entry::Occupied(_) => false,
        Entry::Vacant(entry) => {
            entry.insert(Box::new(registry));
            true
        }
    });

    if !installed {
        log::warn!(
            "Default pool registry for {} was created while initializing it",
            std::any::type_name::<R>()
        );
        return Err(PoolError::AlreadyInitialized);
    }

    log::info!("Initialized default pool registry for {}", std::any::type_name::<R>());
    Ok(())
}

/// Whether the default registry for `R` exists on this thread
pub fn is_initialized<R: ObjectRuntime + 'static>() -> bool {
    REGISTRIES.with(|registries| registries.borrow().contains_key(&TypeId::of::<R>()))
}

/// Run `f` with the default registry for `R`, creating it on first use
///
/// # Panics
///
/// Panics when called again from inside `f`.
pub fn with<R, T>(f: impl FnOnce(&mut PoolRegistry<R>) -> T) -> T
where
    R: ObjectRuntime + Default + 'static,
{
    if !is_initialized::<R>() {
        let registry = PoolRegistry::<R>::default();
        REGISTRIES.with(|registries| {
            registries
                .borrow_mut()
                .insert(TypeId::of::<R>(), Box::new(registry));
        });
        log::debug!("Created default pool registry for {}", std::any::type_name::<R>());
    }

    REGISTRIES.with(|registries| {
        let mut registries = registries.borrow_mut();
        let Some(registry) = registries
            .get_mut(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast_mut::<PoolRegistry<R>>())
        else {
            unreachable!("default registry is stored under its own runtime type");
        };
        f(registry)
    })
}

/// Drop the default registry for `R` on this thread
#[cfg(test)]
pub(crate) fn reset<R: ObjectRuntime + 'static>() {
    REGISTRIES.with(|registries| {
        registries.borrow_mut().remove(&TypeId::of::<R>());
    });
}

/// [`PoolRegistry::configure`] on the default registry
pub fn configure<R>(template: &R::Handle, policy: PoolPolicy<R>) -> Result<(), PoolError>
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.configure(template, policy))
}

/// [`PoolRegistry::prewarm`] on the default registry
pub fn prewarm<R>(template: &R::Handle, count: usize) -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.prewarm(template, count))
}

/// [`PoolRegistry::count_all`] on the default registry
pub fn count_all<R>(template: &R::Handle) -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.count_all(template))
}

/// [`PoolRegistry::count_active`] on the default registry
pub fn count_active<R>(template: &R::Handle) -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.count_active(template))
}

/// [`PoolRegistry::count_inactive`] on the default registry
pub fn count_inactive<R>(template: &R::Handle) -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.count_inactive(template))
}

/// [`PoolRegistry::try_get`] on the default registry
pub fn try_get<R>(template: &R::Handle) -> Option<R::Handle>
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.try_get(template))
}

/// [`PoolRegistry::get`] on the default registry
pub fn get<R>(template: &R::Handle) -> Result<R::Handle, PoolError>
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.get(template))
}

/// [`PoolRegistry::release`] on the default registry
pub fn release<R>(instance: R::Handle) -> Result<(), PoolError>
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.release(instance))
}

/// [`PoolRegistry::clear_idle`] on the default registry
pub fn clear_idle<R>(template: &R::Handle) -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.clear_idle(template))
}

/// [`PoolRegistry::clear_idle_all`] on the default registry
pub fn clear_idle_all<R>() -> usize
where
    R: ObjectRuntime + Default + 'static,
{
    with(|registry: &mut PoolRegistry<R>| registry.clear_idle_all())
}

//! Object runtime interface
//!
//! The pool never creates, destroys or parents objects by itself. Everything
//! that touches the host engine goes through [`ObjectRuntime`], which keeps the
//! pooling logic independent of any particular scene representation.
//!
//! # Architecture
//!
//! ```text
//! PoolRegistry → TemplatePool → ObjectRuntime
//!                     |              |
//!               bookkeeping     instantiate / destroy
//!               callbacks       set_active / set_parent
//!               capacity        identity / is_alive
//! ```
//!
//! [`scene::SceneRuntime`] is an in-memory implementation with a small scene
//! graph and deferred destruction, used by tests, demos and simple hosts.

pub mod scene;

use std::fmt::Debug;
use std::hash::Hash;

bitflags::bitflags! {
    /// Pool notifications an instance wants to receive
    ///
    /// Probed once when the pool creates an instance. Each set flag makes the
    /// pool call [`ObjectRuntime::notify`] for the matching [`PoolEvent`], in
    /// addition to whatever callback the policy configures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PoolHooks: u8 {
        /// Notify when the instance is taken from the pool
        const GET = 1 << 0;
        /// Notify when the instance is returned to the pool
        const RELEASE = 1 << 1;
        /// Notify right before the pool destroys the instance
        const DESTROY = 1 << 2;
    }
}

/// Lifecycle notification delivered through [`ObjectRuntime::notify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEvent {
    /// Instance was handed out by the pool
    Get,
    /// Instance was handed back to the pool
    Release,
    /// Instance is about to be destroyed by the pool
    Destroy,
}

impl PoolEvent {
    /// The capability flag an instance needs for this event to be delivered
    pub const fn hook(self) -> PoolHooks {
        match self {
            Self::Get => PoolHooks::GET,
            Self::Release => PoolHooks::RELEASE,
            Self::Destroy => PoolHooks::DESTROY,
        }
    }
}

/// Host engine primitives consumed by the pool
///
/// Templates, instances and containers are all plain object handles. Handles
/// may be cheap copies of an id or reference-counted pointers; the pool only
/// clones them and never inspects them beyond [`identity`](Self::identity).
///
/// Destruction is allowed to be deferred: after [`destroy`](Self::destroy) the
/// object may stay physically present until the host's end-of-step boundary.
/// The pool updates its own accounting immediately either way.
pub trait ObjectRuntime {
    /// Handle to an engine object
    type Handle: Clone + Debug;

    /// Identity of an object, stable for the object's lifetime
    ///
    /// Two objects with equal content but distinct identity must produce
    /// different keys.
    type Key: Copy + Eq + Hash + Debug;

    /// Create a new object from a template
    fn instantiate(&mut self, template: &Self::Handle) -> Self::Handle;

    /// Request destruction of an object
    fn destroy(&mut self, object: &Self::Handle);

    /// Toggle whether an object is active (visible and updating)
    fn set_active(&mut self, object: &Self::Handle, active: bool);

    /// Move an object under `parent`, or to the scene root when `None`
    fn set_parent(&mut self, object: &Self::Handle, parent: Option<&Self::Handle>, world_position_stays: bool);

    /// Identity key of an object
    fn identity(&self, object: &Self::Handle) -> Self::Key;

    /// Whether the object is still logically alive
    ///
    /// Must return `false` once destruction was requested, even when the
    /// object has not been reclaimed yet.
    fn is_alive(&self, object: &Self::Handle) -> bool;

    /// Create an empty object that other objects can be parented under
    fn create_container(&mut self, name: &str) -> Self::Handle;

    /// Display name of an object, if it has one
    fn name(&self, object: &Self::Handle) -> Option<String>;

    /// Direct children of an object
    fn children(&self, object: &Self::Handle) -> Vec<Self::Handle>;

    /// Pool notifications the object supports
    fn capabilities(&self, _object: &Self::Handle) -> PoolHooks {
        PoolHooks::empty()
    }

    /// Deliver a pool notification to an object
    fn notify(&mut self, _object: &Self::Handle, _event: PoolEvent) {}

    /// Keep an object alive across scene unloads
    fn mark_persistent(&mut self, _object: &Self::Handle) {}
}

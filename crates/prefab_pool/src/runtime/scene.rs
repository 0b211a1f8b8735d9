//! In-memory scene runtime
//!
//! A minimal scene graph that implements [`ObjectRuntime`]. Nodes live in a
//! slot map, so a [`NodeId`] doubles as a stable identity key: once a node is
//! reclaimed its id is never handed out again.
//!
//! Destruction is deferred the same way most engines defer it. `destroy` only
//! marks the node, [`SceneRuntime::end_step`] reclaims marked nodes together with
//! their whole subtree.

use super::{ObjectRuntime, PoolEvent, PoolHooks};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Identifier of a node in a [`SceneRuntime`]
    pub struct NodeId;
}

/// A single scene object
#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    active: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    hooks: PoolHooks,
    persistent: bool,
    pending_destroy: bool,
    notifications: Vec<PoolEvent>,
}

impl SceneNode {
    fn new(name: impl Into<String>, active: bool, hooks: PoolHooks) -> Self {
        Self {
            name: name.into(),
            active,
            parent: None,
            children: Vec::new(),
            hooks,
            persistent: false,
            pending_destroy: false,
            notifications: Vec::new(),
        }
    }
}

/// Counters kept by a [`SceneRuntime`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Objects created through `instantiate`
    pub instantiated: usize,
    /// Containers created through `create_container`
    pub containers: usize,
    /// Accepted destruction requests
    pub destroy_requests: usize,
    /// Nodes physically removed by `end_step`
    pub reclaimed: usize,
}

/// In-memory [`ObjectRuntime`] backed by a slot-map scene graph
#[derive(Debug, Default)]
pub struct SceneRuntime {
    nodes: SlotMap<NodeId, SceneNode>,
    pending: Vec<NodeId>,
    stats: RuntimeStats,
}

impl SceneRuntime {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active root node, typically used as a template
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name, true, PoolHooks::empty()))
    }

    /// Add an active root node that opts into pool notifications
    ///
    /// Instances created from it inherit the same hooks.
    pub fn spawn_with_hooks(&mut self, name: impl Into<String>, hooks: PoolHooks) -> NodeId {
        self.nodes.insert(SceneNode::new(name, true, hooks))
    }

    /// Replace the pool hooks of a node
    pub fn set_hooks(&mut self, id: NodeId, hooks: PoolHooks) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.hooks = hooks;
        }
    }

    /// Whether the node is still physically present
    ///
    /// Stays `true` for destroyed nodes until the next [`end_step`](Self::end_step).
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the node is active; missing nodes are inactive
    pub fn is_active(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.active)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Name of a node
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|node| node.name.as_str())
    }

    /// Number of direct children
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.children.len())
    }

    /// Pool notifications delivered to a node, oldest first
    pub fn notifications(&self, id: NodeId) -> &[PoolEvent] {
        self.nodes.get(id).map(|node| node.notifications.as_slice()).unwrap_or_default()
    }

    /// Whether the node survives scene unloads
    pub fn is_persistent(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.persistent)
    }

    /// Number of physically present nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes waiting for [`end_step`](Self::end_step)
    pub fn pending_destroy_count(&self) -> usize {
        self.pending.len()
    }

    /// Runtime counters
    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Reclaim every node destroyed since the last step
    ///
    /// Children of a reclaimed node are reclaimed with it. Returns the number
    /// of removed nodes.
    pub fn end_step(&mut self) -> usize {
        let mut reclaimed = 0;

        for id in std::mem::take(&mut self.pending) {
            if !self.nodes.contains_key(id) {
                // Already removed as part of an ancestor's subtree
                continue;
            }
            self.detach(id);

            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                if let Some(node) = self.nodes.remove(current) {
                    stack.extend(node.children);
                    reclaimed += 1;
                }
            }
        }

        if reclaimed > 0 {
            log::trace!("Reclaimed {} scene nodes", reclaimed);
        }
        self.stats.reclaimed += reclaimed;
        reclaimed
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent);
        }
        false
    }
}

impl ObjectRuntime for SceneRuntime {
    type Handle = NodeId;
    type Key = NodeId;

    fn instantiate(&mut self, template: &NodeId) -> NodeId {
        let node = if let Some(source) = self.nodes.get(*template) {
            SceneNode::new(format!("{}(Clone)", source.name), source.active, source.hooks)
        } else {
            log::warn!("Instantiating from missing template {:?}", template);
            SceneNode::new("(Clone)", true, PoolHooks::empty())
        };

        self.stats.instantiated += 1;
        self.nodes.insert(node)
    }

    fn destroy(&mut self, object: &NodeId) {
        let Some(node) = self.nodes.get_mut(*object) else {
            return;
        };
        if node.pending_destroy {
            return;
        }
        node.pending_destroy = true;
        self.pending.push(*object);
        self.stats.destroy_requests += 1;
    }

    fn set_active(&mut self, object: &NodeId, active: bool) {
        if let Some(node) = self.nodes.get_mut(*object) {
            node.active = active;
        }
    }

    fn set_parent(&mut self, object: &NodeId, parent: Option<&NodeId>, _world_position_stays: bool) {
        let object = *object;
        if !self.nodes.contains_key(object) {
            return;
        }

        if let Some(&parent) = parent {
            if !self.nodes.contains_key(parent) {
                log::warn!("Cannot parent {:?} under missing node {:?}", object, parent);
                return;
            }
            if self.is_ancestor_or_self(object, parent) {
                log::warn!("Cannot parent {:?} under its own descendant {:?}", object, parent);
                return;
            }
        }

        self.detach(object);

        if let Some(&parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.push(object);
            }
            if let Some(node) = self.nodes.get_mut(object) {
                node.parent = Some(parent);
            }
        }
    }

    fn identity(&self, object: &NodeId) -> NodeId {
        *object
    }

    fn is_alive(&self, object: &NodeId) -> bool {
        self.nodes.get(*object).is_some_and(|node| !node.pending_destroy)
    }

    fn create_container(&mut self, name: &str) -> NodeId {
        self.stats.containers += 1;
        self.nodes.insert(SceneNode::new(name, true, PoolHooks::empty()))
    }

    fn name(&self, object: &NodeId) -> Option<String> {
        self.nodes
            .get(*object)
            .filter(|node| !node.name.is_empty())
            .map(|node| node.name.clone())
    }

    fn children(&self, object: &NodeId) -> Vec<NodeId> {
        self.nodes.get(*object).map(|node| node.children.clone()).unwrap_or_default()
    }

    fn capabilities(&self, object: &NodeId) -> PoolHooks {
        self.nodes.get(*object).map_or(PoolHooks::empty(), |node| node.hooks)
    }

    fn notify(&mut self, object: &NodeId, event: PoolEvent) {
        if let Some(node) = self.nodes.get_mut(*object) {
            node.notifications.push(event);
        }
    }

    fn mark_persistent(&mut self, object: &NodeId) {
        if let Some(node) = self.nodes.get_mut(*object) {
            node.persistent = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_copies_template_state() {
        let mut scene = SceneRuntime::new();
        let template = scene.spawn_with_hooks("Enemy", PoolHooks::GET);
        scene.set_active(&template, false);

        let instance = scene.instantiate(&template);

        assert_ne!(instance, template);
        assert_eq!(scene.node_name(instance), Some("Enemy(Clone)"));
        assert!(!scene.is_active(instance));
        assert_eq!(scene.capabilities(&instance), PoolHooks::GET);
        assert_eq!(scene.parent(instance), None);
        assert_eq!(scene.stats().instantiated, 1);
    }

    #[test]
    fn test_set_parent_moves_between_parents() {
        let mut scene = SceneRuntime::new();
        let first = scene.create_container("First");
        let second = scene.create_container("Second");
        let child = scene.spawn("Child");

        scene.set_parent(&child, Some(&first), false);
        assert_eq!(scene.parent(child), Some(first));
        assert_eq!(scene.children(&first), vec![child]);

        scene.set_parent(&child, Some(&second), false);
        assert_eq!(scene.parent(child), Some(second));
        assert_eq!(scene.child_count(first), 0);
        assert_eq!(scene.children(&second), vec![child]);

        scene.set_parent(&child, None, false);
        assert_eq!(scene.parent(child), None);
        assert_eq!(scene.child_count(second), 0);
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = SceneRuntime::new();
        let root = scene.spawn("Root");
        let leaf = scene.spawn("Leaf");
        scene.set_parent(&leaf, Some(&root), false);

        scene.set_parent(&root, Some(&leaf), false);
        assert_eq!(scene.parent(root), None);

        scene.set_parent(&root, Some(&root), false);
        assert_eq!(scene.parent(root), None);
    }

    #[test]
    fn test_destroy_is_deferred_until_end_step() {
        let mut scene = SceneRuntime::new();
        let node = scene.spawn("Doomed");

        scene.destroy(&node);
        assert!(!scene.is_alive(&node));
        assert!(scene.contains(node));
        assert_eq!(scene.pending_destroy_count(), 1);

        // A second request for the same node is ignored
        scene.destroy(&node);
        assert_eq!(scene.stats().destroy_requests, 1);

        assert_eq!(scene.end_step(), 1);
        assert!(!scene.contains(node));
        assert_eq!(scene.pending_destroy_count(), 0);
    }

    #[test]
    fn test_end_step_reclaims_subtree() {
        let mut scene = SceneRuntime::new();
        let outer = scene.create_container("Outer");
        let container = scene.create_container("Container");
        let child = scene.spawn("Child");
        scene.set_parent(&container, Some(&outer), true);
        scene.set_parent(&child, Some(&container), false);

        scene.destroy(&container);
        assert!(scene.is_alive(&child));

        assert_eq!(scene.end_step(), 2);
        assert!(!scene.contains(child));
        assert!(scene.contains(outer));
        assert_eq!(scene.child_count(outer), 0);
    }

    #[test]
    fn test_notifications_and_names() {
        let mut scene = SceneRuntime::new();
        let unnamed = scene.spawn("");
        let named = scene.spawn("Pickup");

        assert_eq!(scene.name(&unnamed), None);
        assert_eq!(scene.name(&named), Some("Pickup".to_string()));

        scene.notify(&named, PoolEvent::Get);
        scene.notify(&named, PoolEvent::Release);
        assert_eq!(scene.notifications(named), &[PoolEvent::Get, PoolEvent::Release]);

        scene.mark_persistent(&named);
        assert!(scene.is_persistent(named));
        assert!(!scene.is_persistent(unnamed));
    }
}

//! Parenting of returned instances under the items and group containers

use crate::foundation::logging;
use crate::pool::{PoolPolicy, PoolRegistry};
use crate::runtime::scene::{NodeId, SceneRuntime};
use crate::runtime::ObjectRuntime;

#[cfg(test)]
mod tests {
    use super::*;

    fn pooled(names: &[&str]) -> (PoolRegistry<SceneRuntime>, NodeId, Vec<NodeId>) {
        logging::init_for_tests();
        let mut runtime = SceneRuntime::new();
        let templates = names.iter().map(|name| runtime.spawn(*name)).collect();
        let pool = PoolRegistry::with_items_container(runtime, "PooledItems");
        let items = *pool.items_container().expect("Items container should exist");
        (pool, items, templates)
    }

    #[test]
    fn test_released_instances_go_under_items_container() {
        let (mut pool, items, templates) = pooled(&["Rock"]);
        let rock = &templates[0];

        let instance = pool.get(rock).expect("Should get");
        assert_eq!(pool.runtime().parent(instance), None);

        pool.release(instance).expect("Should release");
        assert_eq!(pool.runtime().parent(instance), Some(items));
        assert!(pool.runtime().is_persistent(instance));
        assert!(!pool.runtime().is_active(instance));
    }

    #[test]
    fn test_grouping_parent_chain() {
        let (mut pool, items, templates) = pooled(&["Laser", "Missile"]);
        let (laser, missile) = (&templates[0], &templates[1]);
        pool.configure(laser, PoolPolicy::default().group_returned(true))
            .expect("Valid policy");

        let group = *pool.group_container(laser).expect("Group should exist");
        assert_eq!(pool.runtime().node_name(group), Some("Laser_Group"));
        assert_eq!(pool.runtime().parent(group), Some(items));
        assert!(pool.group_container(missile).is_none());

        let lasers: Vec<_> = (0..3).map(|_| pool.get(laser).expect("Should get")).collect();
        let stray_missile = pool.get(missile).expect("Should get");
        for instance in lasers.iter().copied().chain([stray_missile]) {
            pool.release(instance).expect("Should release");
        }

        assert!(lasers.iter().all(|instance| pool.runtime().parent(*instance) == Some(group)));
        assert_eq!(pool.runtime().parent(stray_missile), Some(items));
        assert_eq!(pool.runtime().child_count(group), 3);

        // Reused instances keep their idle parent; callers reparent as needed
        let reused = pool.get(laser).expect("Should get");
        assert!(pool.runtime().is_active(reused));
    }

    #[test]
    fn test_grouping_without_items_container() {
        let mut runtime = SceneRuntime::new();
        let template = runtime.spawn("Spark");
        let mut pool = PoolRegistry::new(runtime);
        pool.configure(&template, PoolPolicy::default().group_returned(true))
            .expect("Valid policy");

        let group = *pool.group_container(&template).expect("Group should exist");
        assert_eq!(pool.runtime().parent(group), None);
        assert!(!pool.runtime().is_persistent(group));

        let instance = pool.get(&template).expect("Should get");
        pool.release(instance).expect("Should release");
        assert_eq!(pool.runtime().parent(instance), Some(group));
    }

    #[test]
    fn test_disabling_grouping_mid_session() {
        let (mut pool, items, templates) = pooled(&["Shell"]);
        let shell = &templates[0];
        pool.configure(shell, PoolPolicy::default().group_returned(true))
            .expect("Valid policy");

        let taken: Vec<_> = (0..4).map(|_| pool.get(shell).expect("Should get")).collect();
        for instance in &taken {
            pool.release(*instance).expect("Should release");
        }
        let group = *pool.group_container(shell).expect("Group should exist");

        pool.configure(shell, PoolPolicy::default()).expect("Valid policy");

        assert!(pool.group_container(shell).is_none());
        assert!(!pool.runtime().is_alive(&group));
        assert!(taken.iter().all(|instance| pool.runtime().parent(*instance) == Some(items)));

        // Idle instances survive the removal of their old container
        pool.runtime_mut().end_step();
        assert!(taken.iter().all(|instance| pool.runtime().is_alive(instance)));
        assert_eq!(pool.count_inactive(shell), 4);

        // Enabling again creates a fresh container
        pool.configure(shell, PoolPolicy::default().group_returned(true))
            .expect("Valid policy");
        let regrouped = *pool.group_container(shell).expect("Group should exist");
        assert_ne!(regrouped, group);
        assert_eq!(pool.runtime().child_count(regrouped), 4);
    }
}

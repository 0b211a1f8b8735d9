//! Counting and capacity scenarios across one or more templates

use crate::foundation::logging;
use crate::pool::{PoolError, PoolPolicy, PoolRegistry, PoolStats};
use crate::runtime::scene::{NodeId, SceneRuntime};
use crate::runtime::ObjectRuntime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> (PoolRegistry<SceneRuntime>, Vec<NodeId>) {
        logging::init_for_tests();
        let mut runtime = SceneRuntime::new();
        let templates = names.iter().map(|name| runtime.spawn(*name)).collect();
        (PoolRegistry::new(runtime), templates)
    }

    fn counts(pool: &mut PoolRegistry<SceneRuntime>, template: &NodeId) -> (usize, usize, usize) {
        (
            pool.count_all(template),
            pool.count_inactive(template),
            pool.count_active(template),
        )
    }

    #[test]
    fn test_get_release_single_instance() {
        let (mut pool, templates) = registry_with(&["Bolt"]);
        let bolt = &templates[0];

        let instance = pool.get(bolt).expect("Should get");
        assert_eq!(counts(&mut pool, bolt), (1, 0, 1));

        pool.release(instance).expect("Should release");
        assert_eq!(counts(&mut pool, bolt), (1, 1, 0));
    }

    #[test]
    fn test_batches_reuse_idle_instances() {
        let (mut pool, templates) = registry_with(&["Shard"]);
        let shard = &templates[0];

        let first: Vec<_> = (0..5000).map(|_| pool.get(shard).expect("Should get")).collect();
        assert_eq!(counts(&mut pool, shard), (5000, 0, 5000));

        for instance in first.into_iter().take(3739) {
            pool.release(instance).expect("Should release");
        }
        assert_eq!(counts(&mut pool, shard), (5000, 3739, 1261));

        let second: Vec<_> = (0..3739).map(|_| pool.get(shard).expect("Should get")).collect();
        assert_eq!(counts(&mut pool, shard), (5000, 0, 5000));
        assert_eq!(pool.runtime().stats().instantiated, 5000);

        for instance in second {
            pool.release(instance).expect("Should release");
        }
        assert_eq!(counts(&mut pool, shard), (5000, 3739, 1261));
    }

    #[test]
    fn test_prewarm_then_get() {
        let (mut pool, templates) = registry_with(&["Mote"]);
        let mote = &templates[0];

        assert_eq!(pool.prewarm(mote, 100), 100);
        for _ in 0..50 {
            pool.get(mote).expect("Should get");
        }

        assert_eq!(counts(&mut pool, mote), (100, 50, 50));
        assert_eq!(pool.runtime().stats().instantiated, 100);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let (mut pool, templates) = registry_with(&["Drone"]);
        let drone = &templates[0];
        pool.configure(drone, PoolPolicy::new(10)).expect("Valid policy");

        for _ in 0..10 {
            pool.get(drone).expect("Should get within capacity");
        }

        assert!(pool.try_get(drone).is_none());
        assert!(matches!(
            pool.get(drone),
            Err(PoolError::CapacityExceeded { max_capacity: 10, .. })
        ));
        assert_eq!(
            pool.stats(drone),
            PoolStats {
                all: 10,
                active: 10,
                inactive: 0,
                max_capacity: 10,
            }
        );
        assert!(pool.stats(drone).is_full());
    }

    #[test]
    fn test_templates_are_independent() {
        let (mut pool, templates) = registry_with(&["Red", "Blue"]);
        let (red, blue) = (&templates[0], &templates[1]);

        let reds: Vec<_> = (0..70).map(|_| pool.get(red).expect("Should get red")).collect();
        let blues: Vec<_> = (0..30).map(|_| pool.get(blue).expect("Should get blue")).collect();

        for instance in reds.into_iter().take(55) {
            pool.release(instance).expect("Should release red");
        }

        assert_eq!(counts(&mut pool, red), (70, 55, 15));
        assert_eq!(counts(&mut pool, blue), (30, 0, 30));

        for instance in blues {
            pool.release(instance).expect("Should release blue");
        }
        assert_eq!(counts(&mut pool, red), (70, 55, 15));
        assert_eq!(counts(&mut pool, blue), (30, 30, 0));
    }

    #[test]
    fn test_counts_stay_consistent_under_random_traffic() {
        let (mut pool, templates) = registry_with(&["A", "B", "C"]);
        let mut checked_out: Vec<Vec<NodeId>> = vec![Vec::new(); templates.len()];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..2000 {
            let index = rng.gen_range(0..templates.len());
            let outstanding = &mut checked_out[index];

            if outstanding.is_empty() || rng.gen_bool(0.55) {
                outstanding.push(pool.get(&templates[index]).expect("Unbounded pool should give"));
            } else {
                let position = rng.gen_range(0..outstanding.len());
                let instance = outstanding.swap_remove(position);
                pool.release(instance).expect("Should release");
            }

            for (template, outstanding) in templates.iter().zip(&checked_out) {
                let stats = pool.stats(template);
                assert_eq!(stats.all, stats.active + stats.inactive);
                assert_eq!(stats.active, outstanding.len());
            }
        }
    }

    #[test]
    fn test_clear_idle_leaves_active_untouched() {
        let (mut pool, templates) = registry_with(&["Leaf", "Twig"]);
        let (leaf, twig) = (&templates[0], &templates[1]);
        pool.prewarm(leaf, 6);
        pool.prewarm(twig, 2);
        let held: Vec<_> = (0..2).map(|_| pool.get(leaf).expect("Should get")).collect();

        assert_eq!(pool.clear_idle(leaf), 4);
        assert_eq!(counts(&mut pool, leaf), (2, 0, 2));
        assert_eq!(counts(&mut pool, twig), (2, 2, 0));
        assert!(held.iter().all(|instance| pool.runtime().is_alive(instance)));

        assert_eq!(pool.clear_idle_all(), 2);
        assert_eq!(pool.count_inactive(twig), 0);
    }

    #[test]
    fn test_foreign_release_is_rejected() {
        let mut runtime = SceneRuntime::new();
        let template = runtime.spawn("Owned");
        let foreign = runtime.spawn("Foreign");
        let mut pool = PoolRegistry::new(runtime);
        pool.prewarm(&template, 1);

        let error = pool.release(foreign).expect_err("Foreign object should be rejected");
        assert!(matches!(error, PoolError::NotOwned { .. }));
        assert_eq!(counts(&mut pool, &template), (1, 1, 0));

        // The template itself was never handed out either
        assert!(pool.release(template).is_err());
    }

    #[test]
    fn test_invalid_capacity_keeps_previous_policy() {
        let (mut pool, templates) = registry_with(&["Gem"]);
        let gem = &templates[0];
        pool.configure(gem, PoolPolicy::new(3)).expect("Valid policy");

        assert_eq!(
            pool.configure(gem, PoolPolicy::new(0)),
            Err(PoolError::InvalidCapacity { capacity: 0 })
        );

        for _ in 0..3 {
            pool.get(gem).expect("Should get");
        }
        assert!(pool.try_get(gem).is_none());
    }

    #[test]
    fn test_inactive_template_and_activate_flag() {
        let mut runtime = SceneRuntime::new();
        let template = runtime.spawn("Dormant");
        runtime.set_active(&template, false);
        let mut pool = PoolRegistry::new(runtime);

        pool.configure(&template, PoolPolicy::default().activate_on_get(false))
            .expect("Valid policy");
        let inactive = pool.get(&template).expect("Should get");
        assert!(!pool.runtime().is_active(inactive));

        pool.configure(&template, PoolPolicy::default().activate_on_get(true))
            .expect("Valid policy");
        let active = pool.get(&template).expect("Should get");
        assert!(pool.runtime().is_active(active));

        // Released instances come back active when the flag is on
        pool.release(inactive).expect("Should release");
        let reused = pool.get(&template).expect("Should get");
        assert_eq!(reused, inactive);
        assert!(pool.runtime().is_active(reused));
    }
}

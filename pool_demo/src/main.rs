//! Pool demo application
//!
//! Runs a short scripted shooter loop on top of the default pool registry:
//! weapons fire projectiles out of pooled templates, projectiles expire after
//! a few frames and go back to their pool. Pool counters are logged every
//! frame.
//!
//! Pass a `.toml` or `.ron` settings file to override the built-in policies.

use prefab_pool::prelude::*;
use rand::Rng;

const FRAMES: u32 = 60;

/// A projectile in flight
struct Shot {
    instance: NodeId,
    frames_left: u32,
}

struct PoolDemo {
    templates: Vec<(String, NodeId)>,
    shots: Vec<Shot>,
    frame: u32,
}

impl PoolDemo {
    fn new(settings: &PoolSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let items_container = settings.items_container.clone().unwrap_or_default();
        global::init(|| PoolRegistry::with_items_container(SceneRuntime::new(), &items_container))?;

        let mut templates = Vec::new();
        for template in &settings.templates {
            let prewarmed = global::with(|pool: &mut PoolRegistry<SceneRuntime>| {
                let node = pool
                    .runtime_mut()
                    .spawn_with_hooks(template.name.as_str(), PoolHooks::all());
                pool.apply_settings(&node, &template.policy).map(|count| (node, count))
            });
            let (node, count) = prewarmed?;
            log::info!("Template '{}' ready with {} prewarmed instances", template.name, count);
            templates.push((template.name.clone(), node));
        }

        Ok(Self {
            templates,
            shots: Vec::new(),
            frame: 0,
        })
    }

    fn step(&mut self, rng: &mut impl Rng) -> Result<(), PoolError> {
        self.frame += 1;

        // Fire
        for (name, template) in &self.templates {
            for _ in 0..rng.gen_range(0..4) {
                match global::try_get::<SceneRuntime>(template) {
                    Some(instance) => self.shots.push(Shot {
                        instance,
                        frames_left: rng.gen_range(2..8),
                    }),
                    None => log::debug!("Frame {}: '{}' pool exhausted", self.frame, name),
                }
            }
        }

        // Age and recycle
        let mut expired = Vec::new();
        self.shots.retain_mut(|shot| {
            shot.frames_left -= 1;
            if shot.frames_left == 0 {
                expired.push(shot.instance);
                false
            } else {
                true
            }
        });
        for instance in expired {
            global::release::<SceneRuntime>(instance)?;
        }

        let reclaimed = global::with(|pool: &mut PoolRegistry<SceneRuntime>| pool.runtime_mut().end_step());
        if reclaimed > 0 {
            log::debug!("Frame {}: reclaimed {} scene nodes", self.frame, reclaimed);
        }

        for (name, template) in &self.templates {
            let stats = global::with(|pool: &mut PoolRegistry<SceneRuntime>| pool.stats(template));
            log::info!(
                "Frame {:>2} {:<10} all={:<3} active={:<3} idle={:<3} utilization={:.0}%",
                self.frame,
                name,
                stats.all,
                stats.active,
                stats.inactive,
                stats.utilization() * 100.0
            );
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), PoolError> {
        for shot in self.shots.drain(..) {
            global::release::<SceneRuntime>(shot.instance)?;
        }
        let cleared = global::clear_idle_all::<SceneRuntime>();
        let runtime_stats = global::with(|pool: &mut PoolRegistry<SceneRuntime>| {
            pool.runtime_mut().end_step();
            pool.runtime().stats()
        });

        log::info!(
            "Shut down after {} frames: cleared {} idle instances, {} instantiated in total",
            self.frame,
            cleared,
            runtime_stats.instantiated
        );
        Ok(())
    }
}

fn default_settings() -> PoolSettings {
    let template = |name: &str, max_capacity: Option<usize>, group_returned: bool, prewarm: usize| TemplateSettings {
        name: name.to_string(),
        policy: PolicySettings {
            max_capacity,
            group_returned,
            prewarm,
            ..PolicySettings::default()
        },
    };

    PoolSettings {
        items_container: Some("PooledItems".to_string()),
        templates: vec![
            template("Bullet", Some(24), true, 12),
            template("Missile", Some(6), false, 2),
            template("Spark", None, true, 0),
        ],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting pool demo");

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading pool settings from {}", path);
            PoolSettings::load_from_file(&path)?
        }
        None => default_settings(),
    };
    settings.validate()?;

    let mut demo = PoolDemo::new(&settings)?;
    let mut rng = rand::thread_rng();
    for _ in 0..FRAMES {
        demo.step(&mut rng)?;
    }
    demo.shutdown()?;

    Ok(())
}

//! The collision proxy that shadows a rendered ball.
//!
//! The proxy is an invisible slime. It is registered far below its target
//! and moved into place by a deferred correction. Afterwards it follows the
//! visual entity tick by tick. Every move is pushed to observers immediately.
//! Health writes are swallowed and the dead flag is cleared every tick, so the
//! proxy only leaves the world when it is removed explicitly.

use glam::DVec3;
use hitbox_common::{EffectKind, EntityId, SpawnReason, StatusEffect, Transform};
use hitbox_kernel::{EntityBehavior, EntityData, EntityFlags, EntityKind, TaskScheduler, World};
use std::cell::OnceCell;
use std::rc::Rc;

use crate::broadcast::broadcast_transform;
use crate::config::{HitboxConfig, PluginConfig};
use crate::diagnostics::Diagnostics;
use crate::visual::VisualEntity;

/// Cheap, copyable reference to a proxy for code outside the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyHandle {
    id: EntityId,
}

impl ProxyHandle {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the proxy is still registered in `world`.
    pub fn is_valid(&self, world: &World) -> bool {
        world.contains(self.id)
    }

    pub fn location(&self, world: &World) -> Option<Transform> {
        world.get(self.id).map(|data| data.transform)
    }

    pub fn add_effect(&self, world: &mut World, effect: StatusEffect) -> bool {
        world.add_effect(self.id, effect)
    }
}

/// Collision stand-in for one visual entity.
pub struct HitboxProxy {
    id: EntityId,
    visual: Rc<dyn VisualEntity>,
    config: HitboxConfig,
    /// Visual position applied by the last sync, in the visual's own frame.
    last_known: Option<DVec3>,
    diagnostics: Rc<dyn Diagnostics>,
    handle: OnceCell<ProxyHandle>,
}

impl HitboxProxy {
    /// Register a proxy for `visual` and schedule its placement at `target`.
    ///
    /// The entity is registered `staging_depth` blocks below `target` and is
    /// visible to lookups straight away. It reaches `target` once
    /// `correction_delay_ticks` ticks have passed.
    pub fn spawn(
        world: &mut World,
        scheduler: &mut dyn TaskScheduler,
        config: &PluginConfig,
        target: Transform,
        visual: Rc<dyn VisualEntity>,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Self {
        let staging = target.offset(DVec3::new(0.0, -config.hitbox.staging_depth, 0.0));
        let data = EntityData::new(EntityKind::Slime)
            .with_size(config.ball.collision_size())
            .with_flags(EntityFlags {
                invulnerable: true,
                persistent: true,
                no_ai: true,
            })
            .with_transform(staging);
        let id = world.register(data, SpawnReason::Custom);

        let proxy = Self {
            id,
            visual,
            config: config.hitbox.clone(),
            last_known: None,
            diagnostics,
            handle: OnceCell::new(),
        };
        proxy
            .handle()
            .add_effect(world, StatusEffect::permanent(EffectKind::Invisibility));
        proxy.schedule_correction(scheduler, target);

        tracing::debug!(
            ?id,
            size = config.ball.collision_size(),
            staging_y = staging.position.y,
            "hitbox spawned"
        );
        proxy
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Built on first use, then cached.
    pub fn handle(&self) -> &ProxyHandle {
        self.handle.get_or_init(|| ProxyHandle { id: self.id })
    }

    pub fn last_known(&self) -> Option<DVec3> {
        self.last_known
    }

    fn schedule_correction(&self, scheduler: &mut dyn TaskScheduler, target: Transform) {
        let id = self.id;
        scheduler.run_after(
            self.config.correction_delay_ticks,
            Box::new(move |world: &mut World| {
                if !world.set_position_and_orientation(id, target) {
                    tracing::debug!(?id, "hitbox removed before placement, skipping");
                    return;
                }
                broadcast_transform(world, id);
            }),
        );
    }

    /// Catch up with the visual entity. Returns true if the proxy moved.
    fn sync(&mut self, id: EntityId, world: &mut World) -> bool {
        let source = self.visual.transform();
        if self
            .last_known
            .is_some_and(|last| same_position(last, source.position))
        {
            return false;
        }

        let lift = if self.visual.is_small() {
            self.config.small_offset
        } else {
            self.config.normal_offset
        };
        world.set_position_and_orientation(id, source.offset(DVec3::new(0.0, lift, 0.0)));
        self.last_known = Some(source.position);

        broadcast_transform(world, id);
        self.debug_position(world);
        true
    }

    fn debug_position(&self, world: &World) {
        if let Some(t) = self.handle().location(world) {
            let p = t.position;
            self.diagnostics.debug(&format!(
                "Hitbox at {} {} {}",
                p.x as f32, p.y as f32, p.z as f32
            ));
        }
    }
}

impl EntityBehavior for HitboxProxy {
    fn tick(&mut self, id: EntityId, world: &mut World) {
        world.base_tick(id);
        match world.get_mut(id) {
            Some(data) => data.dead = false,
            None => return,
        }
        self.sync(id, world);
    }

    fn set_health(&mut self, id: EntityId, _world: &mut World, health: f32) {
        tracing::trace!(?id, health, "hitbox health write ignored");
    }

    fn on_remove(&mut self, id: EntityId, _world: &mut World) {
        tracing::debug!(?id, "hitbox removed");
    }
}

/// Exact comparison: any bit difference counts as movement.
fn same_position(a: DVec3, b: DVec3) -> bool {
    a.x.to_bits() == b.x.to_bits()
        && a.y.to_bits() == b.y.to_bits()
        && a.z.to_bits() == b.z.to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BallMeta, BallSize};
    use crate::diagnostics::testing::RecordingDiagnostics;
    use crate::visual::BallModel;
    use hitbox_kernel::{Difficulty, ObserverId, Packet, Scheduler, WorldEvent};

    struct Harness {
        world: World,
        scheduler: Scheduler,
        proxy: HitboxProxy,
        model: Rc<BallModel>,
        diagnostics: Rc<RecordingDiagnostics>,
        observers: Vec<ObserverId>,
    }

    impl Harness {
        fn new(size: BallSize, hitbox_size: f64, target: Transform, observers: usize) -> Self {
            let mut world = World::new();
            let observers = (0..observers)
                .map(|i| world.connect(format!("player{i}"), target.position))
                .collect();
            let mut scheduler = Scheduler::starting_at(world.tick());
            let config = PluginConfig {
                ball: BallMeta { hitbox_size, size },
                ..PluginConfig::default()
            };
            let model = Rc::new(BallModel::new(target, size));
            let diagnostics = Rc::new(RecordingDiagnostics::default());
            let proxy = HitboxProxy::spawn(
                &mut world,
                &mut scheduler,
                &config,
                target,
                model.clone(),
                diagnostics.clone(),
            );
            Self {
                world,
                scheduler,
                proxy,
                model,
                diagnostics,
                observers,
            }
        }

        fn step(&mut self) {
            self.world.step();
            for task in self.scheduler.advance(self.world.tick()) {
                task(&mut self.world);
            }
            let id = self.proxy.id();
            self.proxy.tick(id, &mut self.world);
        }

        fn proxy_data(&self) -> &EntityData {
            self.world.get(self.proxy.id()).unwrap()
        }

        fn frames_per_observer(&self) -> Vec<usize> {
            self.observers
                .iter()
                .map(|o| self.world.observer(*o).unwrap().outbox().len())
                .collect()
        }
    }

    #[test]
    fn spawn_registers_below_target() {
        let target = Transform::at(5.0, 64.0, -7.0);
        let h = Harness::new(BallSize::Normal, 2.0, target, 0);
        let id = h.proxy.id();
        assert_eq!(
            h.world.events()[0],
            WorldEvent::Registered {
                id,
                transform: Transform::at(5.0, -136.0, -7.0),
                reason: SpawnReason::Custom,
            }
        );
        assert_eq!(h.scheduler.pending(), 1);
    }

    #[test]
    fn spawn_marks_proxy_untouchable_and_invisible() {
        let h = Harness::new(BallSize::Normal, 4.0, Transform::at(0.0, 64.0, 0.0), 0);
        let data = h.proxy_data();
        assert_eq!(data.kind, EntityKind::Slime);
        assert_eq!(data.size, 3);
        assert!(data.flags.invulnerable);
        assert!(data.flags.persistent);
        assert!(data.flags.no_ai);
        assert_eq!(data.health, data.max_health);
        assert!(data.has_effect(EffectKind::Invisibility));
        assert!(data.effects.iter().all(StatusEffect::is_permanent));
    }

    #[test]
    fn first_tick_snaps_to_small_ball() {
        let mut h = Harness::new(BallSize::Small, 2.0, Transform::at(10.0, 64.0, 10.0), 1);
        h.step();

        assert_eq!(
            h.proxy_data().transform.position,
            DVec3::new(10.0, 64.5, 10.0)
        );
        assert_eq!(h.frames_per_observer(), vec![1]);
        assert_eq!(h.proxy.last_known(), Some(DVec3::new(10.0, 64.0, 10.0)));
        assert_eq!(h.diagnostics.lines(), vec!["Hitbox at 10 64.5 10".to_string()]);
    }

    #[test]
    fn idle_ball_sends_nothing_more() {
        let mut h = Harness::new(BallSize::Small, 2.0, Transform::at(10.0, 64.0, 10.0), 2);
        h.step();
        for _ in 0..5 {
            h.step();
        }
        assert_eq!(h.frames_per_observer(), vec![1, 1]);
        assert_eq!(h.diagnostics.lines().len(), 1);
    }

    #[test]
    fn normal_ball_lifts_higher_and_copies_orientation() {
        let mut h = Harness::new(BallSize::Normal, 2.0, Transform::at(0.0, 64.0, 0.0), 1);
        h.step();

        let moved = Transform {
            yaw: 135.0,
            pitch: -20.0,
            ..Transform::at(2.5, 66.0, -1.0)
        };
        h.model.move_to(moved);
        h.step();

        let t = h.proxy_data().transform;
        assert_eq!(t.position, DVec3::new(2.5, 66.0 + 1.05, -1.0));
        assert_eq!(t.yaw, 135.0);
        assert_eq!(t.pitch, -20.0);
        assert_eq!(h.proxy.last_known(), Some(DVec3::new(2.5, 66.0, -1.0)));

        let frames = h.world.observer(h.observers[0]).unwrap().outbox();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            Packet::decode(&frames[1]).unwrap(),
            Packet::teleport(h.proxy.id(), &t)
        );
    }

    #[test]
    fn any_bit_change_counts_as_movement() {
        let mut h = Harness::new(BallSize::Small, 2.0, Transform::at(0.0, 64.0, 0.0), 1);
        h.step();

        h.model.move_to(Transform::at(-0.0, 64.0, 0.0));
        h.step();
        assert_eq!(h.frames_per_observer(), vec![2]);

        h.model.move_to(Transform::at(-0.0, 64.0 + 1e-12, 0.0));
        h.step();
        assert_eq!(h.frames_per_observer(), vec![3]);
    }

    #[test]
    fn rotation_alone_does_not_resync() {
        let mut h = Harness::new(BallSize::Small, 2.0, Transform::at(0.0, 64.0, 0.0), 1);
        h.step();
        h.model.move_to(Transform {
            yaw: 90.0,
            ..Transform::at(0.0, 64.0, 0.0)
        });
        h.step();
        assert_eq!(h.frames_per_observer(), vec![1]);
    }

    #[test]
    fn correction_lands_on_target_after_delay() {
        let target = Transform {
            yaw: 45.0,
            ..Transform::at(10.0, 64.0, 10.0)
        };
        let mut h = Harness::new(BallSize::Small, 2.0, target, 1);
        for _ in 0..19 {
            h.step();
        }
        assert_ne!(h.proxy_data().transform, target);
        assert_eq!(h.frames_per_observer(), vec![1]);

        h.step();
        assert_eq!(h.proxy_data().transform, target);
        let frames = h.world.observer(h.observers[0]).unwrap().outbox();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            Packet::decode(&frames[1]).unwrap(),
            Packet::teleport(h.proxy.id(), &target)
        );
    }

    #[test]
    fn correction_after_removal_is_harmless() {
        let mut h = Harness::new(BallSize::Normal, 2.0, Transform::at(0.0, 64.0, 0.0), 1);
        h.step();
        let id = h.proxy.id();
        h.world.despawn(id);
        h.world.drain_events();

        for _ in 0..25 {
            h.step();
        }
        assert!(!h.world.contains(id));
        assert!(
            !h.world
                .events()
                .iter()
                .any(|e| matches!(e, WorldEvent::Moved { .. }))
        );
        assert_eq!(h.frames_per_observer(), vec![1]);
        assert_eq!(h.scheduler.pending(), 0);
    }

    #[test]
    fn health_writes_are_ignored() {
        let mut h = Harness::new(BallSize::Normal, 4.0, Transform::at(0.0, 64.0, 0.0), 0);
        let id = h.proxy.id();
        let max = h.proxy_data().max_health;
        for value in [0.0, -10.0, 3.0, max * 2.0] {
            h.proxy.set_health(id, &mut h.world, value);
        }
        assert_eq!(h.proxy_data().health, max);
        assert!(!h.proxy_data().dead);
    }

    #[test]
    fn tick_always_clears_dead_flag() {
        let mut h = Harness::new(BallSize::Normal, 2.0, Transform::at(0.0, 64.0, 0.0), 0);
        h.world.set_difficulty(Difficulty::Peaceful);
        let id = h.proxy.id();
        for _ in 0..3 {
            h.world.get_mut(id).unwrap().dead = true;
            h.step();
            assert!(!h.proxy_data().dead);
        }
    }

    #[test]
    fn late_observer_sees_next_move_only() {
        let mut h = Harness::new(BallSize::Small, 2.0, Transform::at(0.0, 64.0, 0.0), 0);
        h.step();
        let late = h.world.connect("late", DVec3::ZERO);
        assert!(h.world.observer(late).unwrap().outbox().is_empty());

        h.model.move_to(Transform::at(1.0, 64.0, 0.0));
        h.step();
        assert_eq!(h.world.observer(late).unwrap().outbox().len(), 1);
    }

    #[test]
    fn handle_is_cached() {
        let h = Harness::new(BallSize::Normal, 2.0, Transform::at(0.0, 64.0, 0.0), 0);
        let first: *const ProxyHandle = h.proxy.handle();
        let second: *const ProxyHandle = h.proxy.handle();
        assert_eq!(first, second);
        assert!(h.proxy.handle().is_valid(&h.world));
        assert_eq!(
            h.proxy.handle().location(&h.world),
            Some(Transform::at(0.0, -136.0, 0.0))
        );
    }
}

use hitbox_common::EntityId;
use std::collections::BTreeMap;

use crate::entity::{DamageCause, EntityBehavior, EntityData};
use crate::schedule::Scheduler;
use crate::world::World;

/// The simulation loop: owns the world, the task scheduler, and the behaviors
/// attached to individual entities.
///
/// One [`Host::step`] is one tick. Within a tick the order is fixed: due
/// tasks, then every entity's tick hook, then queued damage, then removal of
/// dead entities.
pub struct Host {
    world: World,
    scheduler: Scheduler,
    behaviors: BTreeMap<EntityId, Box<dyn EntityBehavior>>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(World::new())
    }
}

impl Host {
    pub fn new(world: World) -> Self {
        let scheduler = Scheduler::starting_at(world.tick());
        Self {
            world,
            scheduler,
            behaviors: BTreeMap::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Borrow the world and the scheduler together, for code that spawns an
    /// entity and defers work against it in one go.
    pub fn parts_mut(&mut self) -> (&mut World, &mut Scheduler) {
        (&mut self.world, &mut self.scheduler)
    }

    /// Route the hooks of `id` through `behavior` instead of the defaults.
    pub fn attach(&mut self, id: EntityId, behavior: Box<dyn EntityBehavior>) {
        self.behaviors.insert(id, behavior);
    }

    pub fn has_behavior(&self, id: EntityId) -> bool {
        self.behaviors.contains_key(&id)
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.world.step();
        let tick = self.world.tick();
        let _span = tracing::debug_span!("host_step", tick).entered();

        for task in self.scheduler.advance(tick) {
            task(&mut self.world);
        }

        let ids: Vec<EntityId> = self.world.entities().keys().copied().collect();
        for id in ids {
            if !self.world.contains(id) {
                continue;
            }
            match self.behaviors.get_mut(&id) {
                Some(behavior) => behavior.tick(id, &mut self.world),
                None => self.world.base_tick(id),
            }
        }

        for pending in self.world.drain_pending_damage() {
            self.damage(pending.entity, pending.amount, pending.cause);
        }

        let dead: Vec<EntityId> = self
            .world
            .entities()
            .iter()
            .filter(|(_, data)| data.dead)
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            tracing::debug!(?id, "removing dead entity");
            self.remove(id);
        }
    }

    /// Hurt an entity. Returns false when the damage was ignored.
    ///
    /// The resulting health goes through the entity's `set_health` hook, so an
    /// attached behavior decides whether it sticks.
    pub fn damage(&mut self, id: EntityId, amount: f32, cause: DamageCause) -> bool {
        let Some(data) = self.world.get(id) else {
            return false;
        };
        if data.flags.invulnerable && !cause.bypasses_invulnerability() {
            tracing::trace!(?id, ?cause, "damage ignored, entity is invulnerable");
            return false;
        }
        let health = data.health - amount;
        match self.behaviors.get_mut(&id) {
            Some(behavior) => behavior.set_health(id, &mut self.world, health),
            None => {
                self.world.set_health(id, health);
            }
        }
        true
    }

    /// Take an entity out of the world, letting its behavior clean up first.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityData> {
        if let Some(mut behavior) = self.behaviors.remove(&id) {
            behavior.on_remove(id, &mut self.world);
        }
        self.world.despawn(id)
    }
}

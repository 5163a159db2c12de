use glam::DVec3;
use hitbox_common::{EntityId, SpawnReason, StatusEffect, Transform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::entity::{DamageCause, EntityData, EntityKind};
use crate::net::{Connection, ObserverId};

/// Entities without an observer inside this radius may be removed.
pub const NATURAL_DESPAWN_RANGE: f64 = 128.0;
/// How far below the minimum build height the void starts hurting.
pub const VOID_DAMAGE_DEPTH: f64 = 64.0;
/// Damage applied per tick while inside the void.
pub const VOID_DAMAGE: f32 = 4.0;
/// Events kept in the log before the oldest are dropped.
pub const EVENT_LOG_CAPACITY: usize = 1024;
const DEFAULT_MIN_Y: f64 = -64.0;
const AI_TURN_DEGREES: f32 = 10.0;

/// An event record produced by every mutation to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Entity was added to the world at the given transform.
    Registered {
        id: EntityId,
        transform: Transform,
        reason: SpawnReason,
    },
    /// Entity left the world. Carries its last transform.
    Removed { id: EntityId, transform: Transform },
    /// Entity transform was set explicitly.
    Moved {
        id: EntityId,
        old: Transform,
        new: Transform,
    },
    HealthChanged { id: EntityId, old: f32, new: f32 },
    EffectApplied { id: EntityId, effect: StatusEffect },
    /// Simulation advanced one tick.
    Stepped { tick: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Peaceful,
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Damage the world wants applied once the current tick's entity pass is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDamage {
    pub entity: EntityId,
    pub amount: f32,
    pub cause: DamageCause,
}

/// The authoritative world state.
///
/// All mutations go through explicit operations. Entities and observers are
/// kept in BTreeMaps so every pass over them has a stable order.
#[derive(Debug)]
pub struct World {
    entities: BTreeMap<EntityId, EntityData>,
    observers: BTreeMap<ObserverId, Connection>,
    next_observer: u32,
    tick: u64,
    difficulty: Difficulty,
    min_y: f64,
    pending_damage: Vec<PendingDamage>,
    /// Most recent mutations, oldest first, at most `event_capacity` long.
    event_log: VecDeque<WorldEvent>,
    event_capacity: usize,
}

impl Default for World {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            observers: BTreeMap::new(),
            next_observer: 0,
            tick: 0,
            difficulty: Difficulty::default(),
            min_y: DEFAULT_MIN_Y,
            pending_damage: Vec::new(),
            event_log: VecDeque::new(),
            event_capacity: EVENT_LOG_CAPACITY,
        }
    }
}

impl World {
    /// Create an empty world at tick 0 on normal difficulty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    /// Current simulation tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Number of entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Limit the event log to the newest `capacity` events.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self.trim_events();
        self
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        self.event_log.drain(..).collect()
    }

    /// Read-only access to the event log.
    ///
    /// Only the newest events are retained; see [`EVENT_LOG_CAPACITY`].
    pub fn events(&self) -> &VecDeque<WorldEvent> {
        &self.event_log
    }

    /// Read-only access to all entities.
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Add an entity to the world and assign it an identity.
    ///
    /// The entity is visible to lookups by id as soon as this returns.
    pub fn register(&mut self, data: EntityData, reason: SpawnReason) -> EntityId {
        let id = EntityId::new();
        let transform = data.transform;
        self.entities.insert(id, data);
        self.record(WorldEvent::Registered {
            id,
            transform,
            reason,
        });
        tracing::debug!(?id, ?reason, "entity registered");
        id
    }

    /// Remove an entity. Returns the data if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let data = self.entities.remove(&id);
        if let Some(ref d) = data {
            self.record(WorldEvent::Removed {
                id,
                transform: d.transform,
            });
        }
        data
    }

    /// Get a reference to entity data.
    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to entity data.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityData> {
        self.entities.get_mut(&id)
    }

    /// Move an entity, keeping its orientation.
    pub fn set_position(&mut self, id: EntityId, position: DVec3) -> bool {
        let Some(data) = self.entities.get(&id) else {
            return false;
        };
        let new = Transform {
            position,
            ..data.transform
        };
        self.set_position_and_orientation(id, new)
    }

    /// Replace an entity's transform and log the change.
    pub fn set_position_and_orientation(&mut self, id: EntityId, new: Transform) -> bool {
        if let Some(data) = self.entities.get_mut(&id) {
            let old = data.transform;
            data.transform = new;
            self.record(WorldEvent::Moved { id, old, new });
            true
        } else {
            false
        }
    }

    /// Write an entity's health, clamped to `0..=max_health`.
    ///
    /// An entity whose health reaches zero is marked dead.
    pub fn set_health(&mut self, id: EntityId, health: f32) -> bool {
        let Some(data) = self.entities.get_mut(&id) else {
            return false;
        };
        let old = data.health;
        data.health = health.clamp(0.0, data.max_health);
        if data.health <= 0.0 {
            data.dead = true;
        }
        let new = data.health;
        if old != new {
            self.record(WorldEvent::HealthChanged { id, old, new });
        }
        true
    }

    pub fn add_effect(&mut self, id: EntityId, effect: StatusEffect) -> bool {
        let Some(data) = self.entities.get_mut(&id) else {
            return false;
        };
        data.effects.retain(|e| e.kind != effect.kind);
        data.effects.push(effect);
        self.record(WorldEvent::EffectApplied { id, effect });
        true
    }

    fn record(&mut self, event: WorldEvent) {
        self.event_log.push_back(event);
        self.trim_events();
    }

    fn trim_events(&mut self) {
        let excess = self.event_log.len().saturating_sub(self.event_capacity);
        self.event_log.drain(..excess);
    }

    /// Advance the simulation clock by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        self.record(WorldEvent::Stepped { tick: self.tick });
    }

    /// The world's own per-tick processing for one entity.
    ///
    /// This ages the entity and runs its AI. It also applies the passive
    /// removal rules: peaceful difficulty, natural despawn, and the void.
    pub fn base_tick(&mut self, id: EntityId) {
        let Some(position) = self.entities.get(&id).map(|d| d.transform.position) else {
            return;
        };
        let observed = self.has_observer_within(position, NATURAL_DESPAWN_RANGE);
        let in_void = position.y < self.min_y - VOID_DAMAGE_DEPTH;
        let peaceful = self.difficulty == Difficulty::Peaceful;

        let Some(data) = self.entities.get_mut(&id) else {
            return;
        };
        data.ticks_lived += 1;

        if !data.flags.no_ai && data.kind == EntityKind::Slime {
            data.transform.yaw = (data.transform.yaw + AI_TURN_DEGREES) % 360.0;
        }
        if peaceful && data.kind.is_hostile() {
            data.dead = true;
        }
        if !data.flags.persistent && data.kind.despawns_naturally() && !observed {
            tracing::trace!(?id, "no observer in range, despawning");
            data.dead = true;
        }
        if in_void {
            self.pending_damage.push(PendingDamage {
                entity: id,
                amount: VOID_DAMAGE,
                cause: DamageCause::Void,
            });
        }
    }

    /// Take the damage queued during this tick's entity pass.
    pub fn drain_pending_damage(&mut self) -> Vec<PendingDamage> {
        std::mem::take(&mut self.pending_damage)
    }

    // --- Observers ---

    /// Attach a client to this world.
    pub fn connect(&mut self, name: impl Into<String>, position: DVec3) -> ObserverId {
        self.next_observer += 1;
        let id = ObserverId(self.next_observer);
        self.observers.insert(id, Connection::new(id, name, position));
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) -> Option<Connection> {
        self.observers.remove(&id)
    }

    pub fn observer(&self, id: ObserverId) -> Option<&Connection> {
        self.observers.get(&id)
    }

    /// Clients currently connected to this world.
    pub fn observers(&self) -> impl Iterator<Item = &Connection> {
        self.observers.values()
    }

    pub fn observers_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.observers.values_mut()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn has_observer_within(&self, position: DVec3, range: f64) -> bool {
        self.observers
            .values()
            .any(|o| o.position().distance_squared(position) <= range * range)
    }
}

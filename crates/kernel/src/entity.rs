use hitbox_common::{EffectKind, EntityId, StatusEffect, Transform};
use serde::{Deserialize, Serialize};

use crate::world::World;

/// Width of a slime per size step, in blocks.
const SLIME_WIDTH_PER_SIZE: f64 = 0.52;

/// Built-in entity types known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Slime,
    ArmorStand,
    Player,
}

impl EntityKind {
    /// Hostile mobs are removed by the world on peaceful difficulty.
    pub fn is_hostile(self) -> bool {
        matches!(self, Self::Slime)
    }

    /// Whether the world removes this kind when no observer is near.
    pub fn despawns_naturally(self) -> bool {
        matches!(self, Self::Slime)
    }

    /// Maximum health for an entity of this kind at the given size.
    pub fn max_health(self, size: i32) -> f32 {
        match self {
            Self::Slime => {
                let edge = (size + 1) as f32;
                edge * edge
            }
            Self::ArmorStand | Self::Player => 20.0,
        }
    }
}

/// Per-entity switches the host consults during its own processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityFlags {
    pub invulnerable: bool,
    pub persistent: bool,
    pub no_ai: bool,
}

/// Where damage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCause {
    Void,
    Fall,
    Fire,
    Drowning,
    Attack,
}

impl DamageCause {
    /// Void damage ignores the invulnerable flag.
    pub fn bypasses_invulnerability(self) -> bool {
        matches!(self, Self::Void)
    }
}

/// Per-entity data stored in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub kind: EntityKind,
    pub transform: Transform,
    pub health: f32,
    pub max_health: f32,
    /// Set by the host when the entity should be removed at the end of the tick.
    pub dead: bool,
    pub flags: EntityFlags,
    pub size: i32,
    pub effects: Vec<StatusEffect>,
    pub ticks_lived: u64,
}

impl EntityData {
    pub fn new(kind: EntityKind) -> Self {
        let max_health = kind.max_health(0);
        Self {
            kind,
            transform: Transform::default(),
            health: max_health,
            max_health,
            dead: false,
            flags: EntityFlags::default(),
            size: 0,
            effects: Vec::new(),
            ticks_lived: 0,
        }
    }

    /// Resize the entity. Health is reset to the new maximum.
    pub fn with_size(mut self, size: i32) -> Self {
        self.size = size.max(0);
        self.max_health = self.kind.max_health(self.size);
        self.health = self.max_health;
        self
    }

    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Horizontal extent of the collision box.
    pub fn collision_width(&self) -> f64 {
        match self.kind {
            EntityKind::Slime => SLIME_WIDTH_PER_SIZE * f64::from(self.size + 1),
            EntityKind::ArmorStand => 0.5,
            EntityKind::Player => 0.6,
        }
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }
}

/// Overridable hooks the host dispatches to for an entity.
///
/// Entities without an attached behavior get the defaults, which run the
/// world's own processing.
pub trait EntityBehavior {
    /// Called once per simulation tick.
    fn tick(&mut self, id: EntityId, world: &mut World) {
        world.base_tick(id);
    }

    /// Called whenever the host wants to change the entity's health.
    fn set_health(&mut self, id: EntityId, world: &mut World, health: f32) {
        world.set_health(id, health);
    }

    /// Called right before the entity leaves the world.
    fn on_remove(&mut self, _id: EntityId, _world: &mut World) {}
}

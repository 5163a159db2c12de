use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial transform: block-space position plus yaw and pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Transform {
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: DVec3::new(x, y, z),
            ..Self::default()
        }
    }

    /// Same orientation, shifted position.
    pub fn offset(self, delta: DVec3) -> Self {
        Self {
            position: self.position + delta,
            ..self
        }
    }
}

/// Why an entity was added to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnReason {
    Natural,
    Command,
    /// Added by plugin code rather than by the world itself.
    Custom,
}

/// Kind of status effect carried by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Invisibility,
    Slowness,
    Glowing,
}

/// A timed status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub duration_ticks: i32,
    pub amplifier: u8,
    pub ambient: bool,
    pub particles: bool,
}

impl StatusEffect {
    /// An effect that never runs out and shows no particles.
    pub fn permanent(kind: EffectKind) -> Self {
        Self {
            kind,
            duration_ticks: i32::MAX,
            amplifier: 0,
            ambient: false,
            particles: false,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.duration_ticks == i32::MAX
    }
}

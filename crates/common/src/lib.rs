//! Shared types for the hitbox workspace: identities, transforms, status effects.

mod types;

pub use types::{EffectKind, EntityId, SpawnReason, StatusEffect, Transform};

use hitbox_common::{EffectKind, EntityId};
use hitbox_kernel::{EntityFlags, EntityKind, World};

/// World inspector for developer tooling.
///
/// Read-only queries against the world for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            tick: world.tick(),
            entity_count: world.entity_count(),
            observer_count: world.observer_count(),
            queued_frames: world.observers().map(|o| o.outbox().len()).sum(),
            pending_events: world.events().len(),
        }
    }

    /// Snapshot one entity's state.
    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        world.get(id).map(|data| {
            let p = data.transform.position;
            EntityInfo {
                id,
                kind: data.kind,
                position: [p.x, p.y, p.z],
                rotation: [data.transform.yaw, data.transform.pitch],
                health: data.health,
                max_health: data.max_health,
                flags: data.flags,
                size: data.size,
                width: data.collision_width(),
                invisible: data.has_effect(EffectKind::Invisibility),
            }
        })
    }

    /// List all entity IDs in the world.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.entities().keys().copied().collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub entity_count: usize,
    pub observer_count: usize,
    /// Frames waiting in observer outboxes.
    pub queued_frames: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} entities={} observers={} queued_frames={} pending_events={}",
            self.tick,
            self.entity_count,
            self.observer_count,
            self.queued_frames,
            self.pending_events
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: [f64; 3],
    /// Yaw and pitch in degrees.
    pub rotation: [f32; 2],
    pub health: f32,
    pub max_health: f32,
    pub flags: EntityFlags,
    pub size: i32,
    /// Horizontal extent of the collision box.
    pub width: f64,
    pub invisible: bool,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.id.0.simple().to_string();
        write!(
            f,
            "{:?} [{}] pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} health={}/{} size={} width={:.2}",
            self.kind,
            id.get(..8).unwrap_or(&id),
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.health,
            self.max_health,
            self.size,
            self.width,
        )?;
        if self.flags.invulnerable {
            write!(f, " invulnerable")?;
        }
        if self.flags.persistent {
            write!(f, " persistent")?;
        }
        if self.flags.no_ai {
            write!(f, " no-ai")?;
        }
        if self.invisible {
            write!(f, " invisible")?;
        }
        Ok(())
    }
}

use hitbox_common::EntityId;
use hitbox_kernel::{Packet, World};

/// Push the entity's current transform to every observer in `world`, right now.
///
/// Returns how many observers were sent the update. Nothing is sent if the
/// entity is gone or the update cannot be encoded.
pub fn broadcast_transform(world: &mut World, id: EntityId) -> usize {
    let Some(data) = world.get(id) else {
        return 0;
    };
    let packet = Packet::teleport(id, &data.transform);
    let frame = match packet.encode() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(?id, error = %e, "dropping transform update");
            return 0;
        }
    };

    let mut sent = 0;
    for observer in world.observers_mut() {
        observer.send_raw(frame.clone());
        sent += 1;
    }
    tracing::trace!(?id, sent, "transform update sent");
    sent
}

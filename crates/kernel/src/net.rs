//! Observer connections and the clientbound wire format.
//!
//! Frames are CBOR-encoded [`Packet`] values. A connection only queues frames;
//! the transport that owns the socket drains the outbox.

use glam::DVec3;
use hitbox_common::{EntityId, Transform};
use serde::{Deserialize, Serialize};

/// Identifier of a connected observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub u32);

/// Clientbound messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Packet {
    /// Absolute position and orientation of an entity.
    EntityTeleport {
        entity: EntityId,
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
    },
}

/// Errors from encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("CBOR serialization error: {0}")]
    Encode(String),
    #[error("CBOR deserialization error: {0}")]
    Decode(String),
}

impl Packet {
    pub fn teleport(entity: EntityId, transform: &Transform) -> Self {
        Self::EntityTeleport {
            entity,
            x: transform.position.x,
            y: transform.position.y,
            z: transform.position.z,
            yaw: transform.yaw,
            pitch: transform.pitch,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| PacketError::Encode(e.to_string()))?;
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        ciborium::from_reader(bytes).map_err(|e| PacketError::Decode(e.to_string()))
    }
}

/// A connected client and its pending outbound frames.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ObserverId,
    name: String,
    position: DVec3,
    outbox: Vec<Vec<u8>>,
}

impl Connection {
    pub fn new(id: ObserverId, name: impl Into<String>, position: DVec3) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            outbox: Vec::new(),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Queue an already-encoded frame.
    pub fn send_raw(&mut self, frame: Vec<u8>) {
        self.outbox.push(frame);
    }

    /// Encode and queue a packet.
    pub fn send(&mut self, packet: &Packet) -> Result<(), PacketError> {
        self.send_raw(packet.encode()?);
        Ok(())
    }

    /// Frames waiting to be written.
    pub fn outbox(&self) -> &[Vec<u8>] {
        &self.outbox
    }

    pub fn drain_outbox(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbox)
    }
}

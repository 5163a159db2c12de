//! World Kernel: authoritative world state, entity hooks, the tick loop, and
//! the clientbound wire format.
//!
//! # Invariants
//! - All state mutations flow through explicit operations and are logged. The
//!   log keeps the newest `EVENT_LOG_CAPACITY` events.
//! - Everything runs on the simulation thread; deferred work is queued, not threaded.
//! - Entity and observer iteration order is deterministic (BTreeMap).

pub mod entity;
pub mod host;
pub mod net;
pub mod schedule;
pub mod world;

pub use entity::{DamageCause, EntityBehavior, EntityData, EntityFlags, EntityKind};
pub use host::Host;
pub use net::{Connection, ObserverId, Packet, PacketError};
pub use schedule::{Scheduler, Task, TaskScheduler};
pub use world::{Difficulty, EVENT_LOG_CAPACITY, PendingDamage, World, WorldEvent};

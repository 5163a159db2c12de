//! Collision proxy for a rendered ball.
//!
//! A [`HitboxProxy`] is an invisible, immortal entity that shadows a
//! [`VisualEntity`] so the host's collision checks land where players see the
//! ball. It is attached to a [`hitbox_kernel::Host`] as an entity behavior.
//!
//! # Invariants
//! - The proxy moves only when the visual entity's position changed, and every
//!   move is sent to all current observers in the same tick.
//! - Health writes are ignored and the dead flag is cleared every tick.
//! - Removing the ball removes its proxy.

mod ball;
mod broadcast;
pub mod config;
mod diagnostics;
mod proxy;
mod visual;

pub use ball::Ball;
pub use broadcast::broadcast_transform;
pub use config::{BallMeta, BallSize, ConfigError, HitboxConfig, PluginConfig};
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use proxy::{HitboxProxy, ProxyHandle};
pub use visual::{BallModel, VisualEntity};

pub fn crate_info() -> &'static str {
    "hitbox-proxy v0.1.0"
}

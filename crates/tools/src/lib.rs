//! Developer tooling: read-only world inspection for debugging and the CLI.
//!
//! # Invariants
//! - Tools never mutate world state.

mod inspector;

pub use inspector::{EntityInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "hitbox-tools v0.1.0"
}

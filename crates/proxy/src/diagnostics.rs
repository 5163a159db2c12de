use crate::config::HitboxConfig;

/// Sink for optional debug output. Never fails the caller.
pub trait Diagnostics {
    fn debug(&self, message: &str);
}

/// Forwards debug lines to `tracing` when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TracingDiagnostics {
    enabled: bool,
}

impl TracingDiagnostics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enabled exactly when `hitbox.debug` is set.
    pub fn from_config(config: &HitboxConfig) -> Self {
        Self::new(config.debug)
    }
}

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, message: &str) {
        if self.enabled {
            tracing::debug!(target: "hitbox", "{message}");
        }
    }
}

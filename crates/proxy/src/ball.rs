use hitbox_common::Transform;
use hitbox_kernel::Host;
use std::rc::Rc;

use crate::config::PluginConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::proxy::{HitboxProxy, ProxyHandle};
use crate::visual::{BallModel, VisualEntity};

/// A rendered ball together with the collision proxy that follows it.
///
/// Dropping a `Ball` leaves the proxy in the world; call [`Ball::remove`].
#[derive(Debug)]
pub struct Ball {
    model: Rc<BallModel>,
    hitbox: ProxyHandle,
}

impl Ball {
    /// Create the ball model at `target` and attach a proxy to it.
    ///
    /// Debug output follows `config.hitbox.debug`.
    pub fn spawn(host: &mut Host, config: &PluginConfig, target: Transform) -> Self {
        let diagnostics = Rc::new(TracingDiagnostics::from_config(&config.hitbox));
        Self::spawn_with_diagnostics(host, config, target, diagnostics)
    }

    /// Like [`Ball::spawn`], with debug output going to `diagnostics`.
    pub fn spawn_with_diagnostics(
        host: &mut Host,
        config: &PluginConfig,
        target: Transform,
        diagnostics: Rc<dyn Diagnostics>,
    ) -> Self {
        let model = Rc::new(BallModel::new(target, config.ball.size));
        let visual: Rc<dyn VisualEntity> = model.clone();
        let (world, scheduler) = host.parts_mut();
        let proxy = HitboxProxy::spawn(world, scheduler, config, target, visual, diagnostics);
        let hitbox = *proxy.handle();
        host.attach(hitbox.id(), Box::new(proxy));
        Self { model, hitbox }
    }

    pub fn model(&self) -> &BallModel {
        &self.model
    }

    pub fn hitbox(&self) -> ProxyHandle {
        self.hitbox
    }

    /// Tear the ball down. The proxy leaves the world with it.
    ///
    /// Returns false if the proxy was already gone.
    pub fn remove(self, host: &mut Host) -> bool {
        host.remove(self.hitbox.id()).is_some()
    }
}

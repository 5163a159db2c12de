use hitbox_common::Transform;
use std::cell::Cell;

use crate::config::BallSize;

/// Read-only view of the rendered entity a proxy follows.
pub trait VisualEntity {
    fn transform(&self) -> Transform;
    fn is_small(&self) -> bool;
}

/// The rendered ball. Its motion is driven from outside; the proxy only reads it.
#[derive(Debug)]
pub struct BallModel {
    transform: Cell<Transform>,
    size: BallSize,
}

impl BallModel {
    pub fn new(transform: Transform, size: BallSize) -> Self {
        Self {
            transform: Cell::new(transform),
            size,
        }
    }

    pub fn size(&self) -> BallSize {
        self.size
    }

    pub fn move_to(&self, transform: Transform) {
        self.transform.set(transform);
    }
}

impl VisualEntity for BallModel {
    fn transform(&self) -> Transform {
        self.transform.get()
    }

    fn is_small(&self) -> bool {
        self.size == BallSize::Small
    }
}

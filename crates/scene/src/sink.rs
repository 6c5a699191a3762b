use crate::components::{LayerId, Primitive};

/// Where converters put what they build.
///
/// The scene is injected through this trait so the conversion pipeline can
/// run against a plain `Vec` in tests and against [`crate::World`] in the
/// viewer. Adding is not idempotent: every call records a new primitive.
pub trait PrimitiveSink {
    fn add_primitive(&mut self, layer: LayerId, primitive: Primitive);
}

impl PrimitiveSink for Vec<Primitive> {
    fn add_primitive(&mut self, _layer: LayerId, primitive: Primitive) {
        self.push(primitive);
    }
}

impl PrimitiveSink for Vec<(LayerId, Primitive)> {
    fn add_primitive(&mut self, layer: LayerId, primitive: Primitive) {
        self.push((layer, primitive));
    }
}

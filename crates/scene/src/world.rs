use std::collections::BTreeMap;

use crate::components::{LayerId, Primitive, PrimitiveKind};
use crate::entity::EntityId;
use crate::sink::PrimitiveSink;

/// Scene store: one entity per primitive, tagged with the layer that
/// produced it.
#[derive(Debug, Default)]
pub struct World {
    layers: Vec<LayerId>,
    primitives: Vec<Primitive>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_primitive(&mut self, layer: LayerId, primitive: Primitive) -> EntityId {
        let entity = EntityId::from_index(self.primitives.len());
        self.layers.push(layer);
        self.primitives.push(primitive);
        entity
    }

    pub fn primitive(&self, entity: EntityId) -> Option<&Primitive> {
        self.primitives.get(entity.index() as usize)
    }

    pub fn layer(&self, entity: EntityId) -> Option<LayerId> {
        self.layers.get(entity.index() as usize).copied()
    }

    /// Primitives in insertion order.
    pub fn primitives(&self) -> Vec<(EntityId, &Primitive)> {
        self.primitives
            .iter()
            .enumerate()
            .map(|(idx, primitive)| (EntityId::from_index(idx), primitive))
            .collect()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn count_by_kind(&self) -> BTreeMap<PrimitiveKind, usize> {
        let mut out = BTreeMap::new();
        for primitive in &self.primitives {
            *out.entry(primitive.kind()).or_insert(0) += 1;
        }
        out
    }
}

impl PrimitiveSink for World {
    fn add_primitive(&mut self, layer: LayerId, primitive: Primitive) {
        self.spawn_primitive(layer, primitive);
    }
}

use foundation::handles::Handle;

/// Scene entity. Entities are never despawned, so the generation stays 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub(crate) fn from_index(index: usize) -> Self {
        EntityId(Handle::new(index as u32, 0))
    }

    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

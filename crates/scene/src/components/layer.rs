use serde::{Deserialize, Serialize};

/// Identifies the layer a scene entity was produced by.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u64);

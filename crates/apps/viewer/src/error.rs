use std::io;
use std::path::PathBuf;

use formats::manifest::ManifestError;
use scene::camera::FramingError;
use thiserror::Error;

use crate::loader::LoadError;

/// Errors that end a viewer run.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("cannot frame scene: {0}")]
    Framing(#[from] FramingError),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

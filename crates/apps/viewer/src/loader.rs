use std::io::ErrorKind;

use bytes::{Bytes, BytesMut};
use formats::geojson::{FeatureCollection, GeoJsonError};
use formats::manifest::{DatasetEntry, ManifestError, SceneManifest, MANIFEST_FILE_NAME};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataRoot;

/// A dataset that could not be fetched or decoded. Its converter never runs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{location} not found")]
    NotFound { location: String },
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{location} returned HTTP {status}")]
    Status { location: String, status: u16 },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to decode dataset {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: GeoJsonError,
    },
}

/// Reads scene files from a directory or a base URL.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    root: DataRoot,
    http: Client,
}

impl DatasetSource {
    pub fn new(root: DataRoot) -> Self {
        Self {
            root,
            http: Client::new(),
        }
    }

    pub fn root(&self) -> &DataRoot {
        &self.root
    }

    /// Raw bytes of `relative` under the root.
    pub async fn fetch(&self, relative: &str) -> Result<Bytes, LoadError> {
        let location = self.root.locate(relative);
        match &self.root {
            DataRoot::Dir(dir) => match tokio::fs::read(dir.join(relative)).await {
                Ok(data) => Ok(Bytes::from(data)),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    Err(LoadError::NotFound { location })
                }
                Err(source) => Err(LoadError::Io { location, source }),
            },
            DataRoot::Url(_) => self.fetch_url(location).await,
        }
    }

    async fn fetch_url(&self, location: String) -> Result<Bytes, LoadError> {
        let resp = match self.http.get(&location).send().await {
            Ok(resp) => resp,
            Err(source) => return Err(LoadError::Http { location, source }),
        };
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound { location });
        }
        if !status.is_success() {
            return Err(LoadError::Status {
                location,
                status: status.as_u16(),
            });
        }

        let mut body = BytesMut::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => body.extend_from_slice(&chunk),
                Err(source) => return Err(LoadError::Http { location, source }),
            }
        }
        debug!(%location, bytes = body.len(), "fetched");
        Ok(body.freeze())
    }

    /// The root's `scene.manifest.json`, or the default manifest when there
    /// is none.
    pub async fn manifest(&self) -> Result<SceneManifest, LoadError> {
        match self.fetch(MANIFEST_FILE_NAME).await {
            Ok(bytes) => Ok(SceneManifest::from_json_slice(&bytes)?),
            Err(LoadError::NotFound { location }) => {
                info!(%location, "no manifest, using the default dataset list");
                Ok(SceneManifest::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch, verify and decode one dataset.
    pub async fn load(&self, entry: &DatasetEntry) -> Result<FeatureCollection, LoadError> {
        let bytes = self.fetch(&entry.path).await?;
        entry.verify(&bytes)?;
        let collection =
            FeatureCollection::from_geojson_slice(&bytes).map_err(|source| LoadError::Decode {
                id: entry.id.clone(),
                source,
            })?;
        info!(
            dataset = %entry.id,
            role = %entry.role,
            features = collection.len(),
            "dataset loaded"
        );
        Ok(collection)
    }
}

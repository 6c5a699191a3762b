//! Dataset manifest: which GeoJSON files make up a scene and how to lay
//! them out.

use std::fmt;

use foundation::math::Crs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MANIFEST_VERSION: &str = "1.0";
pub const MANIFEST_FILE_NAME: &str = "scene.manifest.json";

/// Scene units per unit of source elevation.
pub const DEFAULT_Z_SCALE: f64 = 0.0004;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetRole {
    /// Elevation contour lines; the authoritative extent of the scene.
    Contours,
    CellTowers,
    FmContours,
    FmTowers,
}

impl fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DatasetRole::Contours => "contours",
            DatasetRole::CellTowers => "cell_towers",
            DatasetRole::FmContours => "fm_contours",
            DatasetRole::FmTowers => "fm_towers",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetEntry {
    pub id: String,
    pub role: DatasetRole,
    /// Relative to the scene root (directory or base URL).
    pub path: String,
    /// BLAKE3 hex digest of the raw file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl DatasetEntry {
    pub fn new(id: impl Into<String>, role: DatasetRole, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            path: path.into(),
            content_hash: None,
        }
    }

    /// Check raw bytes against `content_hash`, when one is pinned.
    pub fn verify(&self, bytes: &[u8]) -> Result<(), ManifestError> {
        let Some(expected) = &self.content_hash else {
            return Ok(());
        };
        let actual = blake3::hash(bytes).to_hex().to_string();
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ManifestError::HashMismatch {
                id: self.id.clone(),
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub crs: Crs,
    #[serde(default = "default_z_scale")]
    pub z_scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_deg: Option<f64>,
    /// Graticule spacing in planar units; derived from `crs` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graticule_grid: Option<f64>,
    pub datasets: Vec<DatasetEntry>,
}

fn default_z_scale() -> f64 {
    DEFAULT_Z_SCALE
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported manifest version: {found}")]
    UnsupportedVersion { found: String },
    #[error("manifest lists {0} contour datasets, expected exactly one")]
    ContourCount(usize),
    #[error("duplicate dataset id: {0}")]
    DuplicateId(String),
    #[error("z_scale must be finite and non-zero, got {0}")]
    InvalidZScale(f64),
    #[error("content hash mismatch for {id}: expected {expected}, got {actual}")]
    HashMismatch {
        id: String,
        expected: String,
        actual: String,
    },
}

impl Default for SceneManifest {
    /// The four datasets of the New York State cell/FM tower scene.
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            name: None,
            crs: Crs::Geographic,
            z_scale: DEFAULT_Z_SCALE,
            fov_deg: None,
            graticule_grid: None,
            datasets: vec![
                DatasetEntry::new(
                    "contours",
                    DatasetRole::Contours,
                    "data/cont49l010a_Clip_SimplifyLin_simplified.geojson",
                ),
                DatasetEntry::new(
                    "cell_towers",
                    DatasetRole::CellTowers,
                    "data/Cellular_Tower_HIFLD_NYSclip_20231101_simplified.geojson",
                ),
                DatasetEntry::new(
                    "fm_contours",
                    DatasetRole::FmContours,
                    "data/FM_contours_NYS_clip_20231101.geojson",
                ),
                DatasetEntry::new(
                    "fm_towers",
                    DatasetRole::FmTowers,
                    "data/FM_TransTowers_PairwiseClip_NYS_20231101_simplified.geojson",
                ),
            ],
        }
    }
}

impl SceneManifest {
    pub fn from_json_str(payload: &str) -> Result<Self, ManifestError> {
        let manifest: SceneManifest = serde_json::from_str(payload)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_json_slice(payload: &[u8]) -> Result<Self, ManifestError> {
        let manifest: SceneManifest = serde_json::from_slice(payload)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.version != MANIFEST_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: self.version.clone(),
            });
        }
        if !self.z_scale.is_finite() || self.z_scale == 0.0 {
            return Err(ManifestError::InvalidZScale(self.z_scale));
        }

        let contours = self
            .datasets
            .iter()
            .filter(|d| d.role == DatasetRole::Contours)
            .count();
        if contours != 1 {
            return Err(ManifestError::ContourCount(contours));
        }

        let mut seen = std::collections::HashSet::new();
        for d in &self.datasets {
            if !seen.insert(d.id.as_str()) {
                return Err(ManifestError::DuplicateId(d.id.clone()));
            }
        }
        Ok(())
    }

    /// The authoritative contour dataset. Only valid on a validated manifest.
    pub fn contours(&self) -> Option<&DatasetEntry> {
        self.datasets
            .iter()
            .find(|d| d.role == DatasetRole::Contours)
    }

    pub fn secondary(&self) -> impl Iterator<Item = &DatasetEntry> {
        self.datasets
            .iter()
            .filter(|d| d.role != DatasetRole::Contours)
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetEntry, DatasetRole, ManifestError, SceneManifest};
    use foundation::math::Crs;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_manifest_is_valid() {
        let manifest = SceneManifest::default();
        manifest.validate().expect("valid");
        assert_eq!(manifest.datasets.len(), 4);
        assert_eq!(manifest.contours().map(|d| d.id.as_str()), Some("contours"));
        assert_eq!(manifest.secondary().count(), 3);
    }

    #[test]
    fn parses_with_defaults_filled_in() {
        let payload = r#"{
            "version": "1.0",
            "crs": {"kind": "web_mercator"},
            "datasets": [
                {"id": "c", "role": "contours", "path": "c.geojson"},
                {"id": "t", "role": "fm_towers", "path": "t.geojson"}
            ]
        }"#;
        let manifest = SceneManifest::from_json_str(payload).expect("parse");
        assert_eq!(manifest.crs, Crs::WebMercator);
        assert_eq!(manifest.z_scale, super::DEFAULT_Z_SCALE);
        assert_eq!(
            manifest.datasets[1],
            DatasetEntry::new("t", DatasetRole::FmTowers, "t.geojson")
        );
    }

    #[test]
    fn rejects_bad_manifests() {
        let mut manifest = SceneManifest::default();
        manifest.version = "2.0".to_string();
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::UnsupportedVersion { .. })
        ));

        let mut manifest = SceneManifest::default();
        manifest.datasets.retain(|d| d.role != DatasetRole::Contours);
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::ContourCount(0))
        ));

        let mut manifest = SceneManifest::default();
        manifest.datasets[2].id = "cell_towers".to_string();
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateId(_))
        ));

        let mut manifest = SceneManifest::default();
        manifest.z_scale = 0.0;
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::InvalidZScale(_))
        ));
    }

    #[test]
    fn verifies_pinned_content_hash() {
        let bytes = br#"{"type":"FeatureCollection","features":[]}"#;
        let mut entry = DatasetEntry::new("c", DatasetRole::Contours, "c.geojson");
        entry.verify(bytes).expect("unpinned passes");

        entry.content_hash = Some(blake3::hash(bytes).to_hex().to_uppercase());
        entry.verify(bytes).expect("matching hash passes");

        let err = entry.verify(b"tampered").expect_err("mismatch");
        assert!(matches!(err, ManifestError::HashMismatch { .. }));
    }

    #[test]
    fn serialized_manifest_reads_back() {
        let mut custom = SceneManifest::default();
        custom.name = Some("Demo".to_string());
        custom.fov_deg = Some(60.0);
        custom.graticule_grid = Some(5_000.0);
        let payload = serde_json::to_vec_pretty(&custom).expect("serialize");
        let loaded = SceneManifest::from_json_slice(&payload).expect("load");
        assert_eq!(loaded, custom);
    }
}

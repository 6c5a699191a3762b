use std::collections::BTreeMap;
use std::path::Path;

use foundation::math::Crs;
use formats::manifest::SceneManifest;
use layers::LayerReport;
use scene::camera::OrbitControls;
use scene::components::{LayerId, Primitive, PrimitiveKind};
use serde::Serialize;
use tracing::info;

use crate::error::ViewerError;
use crate::pipeline::{DatasetFailure, SceneBuild};

/// Machine-readable outcome of one viewer run.
#[derive(Debug, Serialize)]
pub struct SceneSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub crs: Crs,
    pub z_scale: f64,
    pub base_elevation: f64,
    pub extent: ExtentSummary,
    pub camera: OrbitControls,
    pub layers: Vec<LayerReport>,
    pub failures: Vec<DatasetFailure>,
    pub primitive_counts: BTreeMap<PrimitiveKind, usize>,
    pub markers_outside_extent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitives: Option<Vec<PrimitiveRecord>>,
}

/// Horizontal framing box; the vertical bounds are always unbounded.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ExtentSummary {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveRecord {
    pub layer: LayerId,
    #[serde(flatten)]
    pub primitive: Primitive,
}

impl SceneSummary {
    pub fn from_build(build: &SceneBuild, manifest: &SceneManifest, dump_primitives: bool) -> Self {
        let primitives = dump_primitives.then(|| {
            build
                .world
                .primitives()
                .into_iter()
                .filter_map(|(entity, primitive)| {
                    Some(PrimitiveRecord {
                        layer: build.world.layer(entity)?,
                        primitive: primitive.clone(),
                    })
                })
                .collect()
        });

        Self {
            name: manifest.name.clone(),
            crs: manifest.crs,
            z_scale: build.context.z_scale,
            base_elevation: build.context.base_elevation,
            extent: ExtentSummary {
                min_x: build.extent.min.x,
                min_y: build.extent.min.y,
                max_x: build.extent.max.x,
                max_y: build.extent.max.y,
            },
            camera: build.controls.clone(),
            layers: build.reports.clone(),
            failures: build.failures.clone(),
            primitive_counts: build.world.count_by_kind(),
            markers_outside_extent: build.markers_outside_extent(),
            primitives,
        }
    }

    pub fn to_json(&self) -> Result<String, ViewerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to `out`, or to stdout when no path is given.
    pub async fn write(&self, out: Option<&Path>) -> Result<(), ViewerError> {
        let json = self.to_json()?;
        match out {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .map_err(|source| ViewerError::Write {
                        path: path.to_path_buf(),
                        source,
                    })?;
                info!(path = %path.display(), "summary written");
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

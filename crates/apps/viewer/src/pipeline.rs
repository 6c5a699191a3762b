//! Scene assembly: the contour dataset first, then everything else as it
//! arrives.

use std::fmt;
use std::num::NonZeroUsize;

use foundation::bounds::BoundingBox;
use foundation::math::Projector;
use formats::geojson::FeatureCollection;
use formats::manifest::{DatasetEntry, DatasetRole, ManifestError, SceneManifest};
use layers::polygons::DEFAULT_STRIDE;
use layers::{
    compute_bounding_box, ContourLayer, GraticuleLayer, LayerError, LayerReport, MarkerLayer,
    MarkerStyle, PipelineContext, PolygonFanLayer,
};
use scene::camera::{framing, OrbitControls, PerspectiveCamera, DEFAULT_FOV_DEG};
use scene::components::{LayerId, PrimitiveKind};
use scene::World;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::ViewerError;
use crate::loader::{DatasetSource, LoadError};

pub const GRATICULE_LAYER: u64 = 1;
pub const CONTOUR_LAYER: u64 = 2;
pub const FM_CONTOUR_LAYER: u64 = 3;
pub const CELL_TOWER_LAYER: u64 = 4;
pub const FM_TOWER_LAYER: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub fov_deg: f64,
    pub stride: NonZeroUsize,
    pub lock: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fov_deg: DEFAULT_FOV_DEG,
            stride: DEFAULT_STRIDE,
            lock: false,
        }
    }
}

/// A dataset that produced nothing: its load or its conversion failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetFailure {
    pub dataset: String,
    pub role: DatasetRole,
    pub error: String,
}

impl DatasetFailure {
    fn new(entry: &DatasetEntry, err: &impl fmt::Display) -> Self {
        Self {
            dataset: entry.id.clone(),
            role: entry.role,
            error: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct SceneBuild {
    pub world: World,
    pub controls: OrbitControls,
    pub extent: BoundingBox,
    pub context: PipelineContext,
    pub reports: Vec<LayerReport>,
    pub failures: Vec<DatasetFailure>,
}

impl SceneBuild {
    /// Markers whose anchor lies outside the contour extent. They stay in
    /// the scene but the camera cannot pan to them.
    pub fn markers_outside_extent(&self) -> usize {
        self.world
            .primitives()
            .into_iter()
            .filter(|(_, p)| p.kind() == PrimitiveKind::Marker)
            .filter_map(|(_, p)| p.anchor())
            .filter(|anchor| !self.extent.contains_xy(anchor.truncate()))
            .count()
    }

    pub fn report(&self, layer: LayerId) -> Option<&LayerReport> {
        self.reports.iter().find(|r| r.layer == layer)
    }
}

/// Build the whole scene described by `manifest`.
///
/// The contour dataset must load and must have a usable extent; any other
/// dataset that fails is recorded in [`SceneBuild::failures`] and skipped.
pub async fn build_scene(
    source: &DatasetSource,
    manifest: &SceneManifest,
    options: &PipelineOptions,
) -> Result<SceneBuild, ViewerError> {
    manifest.validate()?;
    let contours_entry = manifest.contours().ok_or(ManifestError::ContourCount(0))?;
    let projector = Projector::new(manifest.crs);

    let contours = source.load(contours_entry).await?;
    let extent = compute_bounding_box(&contours, &projector);
    if let Err(err) = framing::size(&extent) {
        error!(dataset = %contours_entry.id, %err, "contour extent is unusable");
        return Err(err.into());
    }

    let contour_layer = ContourLayer::new(CONTOUR_LAYER);
    let base_elevation = match contour_layer.elevation_range(&contours) {
        Some((lo, _)) => lo,
        None => {
            warn!(key = contour_layer.key(), "no contour elevations, base set to 0");
            0.0
        }
    };
    let ctx = PipelineContext::new(projector, manifest.z_scale).with_base_elevation(base_elevation);

    let mut world = World::new();
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    let graticule = match manifest.graticule_grid {
        Some(grid_size) => GraticuleLayer::new(GRATICULE_LAYER).with_grid_size(grid_size),
        None => GraticuleLayer::for_crs(GRATICULE_LAYER, manifest.crs),
    };
    match graticule.build(&extent, &mut world) {
        Ok(report) => reports.push(report),
        Err(err) => {
            warn!(%err, "graticule skipped");
            reports.push(LayerReport::failed(&graticule, &err));
        }
    }
    match contour_layer.build(&contours, &ctx, &mut world) {
        Ok(report) => reports.push(report),
        Err(err) => {
            error!(dataset = %contours_entry.id, %err, "contour conversion failed");
            failures.push(DatasetFailure::new(contours_entry, &err));
        }
    }

    let mut controls = OrbitControls::new(PerspectiveCamera::new(options.fov_deg, 16.0 / 9.0));
    controls.frame(extent)?;
    controls.set_locked(options.lock)?;
    info!(
        min_x = extent.min.x,
        min_y = extent.min.y,
        max_x = extent.max.x,
        max_y = extent.max.y,
        distance = controls.pose.position.z,
        "camera framed"
    );

    let mut pending = JoinSet::new();
    for entry in manifest.secondary() {
        let source = source.clone();
        let entry = entry.clone();
        pending.spawn(async move {
            let result = source.load(&entry).await;
            (entry, result)
        });
    }

    while let Some(joined) = pending.join_next().await {
        let (entry, result) = match joined {
            Ok(done) => done,
            Err(err) => {
                error!(%err, "dataset task failed");
                continue;
            }
        };
        match convert(&entry, result, &ctx, options, &mut world) {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => {}
            Err(failure) => failures.push(failure),
        }
    }

    Ok(SceneBuild {
        world,
        controls,
        extent,
        context: ctx,
        reports,
        failures,
    })
}

fn convert(
    entry: &DatasetEntry,
    loaded: Result<FeatureCollection, LoadError>,
    ctx: &PipelineContext,
    options: &PipelineOptions,
    world: &mut World,
) -> Result<Option<LayerReport>, DatasetFailure> {
    let collection = loaded.map_err(|err| {
        error!(dataset = %entry.id, %err, "dataset load failed");
        DatasetFailure::new(entry, &err)
    })?;

    let built: Result<LayerReport, LayerError> = match entry.role {
        DatasetRole::CellTowers => {
            MarkerLayer::new(CELL_TOWER_LAYER, "cell_towers", MarkerStyle::cell_tower())
                .build(&collection, ctx, world)
        }
        DatasetRole::FmTowers => {
            MarkerLayer::new(FM_TOWER_LAYER, "fm_towers", MarkerStyle::fm_tower())
                .build(&collection, ctx, world)
        }
        DatasetRole::FmContours => PolygonFanLayer::new(FM_CONTOUR_LAYER)
            .with_stride(options.stride)
            .build(&collection, ctx, world),
        DatasetRole::Contours => {
            warn!(dataset = %entry.id, "extra contour dataset ignored");
            return Ok(None);
        }
    };

    built.map(Some).map_err(|err| {
        error!(dataset = %entry.id, %err, "dataset conversion failed");
        DatasetFailure::new(entry, &err)
    })
}

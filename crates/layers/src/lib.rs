pub mod context;
pub mod contours;
pub mod error;
pub mod extent;
pub mod graticule;
pub mod layer;
pub mod markers;
pub mod polygons;
pub mod symbology;

pub use context::PipelineContext;
pub use contours::ContourLayer;
pub use error::LayerError;
pub use extent::compute_bounding_box;
pub use graticule::GraticuleLayer;
pub use layer::*;
pub use markers::{MarkerLayer, MarkerStyle};
pub use polygons::PolygonFanLayer;
pub use symbology::{ColorRamp, RampError};

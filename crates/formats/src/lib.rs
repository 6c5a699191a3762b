pub mod geojson;
pub mod manifest;

pub use geojson::*;
pub use manifest::*;

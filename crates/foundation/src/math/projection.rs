//! Geographic to planar projection.
//!
//! A [`Projector`] is built once from a [`Crs`] and then passed by value to
//! everything that needs planar coordinates. Projection is pure: the same
//! input always yields the same output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geodesy::{Geodetic, WGS84_A, ecef_to_enu, geodetic_to_ecef};
use super::vec::Vec2;

/// Latitude bound of the square Web Mercator world.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("invalid coordinate: longitude ({lon}), latitude ({lat})")]
    InvalidCoordinate { lon: f64, lat: f64 },
}

/// Coordinate reference systems the scene can be laid out in.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Crs {
    /// `+proj=longlat +datum=WGS84`: planar x/y are longitude/latitude degrees.
    #[default]
    Geographic,
    /// EPSG:3857 meters.
    WebMercator,
    /// East/north meters on the WGS84 tangent plane at the origin.
    LocalTangent {
        origin_lon_deg: f64,
        origin_lat_deg: f64,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Projector {
    crs: Crs,
}

impl Projector {
    pub fn new(crs: Crs) -> Self {
        Self { crs }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Project a longitude/latitude pair in degrees.
    ///
    /// Every finite input maps to a finite point; non-finite input is
    /// rejected rather than coerced.
    pub fn project(&self, lon: f64, lat: f64) -> Result<Vec2, ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::InvalidCoordinate { lon, lat });
        }

        let out = match self.crs {
            Crs::Geographic => Vec2::new(lon, lat),
            Crs::WebMercator => web_mercator(lon, lat),
            Crs::LocalTangent {
                origin_lon_deg,
                origin_lat_deg,
            } => {
                let origin = Geodetic::from_degrees(origin_lon_deg, origin_lat_deg);
                let enu = ecef_to_enu(geodetic_to_ecef(Geodetic::from_degrees(lon, lat)), origin);
                Vec2::new(enu.east, enu.north)
            }
        };

        // Overflow is only reachable through a non-finite tangent origin.
        if !out.is_finite() {
            return Err(ProjectionError::InvalidCoordinate { lon, lat });
        }
        Ok(out)
    }
}

fn web_mercator(lon: f64, lat: f64) -> Vec2 {
    let lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    let x = WGS84_A * lon.to_radians();
    let y = WGS84_A * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::{Crs, ProjectionError, Projector};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geographic_is_identity_on_degrees() {
        let p = Projector::default().project(-73.75, 42.65).expect("project");
        assert_eq!(p.x, -73.75);
        assert_eq!(p.y, 42.65);
    }

    #[test]
    fn rejects_non_finite_input() {
        for crs in [
            Crs::Geographic,
            Crs::WebMercator,
            Crs::LocalTangent {
                origin_lon_deg: -74.0,
                origin_lat_deg: 42.0,
            },
        ] {
            let projector = Projector::new(crs);
            for (lon, lat) in [
                (f64::NAN, 0.0),
                (0.0, f64::INFINITY),
                (f64::NEG_INFINITY, f64::NAN),
            ] {
                let err = projector.project(lon, lat).expect_err("non-finite input");
                assert!(matches!(err, ProjectionError::InvalidCoordinate { .. }));
            }
        }
    }

    #[test]
    fn finite_input_stays_finite_for_every_crs() {
        let samples = [
            (0.0, 0.0),
            (-180.0, -90.0),
            (180.0, 90.0),
            (1.0e300, -1.0e300),
            (-73.9, 40.7),
        ];
        for crs in [
            Crs::Geographic,
            Crs::WebMercator,
            Crs::LocalTangent {
                origin_lon_deg: -74.0,
                origin_lat_deg: 42.0,
            },
        ] {
            let projector = Projector::new(crs);
            for (lon, lat) in samples {
                let p = projector.project(lon, lat).expect("finite");
                assert!(p.is_finite(), "{crs:?} ({lon}, {lat}) -> {p:?}");
            }
        }
    }

    #[test]
    fn web_mercator_known_values() {
        let projector = Projector::new(Crs::WebMercator);
        let origin = projector.project(0.0, 0.0).expect("project");
        assert_close(origin.x, 0.0, 1e-6);
        assert_close(origin.y, 0.0, 1e-6);

        let east = projector.project(180.0, 0.0).expect("project");
        assert_close(east.x.abs(), 20_037_508.342_789_244, 1e-3);

        let corner = projector.project(0.0, 90.0).expect("project");
        assert_close(corner.y, 20_037_508.342_789_244, 1e-3);
    }

    #[test]
    fn crs_deserializes_from_tagged_json() {
        let crs: Crs = serde_json::from_str(r#"{"kind":"web_mercator"}"#).expect("parse");
        assert_eq!(crs, Crs::WebMercator);
        let crs: Crs = serde_json::from_str(
            r#"{"kind":"local_tangent","origin_lon_deg":-74.0,"origin_lat_deg":42.0}"#,
        )
        .expect("parse");
        assert!(matches!(crs, Crs::LocalTangent { .. }));
    }
}

use foundation::bounds::BoundingBox;
use foundation::math::Projector;
use formats::geojson::{FeatureCollection, Position};
use tracing::{debug, warn};

/// Planar units added on every horizontal side of a dataset extent.
pub const EXTENT_PADDING: f64 = 2.0;

/// Padded planar extent of every coordinate in `collection`.
///
/// Positions that are malformed or that the projector rejects are left out.
/// A collection with nothing projectable yields a degenerate box.
pub fn compute_bounding_box(collection: &FeatureCollection, projector: &Projector) -> BoundingBox {
    let mut bbox = BoundingBox::empty();
    let mut included = 0usize;
    let mut skipped = 0usize;

    for (index, feature) in collection.features.iter().enumerate() {
        feature.geometry.visit_positions(&mut |position: &Position| {
            let projected = position
                .point()
                .map_err(|e| e.to_string())
                .and_then(|p| {
                    projector
                        .project(p.lon_deg, p.lat_deg)
                        .map_err(|e| e.to_string())
                });
            match projected {
                Ok(p) => {
                    bbox.include(p);
                    included += 1;
                }
                Err(error) => {
                    warn!(feature = index, %error, "position left out of extent");
                    skipped += 1;
                }
            }
        });
    }

    if included == 0 {
        warn!(features = collection.len(), skipped, "no projectable positions");
        return bbox;
    }
    debug!(included, skipped, "extent computed");
    bbox.padded(EXTENT_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::geojson::FeatureCollection;

    fn collection(json: &str) -> FeatureCollection {
        FeatureCollection::from_geojson_str(json).expect("geojson")
    }

    #[test]
    fn folds_all_geometry_kinds_and_pads() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1.0,2.0]}},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[-3.0,0.5],[0.0,0.0]]}},
                {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[4.0,-1.0],[5.0,-1.0],[5.0,6.0],[4.0,-1.0]]]}}
            ]}"#,
        );
        let bbox = compute_bounding_box(&fc, &Projector::default());
        assert_eq!(bbox.min.x, -5.0);
        assert_eq!(bbox.min.y, -3.0);
        assert_eq!(bbox.max.x, 7.0);
        assert_eq!(bbox.max.y, 8.0);
        assert!(bbox.min.x <= bbox.max.x && bbox.min.y <= bbox.max.y);
        assert_eq!(bbox.min.z, f64::NEG_INFINITY);
        assert_eq!(bbox.max.z, f64::INFINITY);
    }

    #[test]
    fn corners_round_trip_up_to_padding() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"MultiPoint","coordinates":[[10.0,20.0],[12.0,25.0],[11.0,21.0]]}}
            ]}"#,
        );
        let projector = Projector::default();
        let bbox = compute_bounding_box(&fc, &projector);

        let ring: Vec<String> = bbox
            .corners()
            .iter()
            .map(|c| format!("[{:?},{:?}]", c.x, c.y))
            .collect();
        let corners = collection(&format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{}},"geometry":{{"type":"MultiPoint","coordinates":[{}]}}}}
            ]}}"#,
            ring.join(",")
        ));
        let recomputed = compute_bounding_box(&corners, &projector);
        assert_eq!(recomputed, bbox.padded(EXTENT_PADDING));
    }

    #[test]
    fn skips_malformed_positions() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0.0,0.0],[1.0],["x",2.0],[1.0,1.0,9.0],[1.0,1.0]]}}
            ]}"#,
        );
        let bbox = compute_bounding_box(&fc, &Projector::default());
        assert_eq!(bbox.max.x, 3.0);
        assert_eq!(bbox.max.y, 3.0);
    }

    #[test]
    fn empty_collection_is_degenerate() {
        let bbox = compute_bounding_box(&FeatureCollection::default(), &Projector::default());
        assert!(bbox.is_degenerate());
    }
}

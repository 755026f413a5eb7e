//! Great-circle distance helper shared by every crate that needs to turn a
//! pair of lat/lon coordinates into a physical length.

use geo::{HaversineDistance, Point};

/// Great-circle distance between two lat/lon points, in metres.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1, lat1);
    let p2 = Point::new(lon2, lat2);
    p1.haversine_distance(&p2)
}

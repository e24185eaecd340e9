//! Planar coordinate math.
//!
//! The engine treats `(lat, lng)` as a flat plane: every distance is the
//! Euclidean norm of the coordinate delta. That is accurate enough at
//! city-block scale and keeps A*, nearest-node lookup and scoring in one unit
//! system. Metres are derived with a single conversion factor
//! (see [`METERS_PER_DEGREE`]).

use serde::{Deserialize, Serialize};

/// Metres per coordinate unit when coordinates are decimal degrees.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in coordinate units.
    pub fn distance_to(self, other: Coordinate) -> f64 {
        planar_distance(self, other)
    }

    /// Move `fraction` of the way toward `target` (convex combination).
    /// `fraction` is clamped to `[0, 1]`, so the result never overshoots.
    pub fn step_toward(self, target: Coordinate, fraction: f64) -> Coordinate {
        let t = fraction.clamp(0.0, 1.0);
        Coordinate {
            lat: self.lat + (target.lat - self.lat) * t,
            lng: self.lng + (target.lng - self.lng) * t,
        }
    }

    pub fn approx_eq(self, other: Coordinate, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

pub fn planar_distance(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = b.lat - a.lat;
    let dlng = b.lng - a.lng;
    (dlat * dlat + dlng * dlng).sqrt()
}

/// Total length of a polyline, in coordinate units.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| planar_distance(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean_in_coordinate_space() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn step_toward_never_overshoots() {
        let from = Coordinate::new(0.0, 0.0);
        let to = Coordinate::new(10.0, -10.0);
        assert_eq!(from.step_toward(to, 0.5), Coordinate::new(5.0, -5.0));
        assert_eq!(from.step_toward(to, 2.0), to);
        assert_eq!(from.step_toward(to, -1.0), from);
    }

    #[test]
    fn polyline_length_sums_segments() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 2.0),
        ];
        assert_eq!(polyline_length(&points), 3.0);
        assert_eq!(polyline_length(&points[..1]), 0.0);
    }
}

//! Geographic positions and proximity filtering.
//!
//! Distances use a local equirectangular approximation: latitude degrees are
//! scaled by 111,320 m/degree, longitude degrees by `111,320·cos(lat)`
//! m/degree, and the Euclidean norm of the two scaled deltas is taken. This
//! is only valid at human walking scales (tens of meters); it deliberately
//! avoids great-circle trigonometry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse a stored JSON blob, falling back to the origin coordinate.
    ///
    /// Positions are written by a different, less-trusted code path than
    /// the read, so reads must fail soft instead of propagating a parse
    /// error.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Serialize for storage.
    ///
    /// # Panics
    ///
    /// Never panics; two plain floats always serialize.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("position serializes")
    }

    /// Approximate distance to `other` in meters.
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat) * METERS_PER_DEGREE;
        let d_lng = (other.lng - self.lng) * METERS_PER_DEGREE * self.lat.to_radians().cos();
        d_lat.hypot(d_lng)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { lat: 0.0, lng: 0.0 }
    }
}

/// Geo-distance filter over a snapshot of player positions.
#[derive(Debug, Default)]
pub struct ProximityIndex {
    entries: Vec<(i64, Position)>,
}

impl ProximityIndex {
    /// Build an index from `(player_id, position)` pairs.
    #[must_use]
    pub fn new(entries: Vec<(i64, Position)>) -> Self {
        Self { entries }
    }

    /// Player ids within `radius_m` meters of `origin`.
    ///
    /// `radius_m = None` means unbounded and returns every indexed player;
    /// this is used during an active meeting, where chat must reach every
    /// player regardless of distance.
    #[must_use]
    pub fn nearby(&self, origin: Position, radius_m: Option<f64>) -> HashSet<i64> {
        self.entries
            .iter()
            .filter(|(_, pos)| match radius_m {
                None => true,
                Some(r) => origin.distance_m(pos) <= r,
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::MurmurError;

/// Mean Earth radius in meters, per the IUGG value used for haversine.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate pair.
///
/// Latitude ∈ [-90, 90], longitude ∈ [-180, 180]. The exact point (0, 0)
/// is treated as an "unset" sentinel and rejected by [`GeoPoint::new`]:
/// no real whisper is dropped on null island, but plenty of broken
/// clients send zeroed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MurmurError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MurmurError::InvalidLocation(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MurmurError::InvalidLocation(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        if latitude == 0.0 && longitude == 0.0 {
            return Err(MurmurError::InvalidLocation(
                "(0, 0) is treated as unset".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to another point in meters (haversine).
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Bounding box half-widths (degrees latitude/longitude) that enclose a
    /// circle of `radius_meters` around this point. Used as a cheap SQL
    /// prefilter before the exact haversine check.
    ///
    /// Longitude width degenerates near the poles; it is capped at 180 so
    /// the prefilter stays a superset of the circle rather than dividing
    /// by a vanishing cosine.
    pub fn bounding_deltas(&self, radius_meters: f64) -> (f64, f64) {
        let lat_delta = (radius_meters / EARTH_RADIUS_M).to_degrees();
        let cos_lat = self.latitude.to_radians().cos().abs();
        let lon_delta = if cos_lat < 1e-6 {
            180.0
        } else {
            (lat_delta / cos_lat).min(180.0)
        };
        (lat_delta, lon_delta)
    }
}

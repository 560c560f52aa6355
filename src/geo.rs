/// A GeoJSON position as published by the feed: `[lon, lat, depth?]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLatDepth {
    pub lon: f64,
    pub lat: f64,
    pub depth: Option<f64>,
}

impl LonLatDepth {
    /// Read a GeoJSON position. Needs at least two values; a missing or
    /// non-finite third value becomes `None`.
    pub fn from_position(coords: &[f64]) -> Option<Self> {
        if coords.len() < 2 {
            return None;
        }
        Some(Self {
            lon: coords[0],
            lat: coords[1],
            depth: coords.get(2).copied().filter(|d| d.is_finite()),
        })
    }
}

/// Reorder a feed position into geographic-standard `(lat, lon)`
#[inline(always)]
pub fn to_lat_lon(p: &LonLatDepth) -> (f64, f64) {
    (p.lat, p.lon)
}

/// Inverse of [`to_lat_lon`], reattaching the depth
#[inline(always)]
pub fn from_lat_lon((lat, lon): (f64, f64), depth: Option<f64>) -> LonLatDepth {
    LonLatDepth { lon, lat, depth }
}

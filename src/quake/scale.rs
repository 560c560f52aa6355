//! Marker sizing and the colour scales shared by markers and the legend.
//!
//! Each basis is a single table of ascending `(lower bound, colour)` bands.
//! Lookups walk the table from the highest band down and take the first
//! band the value clears; anything below every bound gets the floor band.
//! The legend is built from the same table, so the two cannot drift.

use std::fmt;
use std::str::FromStr;

use crate::geo;
use crate::quake::record::EarthquakeRecord;

/// Radius for a record with no magnitude
pub const DEFAULT_RADIUS: f64 = 3.0;
/// Radius for negative-magnitude (micro) events, deliberately below the default
pub const NEGATIVE_RADIUS: f64 = 2.0;

/// 24-bit colour, displayed as `#rrggbb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// How a value is tested against a band's lower bound
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `value > bound`
    Above,
    /// `value >= bound`
    AtOrAbove,
}

impl Comparison {
    #[inline(always)]
    fn clears(self, value: f64, bound: f64) -> bool {
        match self {
            Comparison::Above => value > bound,
            Comparison::AtOrAbove => value >= bound,
        }
    }
}

/// A threshold colour scale
#[derive(Debug)]
pub struct ColorScale {
    /// Legend heading
    pub name: &'static str,
    /// Ascending `(lower bound, colour)` bands. The first entry is the
    /// floor band; its bound only labels the legend.
    pub bands: &'static [(f64, Rgb)],
    pub comparison: Comparison,
    /// Colour for a missing value
    pub unknown: Rgb,
    /// Added to each bound when sampling legend colours, so exclusive
    /// scales sample from inside the band rather than on its edge
    pub legend_offset: f64,
}

impl ColorScale {
    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        let Some(value) = value else {
            return self.unknown;
        };
        self.bands
            .iter()
            .skip(1)
            .rev()
            .find(|(bound, _)| self.comparison.clears(value, *bound))
            .or_else(|| self.bands.first())
            .map(|(_, color)| *color)
            .unwrap_or(self.unknown)
    }

    /// Band lower bounds, ascending
    pub fn grades(&self) -> impl Iterator<Item = f64> + '_ {
        self.bands.iter().map(|(bound, _)| *bound)
    }
}

/// Depth in km. Deeper events get warmer, darker tones.
///
/// A missing depth is drawn with the shallowest colour, the same as the
/// floor band, rather than a separate "unknown" colour.
pub static DEPTH_SCALE: ColorScale = ColorScale {
    name: "Depth (km)",
    bands: &[
        (-10.0, Rgb::from_hex(0xfff7ec)),
        (10.0, Rgb::from_hex(0xfee8c8)),
        (30.0, Rgb::from_hex(0xfdbb84)),
        (70.0, Rgb::from_hex(0xfc8d59)),
        (150.0, Rgb::from_hex(0xe34a33)),
        (300.0, Rgb::from_hex(0xb30000)),
    ],
    comparison: Comparison::Above,
    unknown: Rgb::from_hex(0xfff7ec),
    legend_offset: 1.0,
};

/// Magnitude. A missing magnitude is neutral grey.
pub static MAGNITUDE_SCALE: ColorScale = ColorScale {
    name: "Magnitude",
    bands: &[
        (0.0, Rgb::from_hex(0xffeda0)),
        (2.0, Rgb::from_hex(0xfeb24c)),
        (4.0, Rgb::from_hex(0xfd8d3c)),
        (5.0, Rgb::from_hex(0xe31a1c)),
        (6.0, Rgb::from_hex(0xbd0026)),
        (8.0, Rgb::from_hex(0x800026)),
    ],
    comparison: Comparison::AtOrAbove,
    unknown: Rgb::from_hex(0xcccccc),
    legend_offset: 0.0,
};

/// Which record field drives marker colour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Basis {
    #[default]
    Depth,
    Magnitude,
}

impl Basis {
    pub fn scale(self) -> &'static ColorScale {
        match self {
            Basis::Depth => &DEPTH_SCALE,
            Basis::Magnitude => &MAGNITUDE_SCALE,
        }
    }

    pub fn value_of(self, record: &EarthquakeRecord) -> Option<f64> {
        match self {
            Basis::Depth => record.depth_km,
            Basis::Magnitude => record.magnitude,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Basis::Depth => Basis::Magnitude,
            Basis::Magnitude => Basis::Depth,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Basis::Depth => "depth",
            Basis::Magnitude => "magnitude",
        }
    }
}

impl FromStr for Basis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth" => Ok(Basis::Depth),
            "magnitude" | "mag" => Ok(Basis::Magnitude),
            other => Err(format!("unknown colour basis '{other}' (expected depth or magnitude)")),
        }
    }
}

/// Display radius for a magnitude.
///
/// Quadratic in magnitude, floored at [`DEFAULT_RADIUS`]. Missing
/// magnitude gets the default; negative magnitude gets [`NEGATIVE_RADIUS`].
pub fn radius_for(magnitude: Option<f64>) -> f64 {
    match magnitude {
        None => DEFAULT_RADIUS,
        Some(m) if m < 0.0 => NEGATIVE_RADIUS,
        Some(m) => (m * m * 0.5).max(DEFAULT_RADIUS),
    }
}

/// Fill colour for a depth or magnitude value under the given basis
pub fn color_for(value: Option<f64>, basis: Basis) -> Rgb {
    basis.scale().color_for(value)
}

/// Everything the map surface needs to draw one event
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub fill: Rgb,
}

impl Marker {
    pub fn for_record(record: &EarthquakeRecord, basis: Basis) -> Self {
        let (lat, lon) = geo::to_lat_lon(&record.position());
        Self {
            lat,
            lon,
            radius: radius_for(record.magnitude),
            fill: color_for(basis.value_of(record), basis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(magnitude: Option<f64>, depth_km: Option<f64>) -> EarthquakeRecord {
        EarthquakeRecord {
            id: "test".to_string(),
            longitude: -120.0,
            latitude: 36.0,
            depth_km,
            magnitude,
            place: None,
            time_millis: None,
            info_url: None,
        }
    }

    #[test]
    fn test_radius_floor_and_default() {
        assert_eq!(radius_for(None), 3.0);
        assert_eq!(radius_for(Some(0.0)), 3.0);
        assert_eq!(radius_for(Some(2.449)), 3.0);
        assert_eq!(radius_for(Some(-0.5)), 2.0);
        assert_eq!(radius_for(Some(-7.0)), 2.0);
    }

    #[test]
    fn test_radius_quadratic_growth() {
        assert!((radius_for(Some(7.2)) - 25.92).abs() < 1e-9);
        assert_eq!(radius_for(Some(4.0)), 8.0);

        let mut prev = radius_for(Some(2.5));
        for i in 1..60 {
            let r = radius_for(Some(2.5 + i as f64 * 0.1));
            assert!(r > prev);
            prev = r;
        }
    }

    #[test]
    fn test_radius_never_below_two() {
        for i in -200..200 {
            assert!(radius_for(Some(i as f64 * 0.05)) >= 2.0);
        }
        assert!(radius_for(Some(f64::NAN)) >= 2.0);
    }

    #[test]
    fn test_depth_bands_exclusive() {
        assert_eq!(color_for(Some(300.0), Basis::Depth).hex(), "#e34a33");
        assert_eq!(color_for(Some(300.1), Basis::Depth).hex(), "#b30000");
        assert_eq!(color_for(Some(150.5), Basis::Depth).hex(), "#e34a33");
        assert_eq!(color_for(Some(70.0), Basis::Depth).hex(), "#fdbb84");
        assert_eq!(color_for(Some(35.4), Basis::Depth).hex(), "#fdbb84");
        assert_eq!(color_for(Some(10.0), Basis::Depth).hex(), "#fff7ec");
        assert_eq!(color_for(Some(10.5), Basis::Depth).hex(), "#fee8c8");
        assert_eq!(color_for(Some(5.0), Basis::Depth).hex(), "#fff7ec");
        assert_eq!(color_for(Some(-3.0), Basis::Depth).hex(), "#fff7ec");
    }

    #[test]
    fn test_magnitude_bands_inclusive() {
        assert_eq!(color_for(Some(6.0), Basis::Magnitude).hex(), "#bd0026");
        assert_eq!(color_for(Some(5.99), Basis::Magnitude).hex(), "#e31a1c");
        assert_eq!(color_for(Some(8.1), Basis::Magnitude).hex(), "#800026");
        assert_eq!(color_for(Some(8.0), Basis::Magnitude).hex(), "#800026");
        assert_eq!(color_for(Some(4.0), Basis::Magnitude).hex(), "#fd8d3c");
        assert_eq!(color_for(Some(2.0), Basis::Magnitude).hex(), "#feb24c");
        assert_eq!(color_for(Some(1.9), Basis::Magnitude).hex(), "#ffeda0");
        assert_eq!(color_for(Some(-1.0), Basis::Magnitude).hex(), "#ffeda0");
    }

    #[test]
    fn test_hex_is_lowercase() {
        let palette = ["#FFEDA0", "#FEB24C", "#FD8D3C", "#E31A1C", "#BD0026", "#800026"];
        for ((_, color), expected) in MAGNITUDE_SCALE.bands.iter().zip(palette) {
            assert_eq!(color.hex(), expected.to_ascii_lowercase());
        }
        assert_eq!(Rgb::from_hex(0xABCDEF).to_string(), "#abcdef");
    }

    #[test]
    fn test_unknown_values() {
        assert_eq!(color_for(None, Basis::Magnitude).hex(), "#cccccc");
        // Unknown depth renders as shallow
        assert_eq!(color_for(None, Basis::Depth).hex(), "#fff7ec");
    }

    #[test]
    fn test_color_is_total() {
        let mut allowed: Vec<Rgb> = Vec::new();
        for basis in [Basis::Depth, Basis::Magnitude] {
            let scale = basis.scale();
            allowed.extend(scale.bands.iter().map(|(_, c)| *c));
            allowed.push(scale.unknown);
        }
        let samples = [
            None,
            Some(f64::NAN),
            Some(f64::INFINITY),
            Some(f64::NEG_INFINITY),
            Some(-1e9),
            Some(0.0),
            Some(1e9),
        ];
        for basis in [Basis::Depth, Basis::Magnitude] {
            for v in samples {
                assert!(allowed.contains(&color_for(v, basis)));
            }
        }
    }

    #[test]
    fn test_marker_scenarios() {
        let m = Marker::for_record(&record(Some(7.2), Some(35.4)), Basis::Depth);
        assert!((m.radius - 25.92).abs() < 1e-9);
        assert_eq!(m.fill.hex(), "#fdbb84");
        assert_eq!((m.lat, m.lon), (36.0, -120.0));

        let m = Marker::for_record(&record(None, Some(5.0)), Basis::Depth);
        assert_eq!(m.radius, 3.0);
        assert_eq!(m.fill.hex(), "#fff7ec");

        let m = Marker::for_record(&record(Some(-0.5), Some(5.0)), Basis::Depth);
        assert_eq!(m.radius, 2.0);

        let m = Marker::for_record(&record(None, Some(5.0)), Basis::Magnitude);
        assert_eq!(m.fill.hex(), "#cccccc");

        let m = Marker::for_record(&record(Some(8.1), None), Basis::Magnitude);
        assert_eq!(m.fill.hex(), "#800026");
    }

    #[test]
    fn test_basis_parse() {
        assert_eq!("depth".parse::<Basis>(), Ok(Basis::Depth));
        assert_eq!("Magnitude".parse::<Basis>(), Ok(Basis::Magnitude));
        assert_eq!("mag".parse::<Basis>(), Ok(Basis::Magnitude));
        assert!("colour".parse::<Basis>().is_err());
        assert_eq!(Basis::Depth.toggled(), Basis::Magnitude);
    }
}

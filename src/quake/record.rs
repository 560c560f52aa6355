use geojson::{feature::Id, Feature, JsonObject, Value};
use thiserror::Error;

use crate::geo::LonLatDepth;

/// One earthquake as read from a feed feature. Read-only after parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct EarthquakeRecord {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: Option<f64>,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    pub time_millis: Option<i64>,
    pub info_url: Option<String>,
}

/// Why a single feature could not become a record
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("expected Point geometry, got {0}")]
    NotAPoint(&'static str),
    #[error("point has {0} coordinate(s), need at least 2")]
    ShortCoordinates(usize),
}

impl EarthquakeRecord {
    /// Build a record from a feed feature. `index` is the feature's
    /// position in the collection, used as the id when the feature has none.
    pub fn from_feature(feature: &Feature, index: usize) -> Result<Self, FeatureError> {
        let geometry = feature.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;
        let coords = match &geometry.value {
            Value::Point(coords) => coords,
            other => return Err(FeatureError::NotAPoint(geometry_kind(other))),
        };
        let pos = LonLatDepth::from_position(coords)
            .ok_or(FeatureError::ShortCoordinates(coords.len()))?;

        let props = feature.properties.as_ref();

        let id = match &feature.id {
            Some(Id::String(s)) => s.clone(),
            Some(Id::Number(n)) => n.to_string(),
            None => format!("#{index}"),
        };

        Ok(Self {
            id,
            longitude: pos.lon,
            latitude: pos.lat,
            depth_km: pos.depth,
            magnitude: number(props, "mag"),
            place: text(props, "place"),
            time_millis: props
                .and_then(|p| p.get("time"))
                .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))),
            info_url: text(props, "url"),
        })
    }

    /// Position as `[lon, lat, depth]`, the feed's own ordering
    pub fn position(&self) -> LonLatDepth {
        LonLatDepth {
            lon: self.longitude,
            lat: self.latitude,
            depth: self.depth_km,
        }
    }
}

fn number(props: Option<&JsonObject>, key: &str) -> Option<f64> {
    props
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}

fn text(props: Option<&JsonObject>, key: &str) -> Option<String> {
    props
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn feature(json: &str) -> Feature {
        match json.parse::<GeoJson>().unwrap() {
            GeoJson::Feature(f) => f,
            _ => panic!("not a feature"),
        }
    }

    #[test]
    fn test_full_feature() {
        let f = feature(
            r#"{"type":"Feature","id":"us7000abcd",
                "geometry":{"type":"Point","coordinates":[142.3,38.1,35.4]},
                "properties":{"mag":7.2,"place":"off the east coast of Honshu",
                              "time":1700000000000,"url":"https://example.org/q"}}"#,
        );
        let r = EarthquakeRecord::from_feature(&f, 0).unwrap();
        assert_eq!(r.id, "us7000abcd");
        assert_eq!(r.longitude, 142.3);
        assert_eq!(r.latitude, 38.1);
        assert_eq!(r.depth_km, Some(35.4));
        assert_eq!(r.magnitude, Some(7.2));
        assert_eq!(r.place.as_deref(), Some("off the east coast of Honshu"));
        assert_eq!(r.time_millis, Some(1_700_000_000_000));
        assert_eq!(r.info_url.as_deref(), Some("https://example.org/q"));
    }

    #[test]
    fn test_null_properties() {
        let f = feature(
            r#"{"type":"Feature",
                "geometry":{"type":"Point","coordinates":[-150.0,61.0]},
                "properties":{"mag":null,"place":null,"time":null,"url":""}}"#,
        );
        let r = EarthquakeRecord::from_feature(&f, 4).unwrap();
        assert_eq!(r.id, "#4");
        assert_eq!(r.depth_km, None);
        assert_eq!(r.magnitude, None);
        assert_eq!(r.place, None);
        assert_eq!(r.time_millis, None);
        assert_eq!(r.info_url, None);
    }

    #[test]
    fn test_missing_geometry() {
        let f = feature(r#"{"type":"Feature","geometry":null,"properties":{"mag":1.0}}"#);
        assert_eq!(
            EarthquakeRecord::from_feature(&f, 0),
            Err(FeatureError::MissingGeometry)
        );
    }

    #[test]
    fn test_wrong_geometry() {
        let f = feature(
            r#"{"type":"Feature",
                "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},
                "properties":{}}"#,
        );
        assert_eq!(
            EarthquakeRecord::from_feature(&f, 0),
            Err(FeatureError::NotAPoint("LineString"))
        );
    }

    #[test]
    fn test_position_keeps_feed_order() {
        let f = feature(
            r#"{"type":"Feature",
                "geometry":{"type":"Point","coordinates":[10.0,20.0,5.0]},
                "properties":{}}"#,
        );
        let p = EarthquakeRecord::from_feature(&f, 0).unwrap().position();
        assert_eq!((p.lon, p.lat, p.depth), (10.0, 20.0, Some(5.0)));
    }
}

use crate::map::{BasemapRenderer, LineString, Lod};
use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Natural Earth coastline files, by LOD
const COASTLINE_FILES: [(&str, Lod); 4] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("natural-earth.json", Lod::Medium),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

/// Natural Earth country border files, by LOD
const BORDER_FILES: [(&str, Lod); 3] = [
    ("ne_110m_borders.json", Lod::Low),
    ("ne_50m_borders.json", Lod::Medium),
    ("ne_10m_borders.json", Lod::High),
];

/// Load whatever basemap GeoJSON exists in `data_dir`. Missing files are
/// skipped; unreadable ones are logged and skipped.
pub fn load_basemap(renderer: &mut BasemapRenderer, data_dir: &Path) {
    if !data_dir.exists() {
        debug!("No basemap directory at {:?}", data_dir);
        return;
    }

    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if path.exists() {
            match load_lines(&path) {
                Ok(lines) => {
                    info!("Loaded {} coastline segments from {}", lines.len(), filename);
                    lines.into_iter().for_each(|l| renderer.add_coastline(l, lod));
                }
                Err(e) => warn!("Failed to load {}: {}", filename, e),
            }
        }
    }

    for (filename, lod) in BORDER_FILES {
        let path = data_dir.join(filename);
        if path.exists() {
            match load_lines(&path) {
                Ok(lines) => {
                    info!("Loaded {} border segments from {}", lines.len(), filename);
                    lines.into_iter().for_each(|l| renderer.add_border(l, lod));
                }
                Err(e) => warn!("Failed to load {}: {}", filename, e),
            }
        }
    }
}

/// Read a GeoJSON file and flatten it into lines
fn load_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    collect_lines(&geojson, &mut lines);
    Ok(lines)
}

/// Extract line features; polygons contribute their exterior ring
fn collect_lines(geojson: &GeoJson, out: &mut Vec<LineString>) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_geometry_lines(geometry, out);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                collect_geometry_lines(geometry, out);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry_lines(geometry, out),
    }
}

fn collect_geometry_lines(geometry: &Geometry, out: &mut Vec<LineString>) {
    let to_line = |coords: &[Vec<f64>]| -> LineString {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_line(l))),
        Value::Polygon(rings) => out.extend(rings.first().map(|r| to_line(r))),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| rings.first()).map(|r| to_line(r)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry_lines(g, out);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}

/// Coarse continent outlines, used when no basemap data is available
pub fn generate_simple_world(renderer: &mut BasemapRenderer) {
    const OUTLINES: [&[(f64, f64)]; 7] = [
        // North America
        &[
            (-166.0, 68.0), (-164.0, 60.0), (-150.0, 59.0), (-135.0, 57.0),
            (-124.0, 47.0), (-124.0, 40.0), (-117.0, 32.0), (-109.0, 23.0),
            (-97.0, 18.0), (-87.0, 15.0), (-83.0, 9.0), (-80.0, 8.0),
            (-83.0, 15.0), (-88.0, 21.0), (-97.0, 26.0), (-90.0, 30.0),
            (-82.0, 25.0), (-81.0, 31.0), (-76.0, 35.0), (-70.0, 42.0),
            (-60.0, 46.0), (-56.0, 52.0), (-64.0, 60.0), (-78.0, 62.0),
            (-94.0, 60.0), (-95.0, 68.0), (-120.0, 70.0), (-141.0, 70.0),
            (-166.0, 68.0),
        ],
        // South America
        &[
            (-80.0, 8.0), (-72.0, 12.0), (-62.0, 10.0), (-51.0, 4.0),
            (-35.0, -6.0), (-39.0, -14.0), (-42.0, -23.0), (-53.0, -34.0),
            (-62.0, -39.0), (-66.0, -47.0), (-69.0, -55.0), (-75.0, -50.0),
            (-73.0, -37.0), (-71.0, -18.0), (-81.0, -5.0), (-80.0, 8.0),
        ],
        // Europe
        &[
            (-9.0, 37.0), (-1.0, 37.0), (3.0, 43.0), (12.0, 44.0),
            (19.0, 40.0), (24.0, 36.0), (29.0, 41.0), (40.0, 45.0),
            (42.0, 56.0), (32.0, 61.0), (27.0, 71.0), (15.0, 69.0),
            (5.0, 61.0), (8.0, 54.0), (-2.0, 49.0), (-9.0, 43.0),
            (-9.0, 37.0),
        ],
        // Africa
        &[
            (-17.0, 21.0), (-10.0, 30.0), (-6.0, 36.0), (10.0, 37.0),
            (20.0, 32.0), (32.0, 31.0), (43.0, 12.0), (51.0, 11.0),
            (40.0, -3.0), (40.0, -15.0), (33.0, -27.0), (20.0, -35.0),
            (17.0, -29.0), (12.0, -17.0), (9.0, -1.0), (9.0, 4.0),
            (-8.0, 4.0), (-17.0, 14.0), (-17.0, 21.0),
        ],
        // Asia
        &[
            (40.0, 45.0), (52.0, 42.0), (57.0, 25.0), (67.0, 24.0),
            (73.0, 18.0), (78.0, 8.0), (82.0, 16.0), (91.0, 22.0),
            (98.0, 16.0), (104.0, 9.0), (109.0, 12.0), (108.0, 21.0),
            (121.0, 30.0), (122.0, 40.0), (129.0, 35.0), (130.0, 43.0),
            (141.0, 53.0), (160.0, 60.0), (180.0, 67.0), (140.0, 72.0),
            (105.0, 77.0), (70.0, 73.0), (55.0, 68.0), (42.0, 56.0),
        ],
        // Australia
        &[
            (114.0, -22.0), (123.0, -17.0), (131.0, -11.0), (137.0, -12.0),
            (142.0, -11.0), (146.0, -19.0), (153.0, -26.0), (150.0, -37.0),
            (141.0, -38.0), (135.0, -34.0), (124.0, -34.0), (115.0, -34.0),
            (114.0, -22.0),
        ],
        // Japan
        &[
            (130.0, 31.0), (135.0, 34.0), (140.0, 35.0), (142.0, 40.0),
            (141.0, 45.0), (140.0, 40.0), (136.0, 37.0), (130.0, 34.0),
            (130.0, 31.0),
        ],
    ];

    for outline in OUTLINES {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_polygon_and_lines() {
        let geojson: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]],[[0.2,0.2],[0.3,0.2],[0.2,0.3],[0.2,0.2]]]}},
            {"type":"Feature","properties":{},
             "geometry":{"type":"MultiLineString","coordinates":[[[0,0],[1,1]],[[2,2],[3,3]]]}},
            {"type":"Feature","properties":{},
             "geometry":{"type":"Point","coordinates":[5,5]}}
        ]}"#
        .parse()
        .unwrap();

        let mut lines = Vec::new();
        collect_lines(&geojson, &mut lines);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[2], vec![(2.0, 2.0), (3.0, 3.0)]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let mut renderer = BasemapRenderer::new();
        load_basemap(&mut renderer, Path::new("/nonexistent/quake-map-data"));
        assert!(!renderer.has_data());
    }

    #[test]
    fn test_simple_world_has_data() {
        let mut renderer = BasemapRenderer::new();
        generate_simple_world(&mut renderer);
        assert!(renderer.has_data());
    }
}

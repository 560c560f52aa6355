use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_line;
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for basemap data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Basemap layers rasterised for one frame, one canvas per colour
pub struct BasemapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
}

/// Coastlines and country borders underneath the earthquake markers
pub struct BasemapRenderer {
    coastlines: [Vec<LineString>; 3],
    borders: [Vec<LineString>; 3],
    pub show_borders: bool,
}

impl BasemapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines: Default::default(),
            borders: Default::default(),
            show_borders: true,
        }
    }

    /// Best available lines for a LOD: the requested level, else the next
    /// coarser one, else the nearest finer one
    fn lines_for(layers: &[Vec<LineString>; 3], lod: Lod) -> &[LineString] {
        let wanted = lod as usize;
        (0..=wanted)
            .rev()
            .chain(wanted + 1..layers.len())
            .map(|i| &layers[i])
            .find(|lines| !lines.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rasterise the basemap for a viewport of `width` x `height` character cells
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport) -> BasemapLayers {
        let lod = Lod::from_zoom(viewport.zoom);
        let mut layers = BasemapLayers {
            coastlines: BrailleCanvas::new(width, height),
            borders: BrailleCanvas::new(width, height),
        };

        for line in Self::lines_for(&self.coastlines, lod) {
            draw_linestring(&mut layers.coastlines, line, viewport);
        }

        if self.show_borders {
            for line in Self::lines_for(&self.borders, lod) {
                draw_linestring(&mut layers.borders, line, viewport);
            }
        }

        layers
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        self.coastlines[lod as usize].push(line);
    }

    pub fn add_border(&mut self, line: LineString, lod: Lod) {
        self.borders[lod as usize].push(line);
    }

    /// Check if any coastline data is loaded
    pub fn has_data(&self) -> bool {
        self.coastlines.iter().any(|lines| !lines.is_empty())
    }

    pub fn toggle_borders(&mut self) {
        self.show_borders = !self.show_borders;
    }
}

impl Default for BasemapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            // Skip segments that wrap across the antimeridian
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

mod geometry;
mod markers;
mod projection;
mod renderer;

pub use markers::{hit_test, render_markers, to_color};
pub use projection::{cell_to_pixel, Viewport};
pub use renderer::{BasemapLayers, BasemapRenderer, LineString, Lod};

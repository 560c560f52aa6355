use quake_map::quake::{Marker, Rgb};
use ratatui::style::Color;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_ring};
use crate::map::projection::Viewport;

/// Braille pixels per unit of marker radius at zoom 1. Large enough that
/// the negative-magnitude radius (2) and the default radius (3) land on
/// different pixel sizes at the world view.
const MARKER_SCALE: f64 = 0.5;
const MAX_PIXEL_RADIUS: i32 = 48;
/// Markers up to this pixel radius are filled; larger ones are drawn as rings
const FILLED_MAX_RADIUS: i32 = 2;
/// Extra pixels around a marker that still count as hovering it
const HIT_SLACK: i32 = 1;

/// Marker radius in Braille pixels at the given zoom
pub fn pixel_radius(radius: f64, zoom: f64) -> i32 {
    ((radius * MARKER_SCALE * zoom.sqrt()).round() as i32).clamp(1, MAX_PIXEL_RADIUS)
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Rasterise markers in order, so later markers paint over earlier ones
pub fn render_markers(
    markers: &[Marker],
    width: usize,
    height: usize,
    viewport: &Viewport,
) -> BrailleCanvas {
    let mut canvas = BrailleCanvas::new(width, height);

    for marker in markers {
        let (px, py) = viewport.project(marker.lon, marker.lat);
        let r = pixel_radius(marker.radius, viewport.zoom);
        if !viewport.circle_might_be_visible(px, py, r) {
            continue;
        }

        canvas.set_pen(Some(to_color(marker.fill)));
        if r <= FILLED_MAX_RADIUS {
            draw_circle(&mut canvas, px, py, r);
        } else {
            draw_ring(&mut canvas, px, py, r);
        }
    }

    canvas
}

/// Index of the topmost marker under a Braille pixel position
pub fn hit_test(markers: &[Marker], viewport: &Viewport, px: i32, py: i32) -> Option<usize> {
    markers.iter().enumerate().rev().find_map(|(idx, marker)| {
        let (mx, my) = viewport.project(marker.lon, marker.lat);
        let reach = i64::from(pixel_radius(marker.radius, viewport.zoom) + HIT_SLACK);
        // Projected offsets reach tens of thousands of pixels at high zoom
        let (dx, dy) = (i64::from(px) - i64::from(mx), i64::from(py) - i64::from(my));
        if dx.abs() > reach || dy.abs() > reach {
            return None;
        }
        (dx * dx + dy * dy <= reach * reach).then_some(idx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(lon: f64, lat: f64, radius: f64, hex: u32) -> Marker {
        Marker {
            lat,
            lon,
            radius,
            fill: Rgb::from_hex(hex),
        }
    }

    #[test]
    fn test_pixel_radius() {
        assert_eq!(pixel_radius(3.0, 1.0), 2);
        assert_eq!(pixel_radius(25.92, 1.0), 13);
        assert_eq!(pixel_radius(25.92, 4.0), 26);
        assert_eq!(pixel_radius(0.1, 1.0), 1);
        assert_eq!(pixel_radius(1e6, 100.0), MAX_PIXEL_RADIUS);
    }

    #[test]
    fn test_negative_magnitude_smaller_than_default_at_world_view() {
        use quake_map::quake::radius_for;
        use quake_map::quake::scale::{DEFAULT_RADIUS, NEGATIVE_RADIUS};

        assert!(pixel_radius(NEGATIVE_RADIUS, 1.0) < pixel_radius(DEFAULT_RADIUS, 1.0));
        assert_eq!(
            pixel_radius(radius_for(Some(-0.5)), 1.0),
            pixel_radius(NEGATIVE_RADIUS, 1.0)
        );
        assert_eq!(pixel_radius(radius_for(None), 1.0), pixel_radius(DEFAULT_RADIUS, 1.0));
    }

    #[test]
    fn test_hit_far_marker_at_high_zoom() {
        // Zoomed in over Fiji on a wide terminal; an Aleutian event
        // projects tens of thousands of pixels off screen
        let viewport = Viewport::new(178.0, -18.0, 100.0, 496, 200);
        let markers = [marker(-179.0, 52.0, 3.0, 0xffffff)];
        let (mx, my) = viewport.project(-179.0, 52.0);
        assert!(mx.abs() > 10_000 || my.abs() > 10_000);

        assert_eq!(hit_test(&markers, &viewport, 248, 100), None);
        assert_eq!(hit_test(&markers, &viewport, mx, my), Some(0));
    }

    #[test]
    fn test_hit_prefers_topmost() {
        let viewport = Viewport::new(0.0, 0.0, 1.0, 200, 100);
        let markers = [
            marker(0.0, 0.0, 40.0, 0xff0000),
            marker(0.0, 0.0, 3.0, 0x00ff00),
        ];
        let (px, py) = viewport.project(0.0, 0.0);
        assert_eq!(hit_test(&markers, &viewport, px, py), Some(1));
        // Inside only the big marker
        assert_eq!(hit_test(&markers, &viewport, px + 8, py), Some(0));
        assert_eq!(hit_test(&markers, &viewport, px + 40, py), None);
    }

    #[test]
    fn test_markers_take_fill_colour() {
        let viewport = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let markers = [marker(0.0, 0.0, 3.0, 0xfdbb84)];
        let canvas = render_markers(&markers, 20, 10, &viewport);
        // (0, 0) projects to pixel (20, 20), cell (10, 5)
        let (_, color) = canvas.cell(10, 5).unwrap();
        assert_eq!(color, Some(Color::Rgb(0xfd, 0xbb, 0x84)));
    }

    #[test]
    fn test_offscreen_markers_skipped() {
        let viewport = Viewport::new(0.0, 0.0, 4.0, 40, 40);
        let markers = [marker(170.0, 0.0, 3.0, 0xffffff)];
        let canvas = render_markers(&markers, 20, 10, &viewport);
        assert!((0..10).all(|row| (0..20).all(|col| canvas.cell(col, row).is_none())));
    }
}

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use log::{error, info};
use quake_map::quake::{
    feed, Basis, EarthquakeRecord, FeedBatch, FeedError, FeedSource, LegendEntry, Marker,
};

use crate::map::{cell_to_pixel, hit_test, BasemapRenderer, Lod, Viewport};

/// Where the current feed load stands
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed {
        message: String,
        hint: Option<&'static str>,
    },
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub basemap: BasemapRenderer,
    pub basis: Basis,
    pub source: FeedSource,
    pub feed_title: String,
    timeout: Duration,
    pending: Option<Receiver<Result<FeedBatch, FeedError>>>,
    pub load_state: LoadState,
    pub records: Vec<EarthquakeRecord>,
    /// One marker per record, same order
    pub markers: Vec<Marker>,
    pub legend: Vec<LegendEntry>,
    pub skipped: usize,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current left-button press has moved
    dragged: bool,
    /// Current mouse position for cursor marker and hover
    pub mouse_pos: Option<(u16, u16)>,
    /// Record whose tooltip stays open after a click
    pub pinned: Option<usize>,
}

impl App {
    pub fn new(
        width: usize,
        height: usize,
        source: FeedSource,
        feed_title: String,
        basis: Basis,
        timeout: Duration,
    ) -> Self {
        let (pixel_width, pixel_height) = map_pixels(width, height);

        Self {
            viewport: Viewport::world(pixel_width, pixel_height),
            basemap: BasemapRenderer::new(),
            basis,
            source,
            feed_title,
            timeout,
            pending: None,
            load_state: LoadState::Loading,
            records: Vec::new(),
            markers: Vec::new(),
            legend: basis.scale().legend(),
            skipped: 0,
            should_quit: false,
            last_mouse: None,
            dragged: false,
            mouse_pos: None,
            pinned: None,
        }
    }

    /// Start a background feed load. Ignored while one is in flight.
    pub fn request_load(&mut self) {
        if self.pending.is_some() {
            info!("Feed load already in progress");
            return;
        }

        let (tx, rx) = mpsc::channel();
        let source = self.source.clone();
        let timeout = self.timeout;
        thread::spawn(move || {
            let _ = tx.send(feed::load(&source, timeout));
        });

        self.pending = Some(rx);
        self.load_state = LoadState::Loading;
    }

    /// Pick up a finished load, if any. Returns true when state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.apply_load(result);
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                error!("Feed loader exited without a result");
                self.pending = None;
                self.load_state = LoadState::Failed {
                    message: "feed loader exited without a result".to_string(),
                    hint: None,
                };
            }
        }
        true
    }

    /// Install a load result. A failure clears the previous data.
    pub fn apply_load(&mut self, result: Result<FeedBatch, FeedError>) {
        match result {
            Ok(batch) => {
                info!(
                    "Loaded {} earthquakes ({} skipped)",
                    batch.records.len(),
                    batch.skipped.len()
                );
                if let Some(title) = batch.title {
                    self.feed_title = title;
                }
                self.skipped = batch.skipped.len();
                self.records = batch.records;
                self.pinned = None;
                self.rebuild_markers();
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                error!("Feed load failed: {}", e);
                self.records.clear();
                self.markers.clear();
                self.skipped = 0;
                self.pinned = None;
                self.load_state = LoadState::Failed {
                    message: e.to_string(),
                    hint: e.hint(),
                };
            }
        }
    }

    fn rebuild_markers(&mut self) {
        self.markers = self
            .records
            .iter()
            .map(|r| Marker::for_record(r, self.basis))
            .collect();
        self.legend = self.basis.scale().legend();
    }

    /// Switch between depth and magnitude colouring
    pub fn toggle_basis(&mut self) {
        self.basis = self.basis.toggled();
        info!("Colour basis: {}", self.basis.label());
        self.rebuild_markers();
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = map_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Back to the world view, keeping loaded data
    pub fn reset_view(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
        self.pinned = None;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Esc closes a pinned tooltip first, then quits
    pub fn escape(&mut self) {
        if self.pinned.take().is_none() {
            self.quit();
        }
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }

    /// Left button pressed
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Mouse moved with the left button held
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    /// Left button released. A press without movement is a click, which
    /// pins the hovered marker's tooltip (or unpins on empty map).
    pub fn end_drag(&mut self) {
        if self.last_mouse.is_some() && !self.dragged {
            self.pinned = self.hovered();
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in Braille pixel coordinates
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// Index of the record under the mouse cursor
    pub fn hovered(&self) -> Option<usize> {
        let (px, py) = self.mouse_pixel_pos()?;
        hit_test(&self.markers, &self.viewport, px, py)
    }

    /// Record whose tooltip should be shown: hover wins over the pinned one
    pub fn tooltip_record(&self) -> Option<&EarthquakeRecord> {
        self.hovered()
            .or(self.pinned)
            .and_then(|idx| self.records.get(idx))
    }

    /// Count of features dropped from the last load, for the status bar
    pub fn skipped_note(&self) -> Option<String> {
        if self.skipped == 0 {
            return None;
        }
        Some(format!("{} skipped", self.skipped))
    }
}

/// Braille pixel size of the map area for a terminal of `width` x `height`
/// cells. Braille gives 2x4 resolution per character; the map border takes
/// two columns and the border plus status bar take three rows.
fn map_pixels(width: usize, height: usize) -> (usize, usize) {
    (width.saturating_sub(2) * 2, height.saturating_sub(3) * 4)
}

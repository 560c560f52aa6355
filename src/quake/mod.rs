//! Earthquake records and their visual encoding.

pub mod feed;
pub mod legend;
pub mod record;
pub mod scale;
pub mod tooltip;

pub use feed::{FeedBatch, FeedError, FeedPreset, FeedSource, SkippedFeature};
pub use legend::{build_legend, LegendEntry};
pub use record::{EarthquakeRecord, FeatureError};
pub use scale::{color_for, radius_for, Basis, ColorScale, Comparison, Marker, Rgb};
pub use tooltip::{format_tooltip, format_tooltip_in};

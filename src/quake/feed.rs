//! Fetching and decoding the earthquake feed.
//!
//! A load is one request (or one file read) followed by one parse. There is
//! no retry: a transport failure or a document without a `features` array
//! fails the whole load, while a bad individual feature is skipped and
//! reported in [`FeedBatch::skipped`].

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use geojson::{Feature, JsonValue};
use log::{debug, info, warn};
use thiserror::Error;

use crate::quake::record::EarthquakeRecord;

const USGS_SUMMARY_BASE: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// Where a feed document comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// `http(s)://` is fetched over the network; `file://` and anything
    /// else is treated as a local path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            FeedSource::Url(s.to_string())
        } else {
            let path = s.strip_prefix("file://").unwrap_or(s);
            FeedSource::File(PathBuf::from(path))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The USGS summary feeds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedPreset {
    AllHour,
    #[default]
    AllDay,
    AllWeek,
    M45Week,
    SignificantMonth,
}

impl FeedPreset {
    pub const ALL: [FeedPreset; 5] = [
        FeedPreset::AllHour,
        FeedPreset::AllDay,
        FeedPreset::AllWeek,
        FeedPreset::M45Week,
        FeedPreset::SignificantMonth,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            FeedPreset::AllHour => "all_hour",
            FeedPreset::AllDay => "all_day",
            FeedPreset::AllWeek => "all_week",
            FeedPreset::M45Week => "4.5_week",
            FeedPreset::SignificantMonth => "significant_month",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FeedPreset::AllHour => "All earthquakes, past hour",
            FeedPreset::AllDay => "All earthquakes, past day",
            FeedPreset::AllWeek => "All earthquakes, past week",
            FeedPreset::M45Week => "M4.5+ earthquakes, past week",
            FeedPreset::SignificantMonth => "Significant earthquakes, past month",
        }
    }

    pub fn url(self) -> String {
        format!("{USGS_SUMMARY_BASE}/{}.geojson", self.slug())
    }

    pub fn source(self) -> FeedSource {
        FeedSource::Url(self.url())
    }
}

impl FromStr for FeedPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        FeedPreset::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .or(match s.as_str() {
                "hour" => Some(FeedPreset::AllHour),
                "day" => Some(FeedPreset::AllDay),
                "week" => Some(FeedPreset::AllWeek),
                "significant" => Some(FeedPreset::SignificantMonth),
                _ => None,
            })
            .ok_or_else(|| {
                let known: Vec<&str> = FeedPreset::ALL.iter().map(|p| p.slug()).collect();
                format!("unknown feed '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// A load failure. Every variant aborts the current load.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{url} returned HTTP {code}")]
    Status { code: u16, url: String },
    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("failed reading response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("feed is not valid JSON: {0}")]
    Json(#[from] simd_json::Error),
    #[error("feed is not a GeoJSON FeatureCollection ({0})")]
    NotFeatureCollection(String),
    #[error("feed has no 'features' array")]
    MissingFeatures,
}

impl FeedError {
    /// Remediation text to show next to the error, when there is one
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FeedError::Status { code: 404, .. } => {
                Some("Check --feed-url; USGS summary feeds end in .geojson")
            }
            FeedError::Status { .. } => Some("The feed server reported an error; press 'u' to try again"),
            FeedError::Transport { .. } | FeedError::Body { .. } => Some(
                "Check network access, or pass a downloaded copy with --feed-url <path>",
            ),
            FeedError::Io { .. } => Some("Local feeds must be a readable GeoJSON file"),
            FeedError::Json(_) | FeedError::NotFeatureCollection(_) | FeedError::MissingFeatures => {
                Some("The source must be a GeoJSON FeatureCollection like the USGS summary feeds")
            }
        }
    }
}

/// A feature that was left out of the batch, and why
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: String,
}

/// The usable contents of one feed document, in feed order
#[derive(Clone, Debug, Default)]
pub struct FeedBatch {
    /// `metadata.title` when the feed provides one
    pub title: Option<String>,
    pub records: Vec<EarthquakeRecord>,
    pub skipped: Vec<SkippedFeature>,
}

/// Read the raw feed document
pub fn fetch(source: &FeedSource, timeout: Duration) -> Result<Vec<u8>, FeedError> {
    match source {
        FeedSource::File(path) => fs::read(path).map_err(|source| FeedError::Io {
            path: path.clone(),
            source,
        }),
        FeedSource::Url(url) => {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            let response = agent.get(url).call().map_err(|e| match e {
                ureq::Error::Status(code, _) => FeedError::Status {
                    code,
                    url: url.clone(),
                },
                ureq::Error::Transport(t) => FeedError::Transport {
                    url: url.clone(),
                    source: Box::new(t),
                },
            })?;

            let mut body = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut body)
                .map_err(|source| FeedError::Body {
                    url: url.clone(),
                    source,
                })?;
            Ok(body)
        }
    }
}

/// Decode a feed document. The buffer is parsed in place and left modified.
pub fn parse_feed(bytes: &mut [u8]) -> Result<FeedBatch, FeedError> {
    let value: JsonValue = simd_json::serde::from_slice(bytes)?;

    let JsonValue::Object(mut doc) = value else {
        return Err(FeedError::NotFeatureCollection("document is not an object".to_string()));
    };

    match doc.get("type").and_then(JsonValue::as_str) {
        Some("FeatureCollection") | None => {}
        Some(other) => return Err(FeedError::NotFeatureCollection(format!("type is {other}"))),
    }

    let features = match doc.remove("features") {
        Some(JsonValue::Array(items)) => items,
        _ => return Err(FeedError::MissingFeatures),
    };

    let title = doc
        .get("metadata")
        .and_then(|m| m.get("title"))
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    let mut batch = FeedBatch {
        title,
        records: Vec::with_capacity(features.len()),
        skipped: Vec::new(),
    };

    for (index, item) in features.into_iter().enumerate() {
        let parsed = Feature::try_from(item)
            .map_err(|e| e.to_string())
            .and_then(|f| EarthquakeRecord::from_feature(&f, index).map_err(|e| e.to_string()));

        match parsed {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!("Skipping feature {}: {}", index, reason);
                batch.skipped.push(SkippedFeature { index, reason });
            }
        }
    }

    debug!(
        "Parsed {} records, skipped {}",
        batch.records.len(),
        batch.skipped.len()
    );
    Ok(batch)
}

/// Fetch and decode in one step
pub fn load(source: &FeedSource, timeout: Duration) -> Result<FeedBatch, FeedError> {
    info!("Fetching feed from {}", source);
    let mut bytes = fetch(source, timeout)?;
    info!("Received {} bytes", bytes.len());
    parse_feed(&mut bytes)
}

use crate::models::{CatalogTrack, ChartEntry, DEFAULT_RELEASE_YEAR, FeatureVector};
use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ureq::Agent;

/// Reasons a catalog could not be loaded
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog HTTP error: {0}")]
    Http(String),

    #[error("Catalog contains no usable tracks: {0}")]
    Empty(String),
}

/// Anything that can produce the full track catalog
#[cfg_attr(test, mockall::automock)]
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> std::result::Result<Vec<CatalogTrack>, CatalogError>;

    /// Human readable location, used in logs
    fn describe(&self) -> String;
}

/// One row of the spreadsheet export. Audio features are on a 1-100 scale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCatalogRow {
    #[serde(rename = "Title")]
    pub title: Value,
    #[serde(rename = "Artist")]
    pub artist: Value,
    #[serde(rename = "Release")]
    pub release: Value,
    #[serde(rename = "BPM")]
    pub bpm: Value,
    #[serde(rename = "Energy")]
    pub energy: Value,
    #[serde(rename = "Dance")]
    pub dance: Value,
    #[serde(rename = "Valence")]
    pub valence: Value,
    #[serde(rename = "Acoustic")]
    pub acoustic: Value,
    #[serde(rename = "Loud")]
    pub loud: Value,
    #[serde(rename = "Pop.")]
    pub popularity: Value,
    #[serde(rename = "Instrumentalness")]
    pub instrumentalness: Value,
    #[serde(rename = "Speechiness")]
    pub speechiness: Value,
    #[serde(rename = "Spotify_ID")]
    pub spotify_id: Value,
    #[serde(rename = "Album_Name")]
    pub album_name: Value,
    #[serde(rename = "Genre_1")]
    pub genre_1: Value,
    #[serde(rename = "Genre_2")]
    pub genre_2: Value,
    #[serde(rename = "Genre_3")]
    pub genre_3: Value,
    #[serde(rename = "Genres_All")]
    pub genres_all: Value,
    #[serde(rename = "Source")]
    pub source: Value,
    #[serde(rename = "Is_Current_Hit")]
    pub is_current_hit: Value,
}

/// Read a spreadsheet cell as trimmed text
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Read a spreadsheet cell as a number, accepting numeric strings with trailing text
fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse::<f64>().ok()
        }
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Number from a cell where zero or missing falls back to `default`
fn nonzero_or(value: &Value, default: f64) -> f64 {
    match cell_number(value) {
        Some(n) if n != 0.0 => n,
        _ => default,
    }
}

fn cell_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    }
}

fn excel_serial_year(serial: f64) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.floor() as i64))?;
    Some(date.year())
}

fn plausible_year(year: f64) -> Option<i32> {
    (1900.0..=2030.0).contains(&year).then_some(year as i32)
}

/// Release year from a spreadsheet cell.
///
/// Accepts plain years, `YYYY-MM-DD`, `DD/MM/YYYY` (or `MM/DD/YYYY`) and Excel
/// serial dates. Anything else becomes [`DEFAULT_RELEASE_YEAR`].
pub fn parse_release_year(value: &Value) -> i32 {
    if let Value::String(s) = value {
        let s = s.trim();
        if s.contains('/') {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() == 3 {
                if let Some(year) = parts[2].trim().parse::<f64>().ok().and_then(plausible_year) {
                    return year;
                }
            }
        }
        if s.contains('-') && !s.starts_with('-') {
            if let Some(year) = s
                .split('-')
                .next()
                .and_then(|head| head.trim().parse::<f64>().ok())
                .and_then(plausible_year)
            {
                return year;
            }
        }
    }

    let Some(number) = cell_number(value) else {
        return DEFAULT_RELEASE_YEAR;
    };
    if let Some(year) = plausible_year(number) {
        return year;
    }
    if number > 15000.0 && number < 50000.0 {
        if let Some(year) = excel_serial_year(number) {
            return year;
        }
    }
    DEFAULT_RELEASE_YEAR
}

/// Instrumentalness guess for rows without a measured value
pub fn estimate_instrumentalness(genre_text: &str, acousticness: f64) -> f64 {
    let genres = genre_text.to_lowercase();

    if genres.contains("classical") || genres.contains("instrumental") {
        0.8
    } else if genres.contains("jazz") && acousticness > 0.6 {
        0.6
    } else if genres.contains("ambient") {
        0.7
    } else if acousticness > 0.8 {
        0.6
    } else if acousticness > 0.6 {
        0.3
    } else {
        0.05
    }
}

/// Speechiness guess for rows without a measured value
pub fn estimate_speechiness(genre_text: &str) -> f64 {
    let genres = genre_text.to_lowercase();

    if genres.contains("rap") || genres.contains("hip hop") {
        0.15
    } else if genres.contains("spoken word") {
        0.8
    } else {
        0.04
    }
}

impl RawCatalogRow {
    /// Convert to a catalog track on the 0-1 feature scale. Rows without title or artist yield `None`.
    pub fn into_track(self, row_number: usize) -> Option<CatalogTrack> {
        let title = cell_text(&self.title);
        let artist = cell_text(&self.artist);
        if title.is_empty() || artist.is_empty() {
            return None;
        }

        let genres_text = cell_text(&self.genres_all);
        let acousticness = cell_number(&self.acoustic).unwrap_or(0.0) / 100.0;
        let instrumentalness = match cell_number(&self.instrumentalness) {
            Some(n) if n != 0.0 => n,
            _ => estimate_instrumentalness(&genres_text, acousticness),
        };
        let speechiness = match cell_number(&self.speechiness) {
            Some(n) if n != 0.0 => n,
            _ => estimate_speechiness(&genres_text),
        };

        let spotify_id = cell_text(&self.spotify_id);
        let album = cell_text(&self.album_name);
        let source = cell_text(&self.source);
        let genres = [&self.genre_1, &self.genre_2, &self.genre_3]
            .into_iter()
            .map(cell_text)
            .filter(|genre| !genre.is_empty())
            .collect();

        Some(CatalogTrack {
            id: if spotify_id.is_empty() {
                format!("db_{row_number}")
            } else {
                spotify_id.clone()
            },
            title,
            artist,
            album: (!album.is_empty()).then_some(album),
            features: FeatureVector {
                tempo: nonzero_or(&self.bpm, 120.0),
                energy: cell_number(&self.energy).unwrap_or(0.0) / 100.0,
                acousticness,
                danceability: cell_number(&self.dance).unwrap_or(0.0) / 100.0,
                valence: cell_number(&self.valence).unwrap_or(0.0) / 100.0,
                instrumentalness,
                speechiness,
            },
            loudness: nonzero_or(&self.loud, -10.0),
            genres,
            genres_text,
            release_year: parse_release_year(&self.release),
            popularity: nonzero_or(&self.popularity, 50.0).round() as i32,
            has_enrichment_data: !spotify_id.is_empty(),
            source: if source.is_empty() {
                "catalog".to_string()
            } else {
                source
            },
            is_current_hit: cell_flag(&self.is_current_hit),
            catalog_index: row_number,
            ..Default::default()
        })
    }
}

/// Convert raw rows, numbering them from 1 in file order and dropping unusable rows
pub fn convert_rows(rows: Vec<RawCatalogRow>) -> Vec<CatalogTrack> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| row.into_track(index + 1))
        .collect()
}

fn parse_catalog(text: &str, origin: &str) -> std::result::Result<Vec<CatalogTrack>, CatalogError> {
    let rows: Vec<RawCatalogRow> = serde_json::from_str(text)?;
    let row_count = rows.len();
    let tracks = convert_rows(rows);

    if tracks.is_empty() {
        return Err(CatalogError::Empty(origin.to_string()));
    }

    let enriched = tracks.iter().filter(|t| t.has_enrichment_data).count();
    info!(
        "Loaded {} tracks from {} ({} rows, {} enriched, {}%)",
        tracks.len(),
        origin,
        row_count,
        enriched,
        enriched * 100 / tracks.len()
    );
    if row_count > tracks.len() {
        warn!("Skipped {} rows without title or artist", row_count - tracks.len());
    }
    Ok(tracks)
}

/// Catalog exported as a JSON array of spreadsheet rows
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileCatalog { path: path.into() }
    }
}

impl CatalogSource for JsonFileCatalog {
    fn load(&self) -> std::result::Result<Vec<CatalogTrack>, CatalogError> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_catalog(&content, &self.describe())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog served as JSON rows over HTTP
pub struct HttpCatalog {
    agent: Agent,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        HttpCatalog {
            agent: Agent::new(),
            url: url.into(),
        }
    }
}

impl CatalogSource for HttpCatalog {
    fn load(&self) -> std::result::Result<Vec<CatalogTrack>, CatalogError> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        let response_text = response.into_string()?;
        parse_catalog(&response_text, &self.url)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Load a reference popularity chart (JSON list of `{position, artist, title, year}`)
pub fn load_reference_chart(path: &Path) -> Result<Vec<ChartEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reference chart {}", path.display()))?;
    let entries: Vec<ChartEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reference chart {}", path.display()))?;
    info!("Loaded {} reference chart entries", entries.len());
    Ok(entries)
}

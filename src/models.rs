use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower and upper bounds for blended tempo targets (BPM)
pub const TEMPO_RANGE: (f64, f64) = (45.0, 160.0);
/// Lower and upper bounds for every unit-interval feature after blending
pub const UNIT_FEATURE_RANGE: (f64, f64) = (0.02, 0.98);
/// Release year assumed when a catalog row carries no usable date
pub const DEFAULT_RELEASE_YEAR: i32 = 2015;

/// One scored audio dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Tempo,
    Energy,
    Acousticness,
    Danceability,
    Valence,
    Instrumentalness,
    Speechiness,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Tempo,
        Feature::Energy,
        Feature::Acousticness,
        Feature::Danceability,
        Feature::Valence,
        Feature::Instrumentalness,
        Feature::Speechiness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Tempo => "tempo",
            Feature::Energy => "energy",
            Feature::Acousticness => "acousticness",
            Feature::Danceability => "danceability",
            Feature::Valence => "valence",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Speechiness => "speechiness",
        }
    }
}

/// Audio feature targets (or measurements). Tempo in BPM, everything else on [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub tempo: f64,
    pub energy: f64,
    pub acousticness: f64,
    pub danceability: f64,
    pub valence: f64,
    pub instrumentalness: f64,
    pub speechiness: f64,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Tempo => self.tempo,
            Feature::Energy => self.energy,
            Feature::Acousticness => self.acousticness,
            Feature::Danceability => self.danceability,
            Feature::Valence => self.valence,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Speechiness => self.speechiness,
        }
    }

    pub fn get_mut(&mut self, feature: Feature) -> &mut f64 {
        match feature {
            Feature::Tempo => &mut self.tempo,
            Feature::Energy => &mut self.energy,
            Feature::Acousticness => &mut self.acousticness,
            Feature::Danceability => &mut self.danceability,
            Feature::Valence => &mut self.valence,
            Feature::Instrumentalness => &mut self.instrumentalness,
            Feature::Speechiness => &mut self.speechiness,
        }
    }

    /// Round tempo to a whole BPM and pull every dimension into its valid range
    pub fn clamped(mut self) -> Self {
        self.tempo = self.tempo.round().clamp(TEMPO_RANGE.0, TEMPO_RANGE.1);
        for feature in Feature::ALL.into_iter().filter(|f| *f != Feature::Tempo) {
            let value = self.get_mut(feature);
            *value = value.clamp(UNIT_FEATURE_RANGE.0, UNIT_FEATURE_RANGE.1);
        }
        self
    }

    /// Short one-line summary used in reasoning logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "T:{}BPM E:{:.1} A:{:.1} D:{:.1} V:{:.1}",
            self.tempo,
            self.energy * 10.0,
            self.acousticness * 10.0,
            self.danceability * 10.0,
            self.valence * 10.0
        )
    }
}

/// A partial feature vector of additive adjustments.
///
/// Lookups of absent features read as zero, so repeated accumulation from
/// several tables behaves like a sparse sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureDeltas(BTreeMap<Feature, f64>);

impl FeatureDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(Feature, f64)]) -> Self {
        let mut deltas = Self::new();
        for &(feature, delta) in pairs {
            deltas.add(feature, delta);
        }
        deltas
    }

    pub fn add(&mut self, feature: Feature, delta: f64) {
        *self.0.entry(feature).or_insert(0.0) += delta;
    }

    pub fn merge(&mut self, other: &FeatureDeltas) {
        for (feature, delta) in other.iter() {
            self.add(feature, delta);
        }
    }

    pub fn get_or_default(&self, feature: Feature) -> f64 {
        self.0.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(feature, delta)| (*feature, *delta))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A track from the music catalog, with features already on the 0-1 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub features: FeatureVector,
    pub loudness: f64, // dB, carried through but never scored
    pub genres: Vec<String>, // Primary genres (up to three)
    pub genres_text: String, // Free-text comma separated genre list
    pub release_year: i32,
    pub popularity: i32,
    pub has_enrichment_data: bool,
    pub source: String,
    #[serde(default)]
    pub is_current_hit: bool,
    pub catalog_index: usize,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default = "default_year_boost")]
    pub year_boost: f64,
    #[serde(default)]
    pub cultural_match: bool,
}

fn default_year_boost() -> f64 {
    1.0
}

impl CatalogTrack {
    /// All genre labels for this track: primary genres plus the free-text list, lowercased
    pub fn all_genres(&self) -> Vec<String> {
        let mut all_genres: Vec<String> = self
            .genres
            .iter()
            .map(String::as_str)
            .chain(self.genres_text.split(','))
            .map(|genre| genre.trim().to_lowercase())
            .filter(|genre| !genre.is_empty())
            .collect();

        all_genres.sort();
        all_genres.dedup();
        all_genres
    }

    /// Lowercased genre text used for keyword containment checks
    pub fn genre_text(&self) -> String {
        let mut text = self.genres.join(", ");
        if !self.genres_text.is_empty() {
            if !text.is_empty() {
                text.push_str(", ");
            }
            text.push_str(&self.genres_text);
        }
        text.to_lowercase()
    }
}

impl Default for CatalogTrack {
    fn default() -> Self {
        CatalogTrack {
            id: String::new(),
            title: "Unknown".to_string(),
            artist: "Unknown".to_string(),
            album: None,
            features: FeatureVector {
                tempo: 120.0,
                energy: 0.5,
                acousticness: 0.5,
                danceability: 0.5,
                valence: 0.5,
                instrumentalness: 0.05,
                speechiness: 0.04,
            },
            loudness: -10.0,
            genres: Vec::new(),
            genres_text: String::new(),
            release_year: DEFAULT_RELEASE_YEAR,
            popularity: 50,
            has_enrichment_data: false,
            source: String::new(),
            is_current_hit: false,
            catalog_index: 0,
            match_score: 0.0,
            year_boost: 1.0,
            cultural_match: false,
        }
    }
}

/// One entry of a reference popularity chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEntry {
    pub position: u32,
    pub artist: String,
    pub title: String,
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamped_rounds_tempo_and_bounds_unit_features() {
        let raw = FeatureVector {
            tempo: 171.6,
            energy: -0.3,
            acousticness: 1.4,
            danceability: 0.5,
            valence: 0.99,
            instrumentalness: 0.01,
            speechiness: 0.05,
        };

        let clamped = raw.clamped();
        assert_relative_eq!(clamped.tempo, 160.0);
        assert_relative_eq!(clamped.energy, 0.02);
        assert_relative_eq!(clamped.acousticness, 0.98);
        assert_relative_eq!(clamped.danceability, 0.5);
        assert_relative_eq!(clamped.valence, 0.98);
        assert_relative_eq!(clamped.instrumentalness, 0.02);

        let slow = FeatureVector { tempo: 40.4, ..raw }.clamped();
        assert_relative_eq!(slow.tempo, 45.0);
    }

    #[test]
    fn test_feature_deltas_accumulate_with_zero_default() {
        let mut deltas = FeatureDeltas::from_pairs(&[(Feature::Energy, 0.1), (Feature::Tempo, 8.0)]);
        deltas.merge(&FeatureDeltas::from_pairs(&[(Feature::Energy, -0.15)]));

        assert_relative_eq!(deltas.get_or_default(Feature::Energy), -0.05, epsilon = 1e-12);
        assert_relative_eq!(deltas.get_or_default(Feature::Tempo), 8.0);
        assert_relative_eq!(deltas.get_or_default(Feature::Valence), 0.0);
    }

    #[test]
    fn test_all_genres_combines_primary_and_text() {
        let track = CatalogTrack {
            genres: vec!["Chanson".to_string(), "French Jazz".to_string()],
            genres_text: "chanson, french jazz, nouvelle chanson".to_string(),
            ..Default::default()
        };

        assert_eq!(
            track.all_genres(),
            vec!["chanson", "french jazz", "nouvelle chanson"]
        );
        assert!(track.genre_text().contains("nouvelle chanson"));
        assert!(track.genre_text().starts_with("chanson, french jazz"));
    }
}

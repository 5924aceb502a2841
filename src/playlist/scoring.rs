use crate::models::{CatalogTrack, ChartEntry, FeatureVector};
use crate::profile::YearPreference;
use crate::profile::years::{calculate_year_boost, calculate_year_score};
use chrono::Datelike;

/// Match quality reported for an empty playlist
pub const EMPTY_PLAYLIST_QUALITY: u8 = 94;
/// Maximum relative boost for tracks found on the reference chart
pub const CHART_BOOST_MAX: f64 = 0.2;

fn closeness(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs()).max(0.0)
}

fn tempo_closeness(track_bpm: f64, target_bpm: f64) -> f64 {
    (1.0 - (track_bpm - target_bpm).abs() / 100.0).max(0.0)
}

/// Scoring and calculation functionality
pub struct TrackScoring;

impl TrackScoring {
    /// Hospitality-weighted closeness of a track to the target features, in [0, 1]
    pub fn hospitality_match_score(track: &FeatureVector, target: &FeatureVector) -> f64 {
        let mut score = 0.0;
        let mut weights = 0.0;

        score += closeness(track.acousticness, target.acousticness) * 0.35;
        weights += 0.35;

        // Positive tracks get a small bonus
        let mut valence_score = 1.0 - (track.valence - target.valence).abs();
        if track.valence > 0.6 {
            valence_score += 0.1;
        }
        score += valence_score.clamp(0.0, 1.0) * 0.30;
        weights += 0.30;

        score += closeness(track.energy, target.energy) * 0.20;
        weights += 0.20;

        // Very danceable tracks are penalized in a dining room
        let mut dance_score = 1.0 - (track.danceability - target.danceability).abs();
        if track.danceability > 0.7 {
            dance_score -= 0.2;
        }
        score += dance_score.max(0.0) * 0.10;
        weights += 0.10;

        if track.speechiness > 0.08 {
            score -= track.speechiness * 0.05;
        }
        weights += 0.05;

        (score / weights).max(0.0)
    }

    /// Audio plus release-year score used to rank search results.
    ///
    /// Audio carries 60% and year 40% when year scoring is active, otherwise audio alone.
    pub fn individual_track_score(
        track: &CatalogTrack,
        target: &FeatureVector,
        prefs: Option<&YearPreference>,
    ) -> f64 {
        let year_active = prefs.is_some_and(YearPreference::is_active);
        let (audio_weight, year_weight) = if year_active { (0.6, 0.4) } else { (1.0, 0.0) };

        let mut score = 0.0;
        let mut weight_sum = 0.0;
        let f = &track.features;

        if f.tempo > 0.0 && target.tempo > 0.0 {
            let weight = 0.3 * audio_weight;
            score += tempo_closeness(f.tempo, target.tempo) * weight;
            weight_sum += weight;
        }

        let weight = 0.25 * audio_weight;
        score += closeness(f.energy, target.energy) * weight;
        weight_sum += weight;

        let feature_weight = 0.45 * audio_weight / 4.0;
        for (value, goal) in [
            (f.acousticness, target.acousticness),
            (f.danceability, target.danceability),
            (f.valence, target.valence),
            (f.instrumentalness, target.instrumentalness),
        ] {
            score += closeness(value, goal) * feature_weight;
            weight_sum += feature_weight;
        }

        if year_active {
            score += calculate_year_boost(track.release_year, prefs) * year_weight;
            weight_sum += year_weight;
        }

        if weight_sum > 0.0 { score / weight_sum } else { 0.0 }
    }
}

fn normalize_for_chart(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Aggregate 0-100 quality of a finished playlist against its target profile
pub struct MatchQualityScorer {
    chart: Vec<ChartEntry>,
    current_year: i32,
}

impl MatchQualityScorer {
    pub fn new(chart: Vec<ChartEntry>) -> Self {
        Self::with_current_year(chart, chrono::Local::now().year())
    }

    pub fn with_current_year(chart: Vec<ChartEntry>, current_year: i32) -> Self {
        MatchQualityScorer { chart, current_year }
    }

    /// Step-function relevance of a track on the reference chart, 0 when absent
    pub fn chart_relevance(&self, artist: &str, title: &str) -> f64 {
        let artist = normalize_for_chart(artist);
        let title = normalize_for_chart(title);
        if artist.is_empty() || title.is_empty() {
            return 0.0;
        }

        let Some(entry) = self.chart.iter().find(|entry| {
            normalize_for_chart(&entry.artist).contains(&artist)
                && normalize_for_chart(&entry.title).contains(&title)
        }) else {
            return 0.0;
        };

        match entry.position {
            0..=10 => 0.98,
            11..=50 => 0.95,
            51..=100 => 0.9,
            101..=500 => 0.8,
            501..=1000 => 0.65,
            1001..=1500 => 0.5,
            _ => 0.35,
        }
    }

    fn track_score(&self, track: &CatalogTrack, target: &FeatureVector, prefs: Option<&YearPreference>) -> f64 {
        let active = prefs.filter(|p| p.is_active());
        let audio_weight = active.map_or(1.0, |p| (1.0 - p.recency_weight.abs()).abs());

        let mut score = 0.0;
        let mut weight_sum = 0.0;
        let f = &track.features;

        if f.tempo > 0.0 && target.tempo > 0.0 {
            let weight = 0.3 * audio_weight;
            score += tempo_closeness(f.tempo, target.tempo) * weight;
            weight_sum += weight;
        }

        let weight = 0.25 * audio_weight;
        score += closeness(f.energy, target.energy) * weight;
        weight_sum += weight;

        let feature_weight = 0.1125 * audio_weight;
        for (value, goal) in [
            (f.acousticness, target.acousticness),
            (f.danceability, target.danceability),
            (f.valence, target.valence),
            (f.instrumentalness, target.instrumentalness),
        ] {
            score += closeness(value, goal) * feature_weight;
            weight_sum += feature_weight;
        }

        if let Some(p) = active {
            let year_weight = p.recency_weight.abs();
            score += calculate_year_score(track.release_year, Some(p), self.current_year) * year_weight;
            weight_sum += year_weight;
        }

        let normalized = if weight_sum > 0.0 { score / weight_sum } else { 0.0 };
        normalized * (1.0 + CHART_BOOST_MAX * self.chart_relevance(&track.artist, &track.title))
    }

    /// Mean per-track quality as a 0-100 percentage
    pub fn score(&self, tracks: &[CatalogTrack], target: &FeatureVector, prefs: Option<&YearPreference>) -> u8 {
        if tracks.is_empty() {
            return EMPTY_PLAYLIST_QUALITY;
        }

        let total: f64 = tracks.iter().map(|t| self.track_score(t, target, prefs)).sum();
        let mean = total / tracks.len() as f64;
        (mean * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn target() -> FeatureVector {
        FeatureVector {
            tempo: 80.0,
            energy: 0.3,
            acousticness: 0.8,
            danceability: 0.3,
            valence: 0.5,
            instrumentalness: 0.5,
            speechiness: 0.03,
        }
    }

    fn track_with(features: FeatureVector) -> CatalogTrack {
        CatalogTrack {
            title: "Clair de Lune".to_string(),
            artist: "Test Ensemble".to_string(),
            features,
            ..Default::default()
        }
    }

    fn chart_entry(position: u32, artist: &str, title: &str) -> ChartEntry {
        ChartEntry {
            position,
            artist: artist.to_string(),
            title: title.to_string(),
            year: None,
        }
    }

    #[test]
    fn test_hospitality_score_perfect_match() {
        // the speechiness slot only ever subtracts, so a perfect match tops out at 0.95
        assert_relative_eq!(
            TrackScoring::hospitality_match_score(&target(), &target()),
            0.95,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_hospitality_score_penalties() {
        let loud = FeatureVector {
            danceability: 0.9,
            speechiness: 0.2,
            ..target()
        };
        // dance: (1 - 0.6 - 0.2) * 0.10 = 0.02, speech: -0.2 * 0.05 = -0.01
        let expected = 0.35 + 0.30 + 0.20 + 0.02 - 0.01;
        assert_relative_eq!(
            TrackScoring::hospitality_match_score(&loud, &target()),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_individual_score_uses_year_when_active() {
        let track = CatalogTrack {
            release_year: 1990,
            ..track_with(target())
        };
        let modern = YearPreference {
            min_year: 1995,
            preferred_years: (1995, 2020),
            recency_weight: 0.4,
            description: String::new(),
            demographic_influence: None,
        };

        assert_relative_eq!(TrackScoring::individual_track_score(&track, &target(), None), 1.0);
        // audio 0.6 * 1.0 + year 0.4 * 0.2
        assert_relative_eq!(
            TrackScoring::individual_track_score(&track, &target(), Some(&modern)),
            0.68,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_chart_relevance_steps() {
        let scorer = MatchQualityScorer::with_current_year(
            vec![
                chart_entry(4, "Queen", "Bohemian Rhapsody"),
                chart_entry(742, "Boudewijn de Groot", "Avond"),
            ],
            2026,
        );

        assert_relative_eq!(scorer.chart_relevance("queen", "Bohemian Rhapsody!"), 0.98);
        assert_relative_eq!(scorer.chart_relevance("Boudewijn de Groot", "Avond"), 0.65);
        assert_relative_eq!(scorer.chart_relevance("Unknown", "Song"), 0.0);
        assert_relative_eq!(scorer.chart_relevance("", ""), 0.0);
    }

    #[test]
    fn test_empty_playlist_quality() {
        let scorer = MatchQualityScorer::with_current_year(Vec::new(), 2026);
        assert_eq!(scorer.score(&[], &target(), None), EMPTY_PLAYLIST_QUALITY);
    }

    #[test]
    fn test_quality_is_clamped_with_chart_boost() {
        let scorer = MatchQualityScorer::with_current_year(
            vec![chart_entry(1, "Test Ensemble", "Clair de Lune")],
            2026,
        );
        let tracks = vec![track_with(target())];
        assert_eq!(scorer.score(&tracks, &target(), None), 100);
    }

    #[test]
    fn test_quality_includes_tempo_distance() {
        let scorer = MatchQualityScorer::with_current_year(Vec::new(), 2026);
        let slower = FeatureVector {
            tempo: 30.0,
            ..target()
        };
        // tempo match 0.5 at weight 0.3 out of 1.0
        assert_eq!(scorer.score(&[track_with(slower)], &target(), None), 85);
    }
}

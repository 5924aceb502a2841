use super::ordering::is_hit;
use super::SearchConfig;
use crate::models::CatalogTrack;
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Playlists with at least this many tracks count as well stocked
pub const WELL_STOCKED_THRESHOLD: usize = 20;
const TOP_GENRE_COUNT: usize = 15;

/// Rung of the selection ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CulturalGenres,
    SecondaryGenres,
    FeatureFallback,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::CulturalGenres => "cultural_genres_primary",
            Strategy::SecondaryGenres => "secondary_genres_with_cultural_boost",
            Strategy::FeatureFallback => "feature_year_fallback",
        }
    }
}

/// Record of one attempted ladder rung
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStep {
    pub strategy: Strategy,
    pub tracks_found: usize,
    pub genres_used: Vec<String>,
    pub exclusions_applied: bool,
    pub accepted: bool,
}

/// Effect of the release-year pre-filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearFilteringReport {
    pub min_year: i32,
    pub original_count: usize,
    pub after_filtering: usize,
    pub removed: usize,
    pub relaxed_min_year: Option<i32>,
    pub after_relaxed: Option<usize>,
}

/// Summary of the accepted tracks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalStats {
    pub total_selected: usize,
    pub with_enrichment_data: usize,
    pub cultural_matches: usize,
    pub recent_2020s: usize,
    pub recent_2010s: usize,
    pub average_popularity: Option<i64>,
    pub average_match_score: i64, // percent
    pub well_stocked: bool,
}

impl FinalStats {
    pub fn from_tracks(tracks: &[CatalogTrack]) -> Self {
        let count = tracks.len();
        let (avg_match, avg_popularity) = if count == 0 {
            (0.0, None)
        } else {
            let n = count as f64;
            let match_sum: f64 = tracks.iter().map(|t| t.match_score).sum();
            let pop_sum: f64 = tracks.iter().map(|t| t.popularity as f64).sum();
            (match_sum / n, Some((pop_sum / n).round() as i64))
        };

        FinalStats {
            total_selected: count,
            with_enrichment_data: tracks.iter().filter(|t| t.has_enrichment_data).count(),
            cultural_matches: tracks.iter().filter(|t| t.cultural_match).count(),
            recent_2020s: tracks.iter().filter(|t| t.release_year >= 2020).count(),
            recent_2010s: tracks.iter().filter(|t| t.release_year >= 2010).count(),
            average_popularity: avg_popularity,
            average_match_score: (avg_match * 100.0).round() as i64,
            well_stocked: count >= WELL_STOCKED_THRESHOLD,
        }
    }
}

/// Everything the search recorded while walking the ladder
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchDiagnostics {
    pub steps: Vec<StrategyStep>,
    pub year_filtering: Option<YearFilteringReport>,
    pub success_strategy: Option<Strategy>,
    pub final_stats: Option<FinalStats>,
    pub catalog_stats: Option<CatalogStats>,
    pub error: Option<String>,
}

impl SearchDiagnostics {
    pub fn attempted(&self, strategy: Strategy) -> bool {
        self.steps.iter().any(|step| step.strategy == strategy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageFeatures {
    pub tempo: f64,
    pub energy: f64,
    pub danceability: f64,
    pub acousticness: f64,
    pub valence: f64,
    pub popularity: f64,
}

/// Catalog composition summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_tracks: usize,
    pub with_enrichment_data: usize,
    pub coverage_percentage: usize,
    pub top_genres: Vec<GenreCount>,
    pub distinct_genres: usize,
    pub average_features: Option<AverageFeatures>,
    pub tempo_distribution: Vec<(String, usize)>,
}

impl CatalogStats {
    pub fn from_catalog(catalog: &[CatalogTrack]) -> Self {
        let total = catalog.len();
        let enriched = catalog.iter().filter(|t| t.has_enrichment_data).count();

        let mut genre_counts: HashMap<&str, usize> = HashMap::new();
        for genre in catalog.iter().flat_map(|t| t.genres.iter()) {
            *genre_counts.entry(genre.as_str()).or_insert(0) += 1;
        }
        let distinct_genres = genre_counts.len();
        let mut top_genres: Vec<GenreCount> = genre_counts
            .into_iter()
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect();
        top_genres.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
        top_genres.truncate(TOP_GENRE_COUNT);

        let average_features = (total > 0).then(|| {
            let n = total as f64;
            let mean = |f: fn(&CatalogTrack) -> f64| catalog.iter().map(f).sum::<f64>() / n;
            AverageFeatures {
                tempo: mean(|t| t.features.tempo),
                energy: mean(|t| t.features.energy),
                danceability: mean(|t| t.features.danceability),
                acousticness: mean(|t| t.features.acousticness),
                valence: mean(|t| t.features.valence),
                popularity: mean(|t| t.popularity as f64),
            }
        });

        let tempo_count = |low: f64, high: f64| {
            catalog
                .iter()
                .filter(|t| t.features.tempo >= low && t.features.tempo < high)
                .count()
        };
        let tempo_distribution = vec![
            ("Very Slow (< 70 BPM)".to_string(), tempo_count(f64::MIN, 70.0)),
            ("Slow (70-90 BPM)".to_string(), tempo_count(70.0, 90.0)),
            ("Moderate (90-110 BPM)".to_string(), tempo_count(90.0, 110.0)),
            ("Upbeat (110-130 BPM)".to_string(), tempo_count(110.0, 130.0)),
            ("Fast (> 130 BPM)".to_string(), tempo_count(130.0, f64::MAX)),
        ];

        CatalogStats {
            total_tracks: total,
            with_enrichment_data: enriched,
            coverage_percentage: if total == 0 { 0 } else { (enriched * 100 + total / 2) / total },
            top_genres,
            distinct_genres,
            average_features,
            tempo_distribution,
        }
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Log the decade and recent-year breakdown of a playlist
pub fn log_year_distribution(tracks: &[CatalogTrack]) {
    let mut decades: BTreeMap<i32, usize> = BTreeMap::new();
    for track in tracks {
        *decades.entry(track.release_year.div_euclid(10) * 10).or_insert(0) += 1;
    }

    info!("Final playlist year distribution:");
    for (decade, count) in &decades {
        info!("  {}s: {} tracks ({:.1}%)", decade, count, percent(*count, tracks.len()));
    }

    info!("Recent music breakdown:");
    for since in [2020, 2015, 2010, 2005] {
        let count = tracks.iter().filter(|t| t.release_year >= since).count();
        info!("  {}+: {} tracks ({:.1}%)", since, count, percent(count, tracks.len()));
    }
}

/// Log the popularity buckets of a playlist, counting boosted hits separately
pub fn log_popularity_distribution(tracks: &[CatalogTrack], config: &SearchConfig) {
    let buckets: [(&str, i32); 6] = [
        ("Hit Boosted (100+)", 100),
        ("Very High (80-99)", 80),
        ("High (60-79)", 60),
        ("Medium (40-59)", 40),
        ("Low (20-39)", 20),
        ("Very Low (0-19)", i32::MIN),
    ];
    let mut counts = [0usize; 6];
    for track in tracks {
        if let Some(index) = buckets.iter().position(|(_, floor)| track.popularity >= *floor) {
            counts[index] += 1;
        }
    }

    info!("Final playlist popularity distribution:");
    for ((label, _), count) in buckets.iter().zip(counts) {
        if count > 0 {
            info!("  {}: {} tracks ({:.1}%)", label, count, percent(count, tracks.len()));
        }
    }

    if !tracks.is_empty() {
        let average = tracks.iter().map(|t| t.popularity as f64).sum::<f64>() / tracks.len() as f64;
        info!("Average popularity: {average:.1}");
    }

    let hits = tracks.iter().filter(|t| is_hit(t, config)).count();
    if hits > 0 {
        info!(
            "Current hits in playlist: {} tracks ({:.1}%)",
            hits,
            percent(hits, tracks.len())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(year: i32, popularity: i32, genres: &[&str]) -> CatalogTrack {
        CatalogTrack {
            title: format!("Track {year}"),
            artist: "Artist".to_string(),
            release_year: year,
            popularity,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_final_stats_counts() {
        let mut tracks = vec![track(2021, 80, &[]), track(2012, 60, &[]), track(1995, 40, &[])];
        tracks[0].match_score = 0.9;
        tracks[1].match_score = 0.7;
        tracks[2].match_score = 0.5;
        tracks[2].cultural_match = true;

        let stats = FinalStats::from_tracks(&tracks);
        assert_eq!(stats.total_selected, 3);
        assert_eq!(stats.recent_2020s, 1);
        assert_eq!(stats.recent_2010s, 2);
        assert_eq!(stats.cultural_matches, 1);
        assert_eq!(stats.average_popularity, Some(60));
        assert_eq!(stats.average_match_score, 70);
        assert!(!stats.well_stocked);
    }

    #[test]
    fn test_final_stats_empty() {
        let stats = FinalStats::from_tracks(&[]);
        assert_eq!(stats.average_popularity, None);
        assert_eq!(stats.average_match_score, 0);
    }

    #[test]
    fn test_catalog_stats() {
        let mut catalog = vec![
            track(2000, 50, &["jazz", "soul"]),
            track(2001, 70, &["jazz"]),
            track(2002, 90, &["pop"]),
        ];
        catalog[0].has_enrichment_data = true;
        catalog[0].features.tempo = 65.0;

        let stats = CatalogStats::from_catalog(&catalog);
        assert_eq!(stats.total_tracks, 3);
        assert_eq!(stats.coverage_percentage, 33);
        assert_eq!(stats.top_genres[0], GenreCount { genre: "jazz".to_string(), count: 2 });
        assert_eq!(stats.distinct_genres, 3);
        assert_eq!(stats.tempo_distribution[0].1, 1);
        assert_eq!(stats.tempo_distribution[3].1, 2);
    }
}

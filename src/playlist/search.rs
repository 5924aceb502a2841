//! Catalog track selection.
//!
//! [`search_tracks_by_features`] is a single filtering and ranking pass.
//! [`search_catalog`] walks a three-rung ladder of such passes (cultural
//! genres, secondary genres, features only) and accepts the first rung that
//! yields enough tracks.

use super::filters::TrackFilters;
use super::metadata::{
    CatalogStats, FinalStats, SearchDiagnostics, Strategy, StrategyStep, YearFilteringReport,
    log_popularity_distribution, log_year_distribution,
};
use super::ordering::{apply_popularity_sorting, compare_by_score_then, stable_sort_by};
use super::scoring::TrackScoring;
use super::SearchConfig;
use crate::cache::CatalogCache;
use crate::client::CatalogError;
use crate::models::{CatalogTrack, FeatureVector};
use crate::profile::years::calculate_year_boost;
use crate::profile::{Culture, ExcludedGenre, MusicProfile, OperationalGoal, YearPreference};
use log::{error, info, warn};
use serde::Serialize;
use std::cmp::Ordering;

/// Cultural relevance used to boost tracks in the secondary-genre rung
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CulturalBoost {
    pub culture: Culture,
    pub score: f64,
}

/// Everything the selection ladder needs from a music profile
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub target_features: FeatureVector,
    pub secondary_genres: Vec<String>,
    pub operational_goal: OperationalGoal,
    pub cultural_genres: Vec<String>,
    pub cultural_boost: Option<CulturalBoost>,
    pub year_preferences: Option<YearPreference>,
    pub excluded_genres: Vec<ExcludedGenre>,
    pub limit: usize,
}

impl SearchRequest {
    pub fn from_profile(profile: &MusicProfile, limit: usize) -> Self {
        SearchRequest {
            target_features: profile.features,
            secondary_genres: profile.secondary_genre_names(),
            operational_goal: profile.operational_goal,
            cultural_genres: profile.cultural_genres(),
            cultural_boost: profile.cultural_context.as_ref().map(|context| CulturalBoost {
                culture: context.culture,
                score: context.score,
            }),
            year_preferences: Some(profile.year_preferences.clone()),
            excluded_genres: profile.excluded_genres.clone(),
            limit,
        }
    }
}

/// Options for one feature-driven pass over the catalog
#[derive(Debug, Clone)]
pub struct FeatureSearchOptions<'a> {
    pub limit: usize,
    pub require_enrichment_data: bool,
    pub operational_goal: OperationalGoal,
    pub genre_prefilter: &'a [String],
    pub excluded_genres: &'a [ExcludedGenre],
    pub min_match_score: f64,
}

impl Default for FeatureSearchOptions<'_> {
    fn default() -> Self {
        FeatureSearchOptions {
            limit: 100,
            require_enrichment_data: false,
            operational_goal: OperationalGoal::BalancedOperation,
            genre_prefilter: &[],
            excluded_genres: &[],
            min_match_score: 0.5,
        }
    }
}

/// Options for a genre-only lookup
#[derive(Debug, Clone)]
pub struct GenreSearchOptions<'a> {
    pub limit: usize,
    pub require_enrichment_data: bool,
    pub excluded_genres: &'a [ExcludedGenre],
}

impl Default for GenreSearchOptions<'_> {
    fn default() -> Self {
        GenreSearchOptions {
            limit: 50,
            require_enrichment_data: false,
            excluded_genres: &[],
        }
    }
}

/// Tracks selected for a request, with a record of how they were found
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    pub tracks: Vec<CatalogTrack>,
    pub diagnostics: SearchDiagnostics,
}

fn has_identity(track: &CatalogTrack) -> bool {
    !track.title.trim().is_empty() && !track.artist.trim().is_empty()
}

fn pass_tie_break(a: &CatalogTrack, b: &CatalogTrack, goal: OperationalGoal) -> Ordering {
    b.has_enrichment_data
        .cmp(&a.has_enrichment_data)
        .then_with(|| match goal {
            OperationalGoal::PremiumExperience => a.popularity.cmp(&b.popularity),
            _ => b.popularity.cmp(&a.popularity),
        })
}

/// One filtering and ranking pass over `catalog`
pub fn search_tracks_by_features(
    catalog: &[CatalogTrack],
    target: &FeatureVector,
    options: &FeatureSearchOptions<'_>,
) -> Vec<CatalogTrack> {
    let mut candidates: Vec<CatalogTrack> = if options.genre_prefilter.is_empty() {
        catalog.to_vec()
    } else {
        catalog
            .iter()
            .filter(|track| TrackFilters::matches_any_genre(track, options.genre_prefilter))
            .cloned()
            .collect()
    };
    let after_genres = candidates.len();

    candidates = TrackFilters::filter_excluded(candidates, options.excluded_genres);
    candidates.retain(|track| {
        has_identity(track) && (!options.require_enrichment_data || track.has_enrichment_data)
    });
    candidates.retain(|track| TrackFilters::within_tempo(track, target.tempo));
    let after_filters = candidates.len();

    for track in &mut candidates {
        track.match_score = TrackScoring::hospitality_match_score(&track.features, target);
    }
    candidates.retain(|track| track.match_score >= options.min_match_score);
    let after_score = candidates.len();

    candidates.retain(|track| TrackFilters::passes_goal_filter(track, options.operational_goal));
    let after_goal = candidates.len();

    let goal = options.operational_goal;
    let mut ranked = stable_sort_by(candidates, &mut |a, b| {
        compare_by_score_then(a, b, |a, b| pass_tie_break(a, b, goal))
    });
    ranked.truncate(options.limit);

    info!(
        "Feature pass: {} total -> {} genre matched -> {} after filters -> {} feature matched -> {} goal matched -> {} final",
        catalog.len(),
        after_genres,
        after_filters,
        after_score,
        after_goal,
        ranked.len()
    );
    ranked
}

/// Tracks matching any of `genres`, in catalog order
pub fn search_tracks_by_genres(
    catalog: &[CatalogTrack],
    genres: &[String],
    options: &GenreSearchOptions<'_>,
) -> Vec<CatalogTrack> {
    let matches: Vec<CatalogTrack> = catalog
        .iter()
        .filter(|track| !options.require_enrichment_data || track.has_enrichment_data)
        .filter(|track| TrackFilters::matches_any_genre(track, genres))
        .cloned()
        .collect();

    let mut matches = TrackFilters::filter_excluded(matches, options.excluded_genres);
    matches.truncate(options.limit);
    matches
}

/// Apply the release-year floor, relaxing it once against the full catalog when too few tracks survive
fn year_filtered_pool(
    catalog: &[CatalogTrack],
    prefs: &YearPreference,
    config: &SearchConfig,
) -> (Vec<CatalogTrack>, YearFilteringReport) {
    let pool = TrackFilters::filter_by_min_year(catalog, prefs.min_year);
    info!(
        "Year filtering ({}+): {} -> {} tracks",
        prefs.min_year,
        catalog.len(),
        pool.len()
    );

    let mut report = YearFilteringReport {
        min_year: prefs.min_year,
        original_count: catalog.len(),
        after_filtering: pool.len(),
        removed: catalog.len() - pool.len(),
        relaxed_min_year: None,
        after_relaxed: None,
    };

    if pool.len() >= config.year_relax_threshold {
        return (pool, report);
    }

    let relaxed_min_year = prefs.min_year - config.year_relax_step;
    let relaxed = TrackFilters::filter_by_min_year(catalog, relaxed_min_year);
    warn!(
        "Year filtering left only {} tracks, relaxing to {}+: {} tracks",
        pool.len(),
        relaxed_min_year,
        relaxed.len()
    );
    report.relaxed_min_year = Some(relaxed_min_year);
    report.after_relaxed = Some(relaxed.len());
    (relaxed, report)
}

/// Mark and boost tracks whose genre text or artist carries a culture keyword
fn apply_cultural_boost(tracks: &mut [CatalogTrack], boost: &CulturalBoost, config: &SearchConfig) {
    let keywords = boost.culture.relevance_keywords();
    let amount = config.cultural_boost_factor * boost.score;

    for track in tracks.iter_mut() {
        let genres = track.genre_text();
        let artist = track.artist.to_lowercase();
        if keywords
            .iter()
            .any(|keyword| genres.contains(keyword) || artist.contains(keyword))
        {
            track.match_score += amount;
            track.cultural_match = true;
        }
    }
}

struct Rung<'a> {
    strategy: Strategy,
    genres: &'a [String],
    pass_limit: usize,
    gate: Option<usize>,
}

fn run_rung(
    pool: &[CatalogTrack],
    request: &SearchRequest,
    config: &SearchConfig,
    rung: &Rung<'_>,
) -> (Vec<CatalogTrack>, StrategyStep) {
    info!("Strategy {}: searching", rung.strategy.label());

    let options = FeatureSearchOptions {
        limit: rung.pass_limit,
        require_enrichment_data: config.require_enrichment_data,
        operational_goal: request.operational_goal,
        genre_prefilter: rung.genres,
        excluded_genres: &request.excluded_genres,
        min_match_score: config.min_match_score,
    };
    let mut tracks = search_tracks_by_features(pool, &request.target_features, &options);

    let prefs = request.year_preferences.as_ref();
    for track in &mut tracks {
        track.match_score =
            TrackScoring::individual_track_score(track, &request.target_features, prefs);
        track.year_boost = match prefs {
            Some(_) => calculate_year_boost(track.release_year, prefs),
            None => 1.0,
        };
    }

    if rung.strategy == Strategy::SecondaryGenres {
        if let Some(boost) = &request.cultural_boost {
            apply_cultural_boost(&mut tracks, boost, config);
        }
    }

    let tracks = apply_popularity_sorting(tracks, config);
    let tracks = TrackFilters::filter_excluded(tracks, &request.excluded_genres);

    let accepted = rung.gate.is_none_or(|gate| tracks.len() >= gate);
    info!(
        "Strategy {}: {} tracks ({})",
        rung.strategy.label(),
        tracks.len(),
        if accepted { "accepted" } else { "below gate" }
    );

    let step = StrategyStep {
        strategy: rung.strategy,
        tracks_found: tracks.len(),
        genres_used: rung.genres.to_vec(),
        exclusions_applied: !request.excluded_genres.is_empty(),
        accepted,
    };
    (tracks, step)
}

/// Select tracks for `request` from an already loaded catalog
pub fn search_catalog(
    catalog: &[CatalogTrack],
    request: &SearchRequest,
    config: &SearchConfig,
) -> SearchOutcome {
    let mut diagnostics = SearchDiagnostics {
        catalog_stats: Some(CatalogStats::from_catalog(catalog)),
        ..Default::default()
    };

    let pool = match &request.year_preferences {
        Some(prefs) => {
            let (pool, report) = year_filtered_pool(catalog, prefs, config);
            diagnostics.year_filtering = Some(report);
            pool
        }
        None => catalog.to_vec(),
    };

    let genre_limit = config.genre_pass_limit(request.limit);
    let mut rungs = Vec::new();
    if !request.cultural_genres.is_empty() {
        rungs.push(Rung {
            strategy: Strategy::CulturalGenres,
            genres: &request.cultural_genres,
            pass_limit: genre_limit,
            gate: Some(config.cultural_gate),
        });
    }
    if !request.secondary_genres.is_empty() {
        rungs.push(Rung {
            strategy: Strategy::SecondaryGenres,
            genres: &request.secondary_genres,
            pass_limit: genre_limit,
            gate: Some(config.secondary_gate),
        });
    }
    rungs.push(Rung {
        strategy: Strategy::FeatureFallback,
        genres: &[],
        pass_limit: config.fallback_pass_limit(request.limit),
        gate: None,
    });

    for rung in &rungs {
        let (mut tracks, step) = run_rung(&pool, request, config, rung);
        let accepted = step.accepted;
        diagnostics.steps.push(step);

        if accepted {
            tracks.truncate(config.max_tracks);
            diagnostics.success_strategy = Some(rung.strategy);
            diagnostics.final_stats = Some(FinalStats::from_tracks(&tracks));
            log_year_distribution(&tracks);
            log_popularity_distribution(&tracks, config);
            return SearchOutcome {
                tracks,
                diagnostics,
            };
        }
    }

    // The fallback rung has no gate, so the loop always returns
    SearchOutcome {
        tracks: Vec::new(),
        diagnostics,
    }
}

/// Track selection over the cached catalog
pub struct TrackSelector {
    cache: CatalogCache,
    config: SearchConfig,
}

impl TrackSelector {
    pub fn new(cache: CatalogCache, config: SearchConfig) -> Self {
        TrackSelector { cache, config }
    }

    /// Select tracks; a catalog load failure yields an empty outcome with the error recorded
    pub fn select(&self, request: &SearchRequest) -> SearchOutcome {
        match self.cache.get() {
            Ok(catalog) => search_catalog(&catalog, request, &self.config),
            Err(e) => {
                error!("Track selection failed: {e}");
                SearchOutcome {
                    tracks: Vec::new(),
                    diagnostics: SearchDiagnostics {
                        error: Some(e.to_string()),
                        ..Default::default()
                    },
                }
            }
        }
    }

    /// Select tracks for a computed profile using the configured request limit
    pub fn select_for_profile(&self, profile: &MusicProfile) -> SearchOutcome {
        self.select(&SearchRequest::from_profile(profile, self.config.request_limit))
    }

    pub fn catalog_stats(&self) -> Result<CatalogStats, CatalogError> {
        let catalog = self.cache.get()?;
        Ok(CatalogStats::from_catalog(&catalog))
    }

    pub fn genre_search(
        &self,
        genres: &[String],
        excluded: &[ExcludedGenre],
        limit: usize,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let catalog = self.cache.get()?;
        Ok(search_tracks_by_genres(
            &catalog,
            genres,
            &GenreSearchOptions {
                limit,
                require_enrichment_data: self.config.require_enrichment_data,
                excluded_genres: excluded,
            },
        ))
    }
}

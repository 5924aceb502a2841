use crate::models::{CatalogTrack, FeatureVector};
use crate::profile::{ExcludedGenre, OperationalGoal};
use log::debug;

/// Track filtering functionality using static helper functions
pub struct TrackFilters;

impl TrackFilters {
    /// Genres guessed from audio features, for tracks with thin genre data
    pub fn inferred_genres(features: &FeatureVector) -> Vec<&'static str> {
        let mut inferred = Vec::new();

        if features.acousticness > 0.7 && features.tempo < 100.0 {
            inferred.extend(["acoustic", "folk"]);
        }
        if features.acousticness > 0.6 && features.instrumentalness > 0.5 && features.tempo < 90.0 {
            inferred.push("jazz");
        }
        if features.acousticness > 0.8 && features.instrumentalness > 0.7 {
            inferred.push("classical");
        }
        if features.energy > 0.7 && features.danceability > 0.6 {
            inferred.extend(["pop", "rock"]);
        }

        inferred
    }

    /// Whether any target genre fuzzily matches the track's listed or inferred genres
    pub fn matches_any_genre(track: &CatalogTrack, target_genres: &[String]) -> bool {
        let mut track_genres = track.all_genres();
        track_genres.extend(
            Self::inferred_genres(&track.features)
                .into_iter()
                .map(str::to_string),
        );

        target_genres.iter().any(|target| {
            let target = target.to_lowercase();
            track_genres
                .iter()
                .any(|genre| genre.contains(&target) || target.contains(genre.as_str()))
        })
    }

    /// First catalog keyword of any excluded category found in the track's genre text
    pub fn excluded_keyword(track: &CatalogTrack, excluded: &[ExcludedGenre]) -> Option<&'static str> {
        let genre_text = track.genre_text();
        excluded
            .iter()
            .flat_map(|category| category.catalog_keywords().iter().copied())
            .find(|keyword| genre_text.contains(keyword))
    }

    /// Remove tracks whose genre text contains a keyword of an excluded category
    pub fn filter_excluded(tracks: Vec<CatalogTrack>, excluded: &[ExcludedGenre]) -> Vec<CatalogTrack> {
        if excluded.is_empty() {
            return tracks;
        }

        let before = tracks.len();
        let kept: Vec<CatalogTrack> = tracks
            .into_iter()
            .filter(|track| match Self::excluded_keyword(track, excluded) {
                Some(keyword) => {
                    debug!(
                        "Excluded: {} by {} - contains {}",
                        track.title, track.artist, keyword
                    );
                    false
                }
                None => true,
            })
            .collect();

        debug!(
            "Exclusion filtering: {} -> {} tracks (removed {})",
            before,
            kept.len(),
            before - kept.len()
        );
        kept
    }

    /// Relative tempo tolerance, wider for slow targets
    pub fn tempo_tolerance(target_bpm: f64) -> f64 {
        if target_bpm < 70.0 {
            0.45
        } else if target_bpm < 85.0 {
            0.25
        } else if target_bpm < 110.0 {
            0.20
        } else {
            0.15
        }
    }

    /// Check if the track tempo falls inside the tolerance window around the target
    pub fn within_tempo(track: &CatalogTrack, target_bpm: f64) -> bool {
        if target_bpm <= 0.0 {
            return true;
        }
        let tolerance = Self::tempo_tolerance(target_bpm);
        let tempo = track.features.tempo;
        tempo >= target_bpm * (1.0 - tolerance) && tempo <= target_bpm * (1.0 + tolerance)
    }

    /// Hard feature limits each operational goal places on candidates
    pub fn passes_goal_filter(track: &CatalogTrack, goal: OperationalGoal) -> bool {
        let f = &track.features;
        match goal {
            OperationalGoal::HighRevenuePerCustomer => {
                f.tempo <= 90.0 && f.danceability <= 0.4 && f.energy <= 0.6
            }
            OperationalGoal::HighTableTurnover => {
                f.tempo >= 95.0 && f.tempo <= 120.0 && f.energy >= 0.5
            }
            OperationalGoal::PremiumExperience => f.acousticness >= 0.3 && f.speechiness <= 0.08,
            OperationalGoal::BalancedOperation => true,
        }
    }

    /// Keep tracks released in or after `min_year`
    pub fn filter_by_min_year(tracks: &[CatalogTrack], min_year: i32) -> Vec<CatalogTrack> {
        tracks
            .iter()
            .filter(|track| track.release_year >= min_year)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, genres_text: &str) -> CatalogTrack {
        CatalogTrack {
            title: title.to_string(),
            artist: "Artist".to_string(),
            genres_text: genres_text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tempo_tolerance_narrows_with_speed() {
        let slow = TrackFilters::tempo_tolerance(60.0);
        let mid = TrackFilters::tempo_tolerance(100.0);
        let fast = TrackFilters::tempo_tolerance(140.0);
        assert!(slow > mid && mid > fast);

        let mut t = track("Boundary", "");
        t.features.tempo = 119.5;
        assert!(TrackFilters::within_tempo(&t, 100.0));
        t.features.tempo = 120.5;
        assert!(!TrackFilters::within_tempo(&t, 100.0));
    }

    #[test]
    fn test_fuzzy_genre_match_both_directions() {
        let t = track("Song", "nouvelle chanson, french pop");
        assert!(TrackFilters::matches_any_genre(&t, &["chanson".to_string()]));
        assert!(TrackFilters::matches_any_genre(&t, &["French Pop Rock".to_string()]));
        assert!(!TrackFilters::matches_any_genre(&t, &["reggae".to_string()]));
    }

    #[test]
    fn test_inferred_genres_cover_untagged_tracks() {
        let mut t = track("Quiet Piece", "");
        t.features.acousticness = 0.9;
        t.features.instrumentalness = 0.8;
        t.features.tempo = 70.0;
        t.features.energy = 0.2;

        assert_eq!(
            TrackFilters::inferred_genres(&t.features),
            vec!["acoustic", "folk", "jazz", "classical"]
        );
        assert!(TrackFilters::matches_any_genre(&t, &["jazz".to_string()]));
    }

    #[test]
    fn test_exclusion_removes_every_keyword_hit() {
        let tracks = vec![
            track("Keep", "bossa nova"),
            track("Drop", "uk garage, dubstep"),
            track("Drop Too", "gangsta rap"),
        ];
        let kept = TrackFilters::filter_excluded(
            tracks,
            &[ExcludedGenre::ElectronicDance, ExcludedGenre::RapHipHop],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Keep");
    }

    #[test]
    fn test_exclusion_over_matches_substrings() {
        // "dub" is a reggae keyword and also appears inside "dubstep"; "romantic" catches "romantic pop"
        assert_eq!(
            TrackFilters::excluded_keyword(&track("Wobble", "dubstep"), &[ExcludedGenre::Reggae]),
            Some("dub")
        );
        assert_eq!(
            TrackFilters::excluded_keyword(&track("Ballad", "romantic pop"), &[ExcludedGenre::Classical]),
            Some("romantic")
        );
    }

    #[test]
    fn test_exclusion_checks_primary_genres() {
        let t = CatalogTrack {
            genres: vec!["Heavy Metal".to_string()],
            ..track("Loud", "")
        };
        assert!(TrackFilters::excluded_keyword(&t, &[ExcludedGenre::HeavyMetal]).is_some());
    }

    #[test]
    fn test_goal_filters() {
        let mut t = track("Candidate", "");
        t.features.tempo = 100.0;
        t.features.energy = 0.6;
        t.features.danceability = 0.3;
        t.features.acousticness = 0.2;

        assert!(TrackFilters::passes_goal_filter(&t, OperationalGoal::HighTableTurnover));
        assert!(!TrackFilters::passes_goal_filter(&t, OperationalGoal::HighRevenuePerCustomer));
        assert!(!TrackFilters::passes_goal_filter(&t, OperationalGoal::PremiumExperience));
        assert!(TrackFilters::passes_goal_filter(&t, OperationalGoal::BalancedOperation));
    }
}

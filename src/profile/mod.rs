//! Brand questionnaire to audio-feature profile.
//!
//! The operational goal supplies a baseline [`FeatureVector`]; the cultural
//! context, business type, vibe, time-of-day choices and vibe words each add a
//! weighted [`layers::AdjustmentLayer`]. The blend is renormalized so the
//! baseline and all present layers share a total weight of one.

pub mod answers;
pub mod blender;
pub mod builder;
pub mod cultural;
pub mod genres;
pub mod goals;
pub mod layers;
pub mod report;
pub mod years;

pub use answers::*;
pub use builder::compute_music_profile;
pub use cultural::{CulturalContext, Culture};
pub use genres::GenreWeight;
pub use years::YearPreference;

use crate::models::FeatureVector;
use layers::LayerKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// One layer's share of the final blend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerShare {
    pub layer: LayerKind,
    pub nominal_weight: f64,
    pub normalized_weight: f64,
}

/// How much each signal contributed to the final features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightDistribution {
    pub requested_goal: OperationalGoal,
    pub goal_rebalanced: bool,
    pub base_goal_weight: f64,
    pub layers: Vec<LayerShare>,
    pub vibe_words_boosted: bool,
    pub demographics_provided: bool,
}

impl WeightDistribution {
    pub fn share_of(&self, layer: LayerKind) -> Option<f64> {
        self.layers
            .iter()
            .find(|share| share.layer == layer)
            .map(|share| share.normalized_weight)
    }

    pub fn total(&self) -> f64 {
        self.base_goal_weight + self.layers.iter().map(|s| s.normalized_weight).sum::<f64>()
    }
}

/// Result of analysing a brand questionnaire
#[derive(Debug, Clone, Serialize)]
pub struct MusicProfile {
    pub features: FeatureVector,
    pub secondary_genres: Vec<GenreWeight>,
    pub predicted_impact: BTreeMap<String, String>,
    pub reasoning: Vec<String>,
    pub cultural_context: Option<CulturalContext>,
    pub operational_goal: OperationalGoal,
    pub year_preferences: YearPreference,
    pub excluded_genres: Vec<ExcludedGenre>,
    pub demographics: Vec<Demographic>,
    pub vibe_words: Vec<VibeWord>,
    pub weight_distribution: WeightDistribution,
}

impl MusicProfile {
    pub fn secondary_genre_names(&self) -> Vec<String> {
        self.secondary_genres.iter().map(|g| g.genre.clone()).collect()
    }

    pub fn cultural_genres(&self) -> Vec<String> {
        self.cultural_context
            .as_ref()
            .map(|context| context.cultural_genres.clone())
            .unwrap_or_default()
    }
}

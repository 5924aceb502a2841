use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for catalog track selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub name: String,         // Name for this search configuration
    pub max_tracks: usize,    // Upper bound on returned tracks
    pub request_limit: usize, // Per-request limit the pass limits are derived from
    pub cultural_gate: usize, // Strategy 1 is accepted at this many tracks
    pub secondary_gate: usize, // Strategy 2 is accepted at this many tracks
    pub min_match_score: f64, // Hospitality score needed to survive a pass
    pub genre_pass_multiplier: usize,
    pub genre_pass_cap: usize,
    pub fallback_pass_multiplier: usize,
    pub fallback_pass_cap: usize,
    pub year_relax_threshold: usize, // Fewer tracks than this after the year filter triggers relaxation
    pub year_relax_step: i32,        // Years the minimum year is lowered by when relaxing
    pub hit_source_tag: String,
    pub hit_popularity_boost: i32,
    pub cultural_boost_factor: f64, // Multiplied by the cultural score for culturally relevant tracks
    pub require_enrichment_data: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            name: "Default Search".to_string(),
            max_tracks: 100,
            request_limit: 50,
            cultural_gate: 15,
            secondary_gate: 10,
            min_match_score: 0.5,
            genre_pass_multiplier: 3,
            genre_pass_cap: 300,
            fallback_pass_multiplier: 2,
            fallback_pass_cap: 200,
            year_relax_threshold: 100,
            year_relax_step: 10,
            hit_source_tag: "Top 50 - Nederland".to_string(),
            hit_popularity_boost: 50,
            cultural_boost_factor: 0.15,
            require_enrichment_data: false,
        }
    }
}

impl SearchConfig {
    /// Per-pass limit for the genre-driven strategies
    pub fn genre_pass_limit(&self, limit: usize) -> usize {
        (limit * self.genre_pass_multiplier).min(self.genre_pass_cap)
    }

    /// Per-pass limit for the feature-only fallback
    pub fn fallback_pass_limit(&self, limit: usize) -> usize {
        (limit * self.fallback_pass_multiplier).min(self.fallback_pass_cap)
    }

    /// Load search configurations directly from a JSON array file
    pub fn load_all_from_file(path: &str) -> Result<Vec<SearchConfig>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search config {path}"))?;
        let configs: Vec<SearchConfig> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse search config {path}"))?;
        Ok(configs)
    }

    /// Pick a configuration by name (case-insensitive), falling back to the default
    pub fn select(configs: &[SearchConfig], name: Option<&str>) -> SearchConfig {
        match name {
            Some(name) => configs
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .cloned()
                .unwrap_or_default(),
            None => configs.first().cloned().unwrap_or_default(),
        }
    }
}

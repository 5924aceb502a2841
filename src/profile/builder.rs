use super::blender::{MENU_NUDGE, ProfileBlender, WEBSITE_NUDGE};
use super::cultural::detect_cultural_context;
use super::genres::{GenreInputs, GenreWeight, is_genre_excluded, recommend_genres};
use super::goals::{predicted_impact, resolve_goal};
use super::layers::{self, AdjustmentLayer};
use super::years::{EraBalance, resolve_year_preference};
use super::{BrandAnswers, ExternalSignals, LayerShare, MusicProfile, WeightDistribution};
use crate::models::Feature;
use log::{debug, info};

/// Reasoning entries kept on a profile
pub const MAX_REASONING_ENTRIES: usize = 12;
const MIN_REASONING_ENTRIES: usize = 8;

/// Genres appended for clearly modern profiles
const CONTEMPORARY_GENRES: [&str; 5] = ["pop", "electronic", "indie pop", "alternative", "dance"];

fn format_percent(weight: f64) -> String {
    format!("{}%", (weight * 100.0).round())
}

fn describe_deltas(layer: &AdjustmentLayer) -> String {
    layer
        .deltas
        .iter()
        .map(|(feature, change)| {
            if feature == Feature::Tempo {
                format!("{}:{:+}BPM", feature.as_str(), change)
            } else {
                format!("{}:{:+.0}", feature.as_str(), change * 100.0)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compute the optimal music profile for a questionnaire and any external analyses
pub fn compute_music_profile(answers: &BrandAnswers, signals: &ExternalSignals) -> MusicProfile {
    let mut reasoning = Vec::new();

    let requested_goal = answers.operational_goal.unwrap_or_default();
    let resolution = resolve_goal(requested_goal, &answers.vibe_words);
    if resolution.was_rebalanced() {
        let words: Vec<&str> = answers.vibe_words.iter().map(|w| w.id()).collect();
        reasoning.push(format!(
            "Auto-balanced: {} conflicted with {} - vibes prioritized",
            requested_goal.id(),
            words.join(", ")
        ));
        info!(
            "Goal {} rebalanced to {}",
            requested_goal.id(),
            resolution.resolved.id()
        );
    }

    let goal_profile = resolution.resolved.profile();
    reasoning.push(format!("PRIMARY (40%): {}", goal_profile.reasoning));

    let menu_items = signals
        .menu
        .as_ref()
        .map(|menu| menu.menu_items.as_slice())
        .unwrap_or_default();
    let cultural_context =
        detect_cultural_context(answers.restaurant_name.as_deref(), menu_items, answers.vibe);

    let mut adjustment_layers = Vec::new();

    if let Some(context) = &cultural_context {
        adjustment_layers.push(layers::cultural_layer(context));
        reasoning.push(format!(
            "Cultural Context (30%): {} ({})",
            context.culture.id(),
            context.confidence.as_str()
        ));
        reasoning.push(format!("Match: {}", context.match_reasons.join("; ")));
    }

    if let Some(business_type) = answers.business_type {
        adjustment_layers.push(layers::business_type_layer(business_type));
        if let Some(note) = layers::business_type_note(business_type) {
            reasoning.push(note.to_string());
        }
    }

    if let Some(vibe) = answers.vibe {
        adjustment_layers.push(layers::vibe_layer(vibe));
        reasoning.push(layers::vibe_note(vibe).to_string());
    }

    if let Some(layer) = layers::time_of_day_layer(&answers.time_atmosphere) {
        adjustment_layers.push(layer);
        let slots: Vec<&str> = answers.time_atmosphere.keys().map(|slot| slot.id()).collect();
        reasoning.push(format!("Time-Based (8%): Optimized for {}", slots.join(", ")));
    }

    let vibe_boosted = resolution.vibe_weight_multiplier > 1.0;
    if let Some(layer) = layers::vibe_words_layer(&answers.vibe_words, resolution.vibe_weight_multiplier) {
        let display = if vibe_boosted {
            format!("{} (CONFLICT BOOSTED)", format_percent(layer.weight))
        } else {
            format_percent(layer.weight)
        };
        let words: Vec<&str> = answers.vibe_words.iter().map(|w| w.id()).collect();
        reasoning.push(format!("Vibe Words ({display}): {}", words.join(", ")));
        reasoning.push(format!("Vibe Impact: {}", describe_deltas(&layer)));
        adjustment_layers.push(layer);
    }

    let mut features = ProfileBlender::blend(goal_profile.target_features, &adjustment_layers);

    if ProfileBlender::apply_signal(&mut features, signals.website.as_ref(), &WEBSITE_NUDGE) {
        reasoning.push(format!("{}: Integrated", WEBSITE_NUDGE.name));
    }
    if ProfileBlender::apply_signal(&mut features, signals.menu.as_ref(), &MENU_NUDGE) {
        reasoning.push(format!("{}: Integrated", MENU_NUDGE.name));
    }

    let features = features.clamped();
    let impact = predicted_impact(goal_profile.priority, &features);

    let time_choices: Vec<_> = answers.time_atmosphere.values().copied().collect();
    let mut secondary_genres = recommend_genres(&GenreInputs {
        business_type: answers.business_type,
        resolved_goal: resolution.resolved,
        vibe_words: &answers.vibe_words,
        time_choices: &time_choices,
        excluded: &answers.excluded_genres,
        cultural_context: cultural_context.as_ref(),
    });

    if !answers.excluded_genres.is_empty() {
        let names: Vec<String> = answers
            .excluded_genres
            .iter()
            .map(|e| e.id().replacen('_', " ", 1))
            .collect();
        reasoning.push(format!(
            "Excluded {} genre categories: {}",
            answers.excluded_genres.len(),
            names.join(", ")
        ));
    }

    let years = resolve_year_preference(
        &answers.demographics,
        answers.vibe,
        &answers.vibe_words,
        cultural_context.as_ref().map(|c| c.culture),
    );
    let initial_min_year = years.preference.preferred_years.0;
    match years.era {
        EraBalance::ModernOnly => reasoning.push(format!(
            "Modern/Youthful vibe + demographics -> {initial_min_year}+ (recency: +{})",
            years.preference.recency_weight
        )),
        EraBalance::TraditionalOnly => reasoning.push(format!(
            "Traditional vibe + demographics -> {initial_min_year}+ (recency: {})",
            years.preference.recency_weight
        )),
        EraBalance::Mixed => reasoning.push(format!(
            "Balanced approach based on demographics -> {initial_min_year}+"
        )),
    }
    if years.heritage_adjusted {
        if let Some(context) = &cultural_context {
            reasoning.push(format!(
                "Cultural adjustment: {} heritage allows older music",
                context.culture.id()
            ));
        }
    }

    if years.era == EraBalance::ModernOnly {
        for genre in CONTEMPORARY_GENRES {
            let present = secondary_genres.iter().any(|g| g.genre == genre);
            if !present && !is_genre_excluded(genre, &answers.excluded_genres) {
                secondary_genres.push(GenreWeight {
                    genre: genre.to_string(),
                    weight: 0.0,
                });
            }
        }
    }

    reasoning.push(format!("Final Profile: {}", features.summary()));

    if !answers.demographics.is_empty() {
        let names: Vec<&str> = answers.demographics.iter().map(|d| d.id()).collect();
        reasoning.push(format!(
            "Demographics: {} -> min year {}",
            names.join(", "),
            years.demographic_year
        ));
    }

    if reasoning.len() < MIN_REASONING_ENTRIES {
        reasoning.push("Scientific audio feature optimization".to_string());
        reasoning.push(format!("Target: {}", goal_profile.priority.as_str()));
        reasoning.push("Multi-layered weighted system".to_string());
    }
    reasoning.truncate(MAX_REASONING_ENTRIES);

    let (base_goal_weight, shares) = ProfileBlender::normalized_weights(&adjustment_layers);
    let weight_distribution = WeightDistribution {
        requested_goal,
        goal_rebalanced: resolution.was_rebalanced(),
        base_goal_weight,
        layers: adjustment_layers
            .iter()
            .zip(shares)
            .map(|(layer, (kind, normalized_weight))| LayerShare {
                layer: kind,
                nominal_weight: layer.weight,
                normalized_weight,
            })
            .collect(),
        vibe_words_boosted: vibe_boosted,
        demographics_provided: !answers.demographics.is_empty(),
    };

    debug!(
        "Profile for {}: {} ({} layers)",
        answers.restaurant_name.as_deref().unwrap_or("unnamed venue"),
        features.summary(),
        adjustment_layers.len()
    );

    MusicProfile {
        features,
        secondary_genres,
        predicted_impact: impact,
        reasoning,
        cultural_context,
        operational_goal: resolution.resolved,
        year_preferences: years.preference,
        excluded_genres: answers.excluded_genres.clone(),
        demographics: answers.demographics.clone(),
        vibe_words: answers.vibe_words.clone(),
        weight_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::answers::{OperationalGoal, VibeWord};
    use approx::assert_relative_eq;

    #[test]
    fn test_layer_weight_percent_formatting() {
        assert_eq!(format_percent(0.15000000000000002), "15%");
        assert_eq!(format_percent(0.05), "5%");
    }

    #[test]
    fn test_conflict_is_recorded_first() {
        let answers = BrandAnswers {
            operational_goal: Some(OperationalGoal::HighTableTurnover),
            vibe_words: vec![VibeWord::Calm],
            ..Default::default()
        };
        let profile = compute_music_profile(&answers, &ExternalSignals::default());
        assert!(profile.reasoning[0].starts_with("Auto-balanced: high_table_turnover"));
        assert_eq!(profile.operational_goal, OperationalGoal::BalancedOperation);
        let vibe_share = profile.weight_distribution.layers[0].nominal_weight;
        assert_relative_eq!(vibe_share, 0.15, epsilon = 1e-12);
    }
}

use super::answers::{OperationalGoal, VibeWord};
use crate::models::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What an operational goal optimises for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    MaximizeSpending,
    MaximizeThroughput,
    OptimizeBoth,
    MaximizeSophistication,
}

impl GoalPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalPriority::MaximizeSpending => "maximize_spending",
            GoalPriority::MaximizeThroughput => "maximize_throughput",
            GoalPriority::OptimizeBoth => "optimize_both",
            GoalPriority::MaximizeSophistication => "maximize_sophistication",
        }
    }
}

/// Baseline feature targets for an operational goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationalGoalProfile {
    pub priority: GoalPriority,
    pub target_features: FeatureVector,
    pub reasoning: &'static str,
}

const HIGH_REVENUE: OperationalGoalProfile = OperationalGoalProfile {
    priority: GoalPriority::MaximizeSpending,
    target_features: FeatureVector {
        tempo: 70.0,
        energy: 0.3,
        acousticness: 0.7,
        danceability: 0.2,
        valence: 0.6,
        instrumentalness: 0.7,
        speechiness: 0.05,
    },
    reasoning: "Milliman (1982): slow tempo increases dwell time by 38%, leading to higher per-customer spending",
};

const HIGH_TURNOVER: OperationalGoalProfile = OperationalGoalProfile {
    priority: GoalPriority::MaximizeThroughput,
    target_features: FeatureVector {
        tempo: 115.0,
        energy: 0.7,
        acousticness: 0.4,
        danceability: 0.5,
        valence: 0.8,
        instrumentalness: 0.4,
        speechiness: 0.05,
    },
    reasoning: "Fast tempo stimulates quick decision-making and movement, increasing table turnover",
};

const BALANCED: OperationalGoalProfile = OperationalGoalProfile {
    priority: GoalPriority::OptimizeBoth,
    target_features: FeatureVector {
        tempo: 88.0,
        energy: 0.5,
        acousticness: 0.6,
        danceability: 0.3,
        valence: 0.65,
        instrumentalness: 0.5,
        speechiness: 0.05,
    },
    reasoning: "Balanced tempo for moderate dwell time with reasonable turnover",
};

const PREMIUM: OperationalGoalProfile = OperationalGoalProfile {
    priority: GoalPriority::MaximizeSophistication,
    target_features: FeatureVector {
        tempo: 65.0,
        energy: 0.25,
        acousticness: 0.85,
        danceability: 0.15,
        valence: 0.5,
        instrumentalness: 0.8,
        speechiness: 0.03,
    },
    reasoning: "Very slow tempo for contemplative dining, high acousticness for sophistication",
};

impl OperationalGoal {
    pub fn profile(self) -> &'static OperationalGoalProfile {
        match self {
            OperationalGoal::HighRevenuePerCustomer => &HIGH_REVENUE,
            OperationalGoal::HighTableTurnover => &HIGH_TURNOVER,
            OperationalGoal::BalancedOperation => &BALANCED,
            OperationalGoal::PremiumExperience => &PREMIUM,
        }
    }

    /// Vibe words that contradict what this goal asks of the music
    pub fn conflicting_vibe_words(self) -> &'static [VibeWord] {
        match self {
            OperationalGoal::HighTableTurnover => &[
                VibeWord::Calm,
                VibeWord::Romantic,
                VibeWord::Luxurious,
                VibeWord::Serious,
            ],
            OperationalGoal::HighRevenuePerCustomer => &[
                VibeWord::Energetic,
                VibeWord::Upbeat,
                VibeWord::Youthful,
                VibeWord::Hip,
            ],
            OperationalGoal::PremiumExperience => &[VibeWord::Rough, VibeWord::Happy],
            OperationalGoal::BalancedOperation => &[],
        }
    }
}

/// Outcome of checking a goal against the chosen vibe words
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalResolution {
    pub requested: OperationalGoal,
    pub resolved: OperationalGoal,
    pub vibe_weight_multiplier: f64,
}

impl GoalResolution {
    pub fn was_rebalanced(&self) -> bool {
        self.requested != self.resolved
    }
}

/// Multiplier applied to the vibe-word layer when a conflict is detected
pub const CONFLICT_VIBE_MULTIPLIER: f64 = 3.0;

/// Swap a goal for the neutral balanced goal when any vibe word contradicts it
pub fn resolve_goal(goal: OperationalGoal, vibe_words: &[VibeWord]) -> GoalResolution {
    let conflicts = goal.conflicting_vibe_words();
    let has_conflict = vibe_words.iter().any(|word| conflicts.contains(word));

    if has_conflict {
        GoalResolution {
            requested: goal,
            resolved: OperationalGoal::BalancedOperation,
            vibe_weight_multiplier: CONFLICT_VIBE_MULTIPLIER,
        }
    } else {
        GoalResolution {
            requested: goal,
            resolved: goal,
            vibe_weight_multiplier: 1.0,
        }
    }
}

/// Rough business impact estimate for the final profile
pub fn predicted_impact(priority: GoalPriority, features: &FeatureVector) -> BTreeMap<String, String> {
    let mut impact = BTreeMap::new();

    match priority {
        GoalPriority::MaximizeSpending => {
            let tempo_score = if features.tempo <= 80.0 {
                1.0
            } else {
                (1.0 - (features.tempo - 80.0) / 40.0).max(0.0)
            };
            let dwell = (20.0 + tempo_score * 36.0).round();
            let revenue = (5.0 + tempo_score * 20.0).round();
            impact.insert("dwell_time_increase".to_string(), format!("+{dwell}%"));
            impact.insert("revenue_per_customer".to_string(), format!("+{revenue}%"));
            impact.insert(
                "table_turnover".to_string(),
                format!("{} (trade-off)", if tempo_score < 0.5 { "-15%" } else { "-5%" }),
            );
            impact.insert("customer_satisfaction".to_string(), "+25%".to_string());
        }
        GoalPriority::MaximizeThroughput => {
            let tempo_score = if features.tempo >= 100.0 {
                1.0
            } else {
                ((features.tempo - 60.0) / 40.0).max(0.0)
            };
            let turnover = (10.0 + tempo_score * 25.0).round();
            impact.insert("table_turnover".to_string(), format!("+{turnover}%"));
            impact.insert(
                "service_speed".to_string(),
                format!("+{}%", (tempo_score * 20.0).round()),
            );
            impact.insert(
                "revenue_per_customer".to_string(),
                format!("{} (trade-off)", if tempo_score > 0.7 { "-10%" } else { "+5%" }),
            );
            impact.insert("customer_satisfaction".to_string(), "+15%".to_string());
        }
        GoalPriority::OptimizeBoth | GoalPriority::MaximizeSophistication => {
            impact.insert(
                "balanced_performance".to_string(),
                "+15% overall efficiency".to_string(),
            );
            impact.insert("customer_satisfaction".to_string(), "+20%".to_string());
            impact.insert("revenue_increase".to_string(), "+12%".to_string());
            impact.insert("operational_efficiency".to_string(), "+18%".to_string());
        }
    }

    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_turnover_with_calm_is_rebalanced() {
        let resolution = resolve_goal(OperationalGoal::HighTableTurnover, &[VibeWord::Calm]);
        assert_eq!(resolution.resolved, OperationalGoal::BalancedOperation);
        assert!(resolution.was_rebalanced());
        assert_relative_eq!(resolution.vibe_weight_multiplier, 3.0);
    }

    #[test]
    fn test_compatible_vibes_keep_goal() {
        let resolution = resolve_goal(
            OperationalGoal::HighTableTurnover,
            &[VibeWord::Upbeat, VibeWord::Energetic],
        );
        assert_eq!(resolution.resolved, OperationalGoal::HighTableTurnover);
        assert!(!resolution.was_rebalanced());
        assert_relative_eq!(resolution.vibe_weight_multiplier, 1.0);
    }

    #[test]
    fn test_balanced_goal_never_conflicts() {
        let resolution = resolve_goal(
            OperationalGoal::BalancedOperation,
            &[VibeWord::Rough, VibeWord::Calm, VibeWord::Hip],
        );
        assert!(!resolution.was_rebalanced());
    }

    #[test]
    fn test_spending_impact_depends_on_tempo() {
        let slow = FeatureVector {
            tempo: 70.0,
            ..OperationalGoal::HighRevenuePerCustomer.profile().target_features
        };
        let impact = predicted_impact(GoalPriority::MaximizeSpending, &slow);
        assert_eq!(impact["dwell_time_increase"], "+56%");
        assert_eq!(impact["table_turnover"], "-5% (trade-off)");

        let fast = FeatureVector { tempo: 120.0, ..slow };
        let impact = predicted_impact(GoalPriority::MaximizeSpending, &fast);
        assert_eq!(impact["dwell_time_increase"], "+20%");
        assert_eq!(impact["table_turnover"], "-15% (trade-off)");
    }
}

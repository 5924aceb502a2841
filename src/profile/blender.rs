use super::answers::AnalysisSignal;
use super::layers::{AdjustmentLayer, LayerKind};
use crate::models::{Feature, FeatureVector};
use log::debug;

/// Share of the blend always held by the operational goal baseline
pub const BASE_GOAL_WEIGHT: f64 = 0.4;
/// External signals below this confidence are ignored
pub const MIN_SIGNAL_CONFIDENCE: f64 = 0.3;

/// How strongly an external analysis may nudge the blended profile
#[derive(Debug, Clone, Copy)]
pub struct SignalNudge {
    pub name: &'static str,
    pub factor: f64,
    pub window: f64,
    pub tempo_window: f64,
}

pub const WEBSITE_NUDGE: SignalNudge = SignalNudge {
    name: "Website Analysis",
    factor: 0.15,
    window: 0.05,
    tempo_window: 5.0,
};

pub const MENU_NUDGE: SignalNudge = SignalNudge {
    name: "Menu Analysis",
    factor: 0.1,
    window: 0.03,
    tempo_window: 3.0,
};

/// Weighted blending of adjustment layers onto a goal baseline
pub struct ProfileBlender;

impl ProfileBlender {
    pub fn total_weight(layers: &[AdjustmentLayer]) -> f64 {
        BASE_GOAL_WEIGHT + layers.iter().map(|layer| layer.weight).sum::<f64>()
    }

    /// Normalized share of the baseline followed by each layer's share
    pub fn normalized_weights(layers: &[AdjustmentLayer]) -> (f64, Vec<(LayerKind, f64)>) {
        let total = Self::total_weight(layers);
        let shares = layers
            .iter()
            .map(|layer| (layer.kind, layer.weight / total))
            .collect();
        (BASE_GOAL_WEIGHT / total, shares)
    }

    /// Apply every layer's deltas at its normalized weight. The result is not clamped.
    pub fn blend(base: FeatureVector, layers: &[AdjustmentLayer]) -> FeatureVector {
        let total = Self::total_weight(layers);
        let mut features = base;

        for layer in layers {
            let normalized = layer.weight / total;
            for (feature, delta) in layer.deltas.iter() {
                let adjustment = delta * normalized;
                *features.get_mut(feature) += adjustment;

                let significant = if feature == Feature::Tempo {
                    adjustment.abs() > 1.0
                } else {
                    adjustment.abs() > 0.02
                };
                if significant {
                    debug!(
                        "{}: {} {:+.3}",
                        layer.kind.label(),
                        feature.as_str(),
                        adjustment
                    );
                }
            }
        }

        features
    }

    /// Nudge the profile with an external analysis. Returns whether the signal was used.
    pub fn apply_signal(
        features: &mut FeatureVector,
        signal: Option<&AnalysisSignal>,
        nudge: &SignalNudge,
    ) -> bool {
        let Some(signal) = signal else {
            return false;
        };
        let Some(adjustments) = signal.audio_feature_adjustments.as_ref() else {
            debug!("{}: no audio adjustments supplied, ignored", nudge.name);
            return false;
        };
        if signal.confidence_score.is_nan() || signal.confidence_score < MIN_SIGNAL_CONFIDENCE {
            debug!(
                "{}: confidence {:.2} below {MIN_SIGNAL_CONFIDENCE}, ignored",
                nudge.name, signal.confidence_score
            );
            return false;
        }

        let bounded = |value: Option<f64>, window: f64| -> f64 {
            match value.map(|v| v * nudge.factor) {
                Some(v) if v.is_finite() => v.clamp(-window, window),
                _ => 0.0,
            }
        };

        features.acousticness += bounded(adjustments.acousticness_boost, nudge.window);
        features.energy += bounded(adjustments.energy_adjustment, nudge.window);
        features.instrumentalness += bounded(adjustments.instrumentalness_boost, nudge.window);
        features.tempo += bounded(adjustments.tempo_adjustment, nudge.tempo_window);
        features.valence += bounded(adjustments.valence_adjustment, nudge.window);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureDeltas;
    use crate::profile::answers::{OperationalGoal, SignalAdjustments};
    use approx::assert_relative_eq;

    fn layer(kind: LayerKind, weight: f64, pairs: &[(Feature, f64)]) -> AdjustmentLayer {
        AdjustmentLayer {
            kind,
            weight,
            deltas: FeatureDeltas::from_pairs(pairs),
        }
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let layers = vec![
            layer(LayerKind::CulturalContext, 0.3, &[]),
            layer(LayerKind::BusinessType, 0.15, &[]),
            layer(LayerKind::TimeOfDay, 0.08, &[]),
            layer(LayerKind::VibeWords, 0.15, &[]),
        ];
        let (base, shares) = ProfileBlender::normalized_weights(&layers);
        let sum: f64 = base + shares.iter().map(|(_, w)| w).sum::<f64>();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_layers_keeps_baseline() {
        let base = OperationalGoal::PremiumExperience.profile().target_features;
        let (share, _) = ProfileBlender::normalized_weights(&[]);
        assert_relative_eq!(share, 1.0);
        assert_eq!(ProfileBlender::blend(base, &[]), base);
    }

    #[test]
    fn test_layer_delta_is_scaled_by_normalized_weight() {
        let base = OperationalGoal::BalancedOperation.profile().target_features;
        let layers = vec![layer(LayerKind::BusinessType, 0.15, &[(Feature::Tempo, 15.0)])];
        let blended = ProfileBlender::blend(base, &layers);
        assert_relative_eq!(blended.tempo, 88.0 + 15.0 * 0.15 / 0.55, epsilon = 1e-9);
        assert_relative_eq!(blended.energy, base.energy);
    }

    #[test]
    fn test_signal_is_windowed() {
        let mut features = OperationalGoal::BalancedOperation.profile().target_features;
        let signal = AnalysisSignal {
            audio_feature_adjustments: Some(SignalAdjustments {
                acousticness_boost: Some(2.0),
                tempo_adjustment: Some(-100.0),
                energy_adjustment: Some(f64::NAN),
                ..Default::default()
            }),
            confidence_score: 0.8,
            ..Default::default()
        };

        assert!(ProfileBlender::apply_signal(&mut features, Some(&signal), &WEBSITE_NUDGE));
        assert_relative_eq!(features.acousticness, 0.65, epsilon = 1e-12);
        assert_relative_eq!(features.tempo, 83.0);
        assert_relative_eq!(features.energy, 0.5);
    }

    #[test]
    fn test_low_confidence_signal_is_ignored() {
        let base = OperationalGoal::BalancedOperation.profile().target_features;
        let mut features = base;
        let signal = AnalysisSignal {
            audio_feature_adjustments: Some(SignalAdjustments {
                energy_adjustment: Some(0.2),
                ..Default::default()
            }),
            confidence_score: 0.29,
            ..Default::default()
        };

        assert!(!ProfileBlender::apply_signal(&mut features, Some(&signal), &MENU_NUDGE));
        assert!(!ProfileBlender::apply_signal(&mut features, None, &MENU_NUDGE));
        assert_eq!(features, base);

        let at_threshold = AnalysisSignal {
            confidence_score: 0.3,
            ..signal
        };
        assert!(ProfileBlender::apply_signal(&mut features, Some(&at_threshold), &MENU_NUDGE));
        assert_relative_eq!(features.energy, 0.52, epsilon = 1e-12);
    }
}

use super::answers::{BusinessType, TimeChoice, TimeSlot, Vibe, VibeWord};
use super::cultural::CulturalContext;
use crate::models::{Feature, FeatureDeltas};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which questionnaire signal a layer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    CulturalContext,
    BusinessType,
    VibeAtmosphere,
    TimeOfDay,
    VibeWords,
}

impl LayerKind {
    pub fn nominal_weight(self) -> f64 {
        match self {
            LayerKind::CulturalContext => 0.30,
            LayerKind::BusinessType => 0.15,
            LayerKind::VibeAtmosphere => 0.12,
            LayerKind::TimeOfDay => 0.08,
            LayerKind::VibeWords => 0.05,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayerKind::CulturalContext => "Cultural Context",
            LayerKind::BusinessType => "Business Type",
            LayerKind::VibeAtmosphere => "Vibe Atmosphere",
            LayerKind::TimeOfDay => "Time-Based Atmosphere",
            LayerKind::VibeWords => "Vibe Words",
        }
    }
}

/// One weighted contributor to the final feature blend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentLayer {
    pub kind: LayerKind,
    pub weight: f64,
    pub deltas: FeatureDeltas,
}

impl AdjustmentLayer {
    fn nominal(kind: LayerKind, deltas: FeatureDeltas) -> Self {
        Self {
            kind,
            weight: kind.nominal_weight(),
            deltas,
        }
    }
}

pub fn business_type_deltas(business_type: BusinessType) -> FeatureDeltas {
    use Feature::*;
    match business_type {
        BusinessType::FineDining => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.2), (Instrumentalness, 0.15), (Energy, -0.15)])
        }
        BusinessType::BrunchBreakfast => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.12), (Valence, 0.08), (Energy, 0.05)])
        }
        BusinessType::CoffeeShop => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.15), (Instrumentalness, 0.1)])
        }
        BusinessType::BarLounge => {
            FeatureDeltas::from_pairs(&[(Energy, 0.1), (Danceability, 0.08), (Valence, 0.05)])
        }
        BusinessType::CasualDining => FeatureDeltas::from_pairs(&[(Valence, 0.05), (Energy, 0.03)]),
        BusinessType::QuickService => FeatureDeltas::from_pairs(&[(Tempo, 15.0), (Energy, 0.1)]),
        BusinessType::RetailFood => FeatureDeltas::new(),
    }
}

/// Reasoning line for a business type, if it has a tailored adjustment
pub fn business_type_note(business_type: BusinessType) -> Option<&'static str> {
    match business_type {
        BusinessType::FineDining => Some("Fine Dining (15%): enhanced sophistication"),
        BusinessType::BrunchBreakfast => Some("Brunch/Breakfast (15%): welcoming morning atmosphere"),
        BusinessType::CoffeeShop => Some("Coffee Shop (15%): moderate acoustic enhancement"),
        BusinessType::BarLounge => Some("Bar/Lounge (15%): social energy boost"),
        BusinessType::CasualDining => Some("Casual Dining (15%): comfortable energy"),
        BusinessType::QuickService => Some("Quick Service (15%): tempo & energy boost"),
        BusinessType::RetailFood => None,
    }
}

pub fn vibe_deltas(vibe: Vibe) -> FeatureDeltas {
    use Feature::*;
    match vibe {
        Vibe::EuropeanSophisticated => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.2), (Instrumentalness, 0.15), (Tempo, -5.0)])
        }
        Vibe::LocalAuthentic => FeatureDeltas::from_pairs(&[(Acousticness, 0.1), (Valence, 0.05)]),
        Vibe::InternationalModern => {
            FeatureDeltas::from_pairs(&[(Energy, 0.05), (Danceability, 0.05)])
        }
        Vibe::ClassicTimeless => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.15), (Instrumentalness, 0.1), (Tempo, -3.0)])
        }
    }
}

pub fn vibe_note(vibe: Vibe) -> &'static str {
    match vibe {
        Vibe::EuropeanSophisticated => "European Sophisticated (12%): refined elegance",
        Vibe::LocalAuthentic => "Local Authentic (12%): warm authenticity",
        Vibe::InternationalModern => "International Modern (12%): contemporary energy",
        Vibe::ClassicTimeless => "Classic Timeless (12%): sophisticated heritage",
    }
}

pub fn time_choice_deltas(choice: TimeChoice) -> FeatureDeltas {
    use Feature::*;
    match choice {
        TimeChoice::MorningEnergetic => {
            FeatureDeltas::from_pairs(&[(Energy, 0.15), (Tempo, 8.0), (Valence, 0.1)])
        }
        TimeChoice::MorningCalm => {
            FeatureDeltas::from_pairs(&[(Energy, -0.1), (Tempo, -5.0), (Acousticness, 0.1)])
        }
        TimeChoice::MorningProductive => {
            FeatureDeltas::from_pairs(&[(Instrumentalness, 0.15), (Speechiness, -0.02)])
        }
        TimeChoice::AfternoonSocial => {
            FeatureDeltas::from_pairs(&[(Energy, 0.1), (Valence, 0.1), (Danceability, 0.1)])
        }
        TimeChoice::AfternoonProfessional => {
            FeatureDeltas::from_pairs(&[(Instrumentalness, 0.1), (Speechiness, -0.02)])
        }
        TimeChoice::AfternoonRelaxed => {
            FeatureDeltas::from_pairs(&[(Energy, -0.05), (Acousticness, 0.05)])
        }
        TimeChoice::EveningIntimate => {
            FeatureDeltas::from_pairs(&[(Energy, -0.15), (Tempo, -8.0), (Instrumentalness, 0.1)])
        }
        TimeChoice::EveningLively => FeatureDeltas::from_pairs(&[(Energy, 0.1), (Valence, 0.1)]),
        TimeChoice::EveningSophisticated => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.1), (Instrumentalness, 0.1)])
        }
    }
}

pub fn vibe_word_deltas(word: VibeWord) -> FeatureDeltas {
    use Feature::*;
    match word {
        VibeWord::Luxurious => FeatureDeltas::from_pairs(&[
            (Acousticness, 0.6),
            (Instrumentalness, 0.4),
            (Energy, -0.4),
            (Danceability, -0.3),
        ]),
        VibeWord::Hip => FeatureDeltas::from_pairs(&[
            (Energy, 0.3),
            (Valence, 0.3),
            (Danceability, 0.4),
            (Acousticness, -0.2),
        ]),
        VibeWord::Modern => {
            FeatureDeltas::from_pairs(&[(Energy, 0.2), (Acousticness, -0.2), (Danceability, 0.2)])
        }
        VibeWord::Traditional => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.4), (Instrumentalness, 0.3), (Tempo, -10.0)])
        }
        VibeWord::Rough => FeatureDeltas::from_pairs(&[
            (Energy, 0.4),
            (Acousticness, -0.4),
            (Danceability, 0.3),
            (Instrumentalness, -0.2),
        ]),
        VibeWord::Happy => FeatureDeltas::from_pairs(&[(Valence, 0.6), (Energy, 0.3), (Tempo, 12.0)]),
        VibeWord::Serious => {
            FeatureDeltas::from_pairs(&[(Energy, -0.3), (Instrumentalness, 0.3), (Valence, -0.2)])
        }
        VibeWord::Calm => {
            FeatureDeltas::from_pairs(&[(Energy, -0.5), (Tempo, -15.0), (Acousticness, 0.3)])
        }
        VibeWord::Upbeat => FeatureDeltas::from_pairs(&[
            (Energy, 0.5),
            (Tempo, 20.0),
            (Valence, 0.3),
            (Danceability, 0.2),
        ]),
        VibeWord::Romantic => FeatureDeltas::from_pairs(&[
            (Energy, -0.3),
            (Tempo, -10.0),
            (Instrumentalness, 0.2),
            (Valence, 0.1),
        ]),
        VibeWord::Authentic => {
            FeatureDeltas::from_pairs(&[(Acousticness, 0.3), (Instrumentalness, 0.2)])
        }
        VibeWord::Energetic => FeatureDeltas::from_pairs(&[
            (Energy, 0.6),
            (Tempo, 25.0),
            (Valence, 0.2),
            (Danceability, 0.2),
        ]),
        VibeWord::Youthful => FeatureDeltas::from_pairs(&[
            (Energy, 0.3),
            (Valence, 0.3),
            (Tempo, 15.0),
            (Danceability, 0.2),
        ]),
    }
}

pub fn cultural_layer(context: &CulturalContext) -> AdjustmentLayer {
    AdjustmentLayer::nominal(LayerKind::CulturalContext, context.audio_adjustments.clone())
}

pub fn business_type_layer(business_type: BusinessType) -> AdjustmentLayer {
    AdjustmentLayer::nominal(LayerKind::BusinessType, business_type_deltas(business_type))
}

pub fn vibe_layer(vibe: Vibe) -> AdjustmentLayer {
    AdjustmentLayer::nominal(LayerKind::VibeAtmosphere, vibe_deltas(vibe))
}

/// All time-slot choices summed into one layer; `None` when no slot was answered
pub fn time_of_day_layer(choices: &BTreeMap<TimeSlot, TimeChoice>) -> Option<AdjustmentLayer> {
    if choices.is_empty() {
        return None;
    }

    let mut deltas = FeatureDeltas::new();
    for choice in choices.values() {
        deltas.merge(&time_choice_deltas(*choice));
    }
    Some(AdjustmentLayer::nominal(LayerKind::TimeOfDay, deltas))
}

/// All vibe words summed into one layer, weight scaled by `multiplier`
pub fn vibe_words_layer(words: &[VibeWord], multiplier: f64) -> Option<AdjustmentLayer> {
    if words.is_empty() {
        return None;
    }

    let mut deltas = FeatureDeltas::new();
    for word in words {
        deltas.merge(&vibe_word_deltas(*word));
    }
    Some(AdjustmentLayer {
        kind: LayerKind::VibeWords,
        weight: LayerKind::VibeWords.nominal_weight() * multiplier,
        deltas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_choices_accumulate_in_one_layer() {
        let mut choices = BTreeMap::new();
        choices.insert(TimeSlot::Morning, TimeChoice::MorningEnergetic);
        choices.insert(TimeSlot::Evening, TimeChoice::EveningIntimate);

        let layer = time_of_day_layer(&choices).unwrap();
        assert_relative_eq!(layer.weight, 0.08);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Energy), 0.0, epsilon = 1e-12);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Tempo), 0.0);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Valence), 0.1);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Instrumentalness), 0.1);
    }

    #[test]
    fn test_absent_signals_produce_no_layer() {
        assert!(time_of_day_layer(&BTreeMap::new()).is_none());
        assert!(vibe_words_layer(&[], 3.0).is_none());
    }

    #[test]
    fn test_vibe_words_weight_scales_with_multiplier() {
        let layer = vibe_words_layer(&[VibeWord::Calm, VibeWord::Romantic], 3.0).unwrap();
        assert_relative_eq!(layer.weight, 0.15, epsilon = 1e-12);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Tempo), -25.0);
        assert_relative_eq!(layer.deltas.get_or_default(Feature::Energy), -0.8);
    }

    #[test]
    fn test_retail_food_layer_is_present_but_neutral() {
        let layer = business_type_layer(BusinessType::RetailFood);
        assert_relative_eq!(layer.weight, 0.15);
        assert!(layer.deltas.is_empty());
        assert!(business_type_note(BusinessType::RetailFood).is_none());
    }
}

//! Detection of a culinary/regional heritage from the venue name and menu.

use super::answers::Vibe;
use crate::models::{Feature, FeatureDeltas};
use serde::{Deserialize, Serialize};

/// Minimum combined pattern score before a culture is reported
pub const CULTURAL_SCORE_THRESHOLD: f64 = 0.3;
const NAME_MATCH_SCORE: f64 = 0.3;
const MENU_MATCH_SCORE: f64 = 0.2;
const EUROPEAN_VIBE_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Culture {
    French,
    Spanish,
    Italian,
    British,
    Greek,
}

impl Culture {
    /// Detection order; on equal scores the earlier culture wins
    pub const ALL: [Culture; 5] = [
        Culture::French,
        Culture::Spanish,
        Culture::Italian,
        Culture::British,
        Culture::Greek,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Culture::French => "french",
            Culture::Spanish => "spanish",
            Culture::Italian => "italian",
            Culture::British => "british",
            Culture::Greek => "greek",
        }
    }

    fn name_patterns(self) -> &'static [&'static str] {
        match self {
            Culture::French => &["café", "brasserie", "bistro", "le ", "la ", "chez", "maison", "auberge"],
            Culture::Spanish => &["valencia", "casa", "el ", "la ", "tapas", "bodega", "mesón", "taberna"],
            Culture::Italian => &["trattoria", "osteria", "bella", "romano", "milano", "casa", "da ", "il ", "la "],
            Culture::British => &["the ", "pub", "arms", "crown", "red lion", "george", "royal", "old"],
            Culture::Greek => &["taverna", "opa", "mykonos", "santorini", "zeus", "apollo"],
        }
    }

    fn menu_indicators(self) -> &'static [&'static str] {
        match self {
            Culture::French => &[
                "croissant", "baguette", "coq au vin", "bouillabaisse", "ratatouille",
                "crème brûlée", "quiche", "escargot", "foie gras", "fromage",
            ],
            Culture::Spanish => &[
                "tapas", "paella", "jamón", "gazpacho", "tortilla", "sangria", "chorizo",
                "patatas bravas", "albondigas",
            ],
            Culture::Italian => &[
                "pasta", "risotto", "antipasti", "bruschetta", "osso buco", "tiramisu",
                "gelato", "prosciutto", "mozzarella", "chianti",
            ],
            Culture::British => &[
                "fish and chips", "shepherd's pie", "bangers", "mash", "sunday roast", "ale",
                "cider", "scones",
            ],
            Culture::Greek => &["gyros", "souvlaki", "moussaka", "tzatziki", "feta", "ouzo", "baklava"],
        }
    }

    pub fn audio_adjustments(self) -> FeatureDeltas {
        match self {
            Culture::French => FeatureDeltas::from_pairs(&[
                (Feature::Acousticness, 0.2),
                (Feature::Instrumentalness, 0.15),
                (Feature::Tempo, -5.0),
                (Feature::Valence, 0.05),
            ]),
            Culture::Spanish => FeatureDeltas::from_pairs(&[
                (Feature::Acousticness, 0.12),
                (Feature::Valence, 0.1),
                (Feature::Instrumentalness, 0.1),
                (Feature::Tempo, -3.0),
            ]),
            Culture::Italian => FeatureDeltas::from_pairs(&[
                (Feature::Acousticness, 0.1),
                (Feature::Valence, 0.08),
                (Feature::Instrumentalness, 0.08),
                (Feature::Tempo, -2.0),
            ]),
            Culture::British => FeatureDeltas::from_pairs(&[
                (Feature::Acousticness, 0.08),
                (Feature::Instrumentalness, 0.05),
                (Feature::Tempo, 2.0),
            ]),
            Culture::Greek => FeatureDeltas::from_pairs(&[
                (Feature::Acousticness, 0.1),
                (Feature::Valence, 0.1),
                (Feature::Instrumentalness, 0.08),
            ]),
        }
    }

    pub fn cultural_genres(self) -> &'static [&'static str] {
        match self {
            Culture::French => &["chanson", "chanson québécoise", "french house", "french indie pop", "french jazz"],
            Culture::Spanish => &["flamenco", "flamenco pop", "latin", "latin alternative", "latin afrobeats"],
            Culture::Italian => &["italian singer-songwriter", "folk", "folk pop", "acoustic pop"],
            Culture::British => &["british invasion", "madchester", "indie rock", "britpop", "new wave"],
            Culture::Greek => &["folk", "world", "mediterranean folk"],
        }
    }

    fn boost_multiplier(self) -> f64 {
        match self {
            Culture::French => 0.15,
            Culture::Spanish => 0.12,
            Culture::Italian => 0.1,
            Culture::British => 0.08,
            Culture::Greek => 0.09,
        }
    }

    /// Keywords that mark a catalog track (genre text or artist) as culturally relevant
    pub fn relevance_keywords(self) -> &'static [&'static str] {
        match self {
            Culture::French => &["french", "chanson", "cafe", "jazz manouche", "francais"],
            Culture::Spanish => &["spanish", "latin", "flamenco", "espanol", "latino"],
            Culture::Italian => &["italian", "italiano", "mediterranean"],
            Culture::British => &["british", "uk", "english", "indie"],
            Culture::Greek => &["greek", "mediterranean"],
        }
    }

    /// Cultures whose heritage repertoire justifies reaching further back in time
    pub fn favours_older_repertoire(self) -> bool {
        matches!(self, Culture::French | Culture::Italian)
    }

    fn is_continental(self) -> bool {
        matches!(
            self,
            Culture::French | Culture::Spanish | Culture::Italian | Culture::Greek
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            Confidence::High
        } else if score >= 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// A detected cultural heritage signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalContext {
    pub culture: Culture,
    pub score: f64,
    pub audio_adjustments: FeatureDeltas,
    pub cultural_genres: Vec<String>,
    pub boost_amount: f64,
    pub match_reasons: Vec<String>,
    pub confidence: Confidence,
}

/// Score every known culture against the venue name and menu, keeping the best one
pub fn detect_cultural_context(
    restaurant_name: Option<&str>,
    menu_items: &[String],
    vibe: Option<Vibe>,
) -> Option<CulturalContext> {
    let display_name = restaurant_name.unwrap_or_default();
    let name = display_name.to_lowercase();
    let menu_text = menu_items.join(" ").to_lowercase();

    let mut best: Option<(Culture, f64, Vec<String>)> = None;

    for culture in Culture::ALL {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        let name_matches: Vec<&str> = culture
            .name_patterns()
            .iter()
            .copied()
            .filter(|pattern| name.contains(pattern))
            .collect();
        if !name_matches.is_empty() {
            score += NAME_MATCH_SCORE * name_matches.len() as f64;
            reasons.push(format!(
                "Name \"{}\" contains {} patterns: {}",
                display_name,
                culture.id(),
                name_matches.join(", ")
            ));
        }

        let menu_matches: Vec<&str> = culture
            .menu_indicators()
            .iter()
            .copied()
            .filter(|indicator| menu_text.contains(indicator))
            .collect();
        if !menu_matches.is_empty() {
            score += MENU_MATCH_SCORE * menu_matches.len() as f64;
            let shown = menu_matches.iter().take(3).copied().collect::<Vec<_>>().join(", ");
            let ellipsis = if menu_matches.len() > 3 { "..." } else { "" };
            reasons.push(format!("Menu contains {} items: {shown}{ellipsis}", culture.id()));
        }

        if vibe == Some(Vibe::EuropeanSophisticated) && culture.is_continental() {
            score *= EUROPEAN_VIBE_MULTIPLIER;
            reasons.push(format!(
                "\"European Sophisticated\" vibe boosts {} cultural match",
                culture.id()
            ));
        }

        let best_score = best.as_ref().map_or(0.0, |(_, s, _)| *s);
        if score > best_score {
            best = Some((culture, score, reasons));
        }
    }

    let (culture, raw_score, match_reasons) = best?;
    if raw_score < CULTURAL_SCORE_THRESHOLD {
        return None;
    }

    let score = raw_score.min(1.0);
    Some(CulturalContext {
        culture,
        score,
        audio_adjustments: culture.audio_adjustments(),
        cultural_genres: culture.cultural_genres().iter().map(|g| g.to_string()).collect(),
        boost_amount: culture.boost_multiplier() * score,
        match_reasons,
        confidence: Confidence::from_score(raw_score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_french_name_is_detected() {
        let context = detect_cultural_context(Some("Brasserie Chez Paul"), &[], None).unwrap();
        assert_eq!(context.culture, Culture::French);
        assert_relative_eq!(context.score, 0.6);
        assert_eq!(context.confidence, Confidence::High);
        assert_relative_eq!(context.boost_amount, 0.15 * 0.6);
        assert!(context.cultural_genres.contains(&"chanson".to_string()));
    }

    #[test]
    fn test_menu_items_contribute_to_score() {
        let menu = vec!["Paella Valenciana".to_string(), "Gazpacho".to_string()];
        let context = detect_cultural_context(Some("Sunset"), &menu, None).unwrap();
        assert_eq!(context.culture, Culture::Spanish);
        assert_relative_eq!(context.score, 0.4);
        assert_eq!(context.confidence, Confidence::Medium);
    }

    #[test]
    fn test_weak_signal_is_ignored() {
        let menu = vec!["Feta salad".to_string()];
        assert!(detect_cultural_context(Some("Sunset"), &menu, None).is_none());
        assert!(detect_cultural_context(None, &[], None).is_none());
    }

    #[test]
    fn test_european_vibe_boosts_continental_cultures() {
        let menu = vec!["Feta".to_string()];
        let context =
            detect_cultural_context(Some("Sunset"), &menu, Some(Vibe::EuropeanSophisticated))
                .unwrap();
        assert_eq!(context.culture, Culture::Greek);
        assert_relative_eq!(context.score, 0.3, epsilon = 1e-9);
        assert_eq!(context.confidence, Confidence::Low);
    }

    #[test]
    fn test_score_is_capped_at_one() {
        let menu = vec!["croissant baguette quiche fromage escargot".to_string()];
        let context = detect_cultural_context(Some("Le Bistro"), &menu, None).unwrap();
        assert_eq!(context.culture, Culture::French);
        assert_relative_eq!(context.score, 1.0);
    }
}

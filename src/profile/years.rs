use super::answers::{Demographic, EraLean, Vibe, VibeWord};
use super::cultural::Culture;
use serde::{Deserialize, Serialize};

/// Minimum year used when no demographic was selected
pub const DEFAULT_MIN_YEAR: i32 = 1980;
/// Latest year a preferred window may extend to
pub const PREFERRED_YEARS_CEILING: i32 = 2024;
const MODERN_MIN_YEAR_FLOOR: i32 = 1995;
const HERITAGE_MIN_YEAR_CAP: i32 = 1980;

/// Release-year preference derived from demographics and vibes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPreference {
    pub min_year: i32,
    pub preferred_years: (i32, i32),
    pub recency_weight: f64,
    pub description: String,
    #[serde(default)]
    pub demographic_influence: Option<String>,
}

impl YearPreference {
    /// Whether year scoring takes part at all
    pub fn is_active(&self) -> bool {
        self.recency_weight != 0.0
    }
}

/// Combined era leaning of the vibe and vibe words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EraBalance {
    ModernOnly,
    TraditionalOnly,
    Mixed,
}

impl EraBalance {
    pub fn classify(vibe: Option<Vibe>, vibe_words: &[VibeWord]) -> Self {
        let leans: Vec<EraLean> = vibe_words
            .iter()
            .map(|word| word.era_lean())
            .chain(vibe.map(Vibe::era_lean))
            .collect();
        let modern = leans.contains(&EraLean::Modern);
        let traditional = leans.contains(&EraLean::Traditional);

        match (modern, traditional) {
            (true, false) => EraBalance::ModernOnly,
            (false, true) => EraBalance::TraditionalOnly,
            _ => EraBalance::Mixed,
        }
    }

    pub fn recency_weight(self) -> f64 {
        match self {
            EraBalance::ModernOnly => 0.4,
            EraBalance::TraditionalOnly => -0.4,
            EraBalance::Mixed => 0.1,
        }
    }
}

/// Rounded average target year of the selected demographics, with senior caps
pub fn demographic_min_year(demographics: &[Demographic]) -> i32 {
    if demographics.is_empty() {
        return DEFAULT_MIN_YEAR;
    }

    let sum: i32 = demographics.iter().map(|d| d.target_year()).sum();
    let mut year = (sum as f64 / demographics.len() as f64).round() as i32;

    let seniors = demographics.contains(&Demographic::SeniorsMature);
    if seniors {
        year = year.min(1960);
    }
    if seniors && demographics.contains(&Demographic::LocalsRegulars) {
        year = year.min(1955);
    }
    year
}

/// Outcome of year-preference resolution, with the intermediate decisions
#[derive(Debug, Clone, PartialEq)]
pub struct YearResolution {
    pub preference: YearPreference,
    pub era: EraBalance,
    pub demographic_year: i32,
    pub heritage_adjusted: bool,
}

pub fn resolve_year_preference(
    demographics: &[Demographic],
    vibe: Option<Vibe>,
    vibe_words: &[VibeWord],
    culture: Option<Culture>,
) -> YearResolution {
    let demographic_year = demographic_min_year(demographics);
    let era = EraBalance::classify(vibe, vibe_words);

    let mut min_year = demographic_year;
    if era == EraBalance::ModernOnly {
        min_year = min_year.max(MODERN_MIN_YEAR_FLOOR);
    }

    let demographic_influence = if demographics.is_empty() {
        None
    } else {
        Some(
            demographics
                .iter()
                .map(|d| d.id())
                .collect::<Vec<_>>()
                .join(", "),
        )
    };

    let mut preference = YearPreference {
        min_year,
        preferred_years: (min_year, (min_year + 25).min(PREFERRED_YEARS_CEILING)),
        recency_weight: era.recency_weight(),
        description: format!("Demographics + vibes ({min_year}+)"),
        demographic_influence,
    };

    // Only the floor moves; the preferred window stays where the demographics put it
    let heritage_adjusted = culture.is_some_and(Culture::favours_older_repertoire);
    if heritage_adjusted {
        preference.min_year = preference.min_year.min(HERITAGE_MIN_YEAR_CAP);
    }

    YearResolution {
        preference,
        era,
        demographic_year,
        heritage_adjusted,
    }
}

/// Year component used while ranking catalog search results
pub fn calculate_year_boost(track_year: i32, prefs: Option<&YearPreference>) -> f64 {
    let Some(prefs) = prefs.filter(|p| p.is_active()) else {
        return 1.0;
    };
    let (start, end) = prefs.preferred_years;

    if prefs.recency_weight >= 0.4 {
        match track_year {
            y if y >= 2020 => 1.0,
            y if y >= 2015 => 0.9,
            y if y >= 2010 => 0.7,
            y if y >= 2005 => 0.5,
            _ => 0.2,
        }
    } else if prefs.recency_weight <= -0.3 {
        match track_year {
            y if y <= 1980 => 1.0,
            y if y <= 1995 => 0.9,
            y if y <= 2005 => 0.7,
            y if y <= 2015 => 0.4,
            _ => 0.1,
        }
    } else {
        match track_year {
            y if y >= end - 4 => 1.0,
            y if y >= end - 9 => 0.9,
            y if y >= start => 0.7,
            y if y >= prefs.min_year => 0.4,
            _ => 0.1,
        }
    }
}

/// Year component used by the match-quality aggregate
pub fn calculate_year_score(track_year: i32, prefs: Option<&YearPreference>, current_year: i32) -> f64 {
    let Some(prefs) = prefs.filter(|p| p.is_active()) else {
        return 1.0;
    };
    let (start, end) = prefs.preferred_years;

    if prefs.recency_weight > 0.0 {
        match track_year {
            y if y >= end - 4 => 1.0,
            y if y >= end - 9 => 0.85,
            y if y >= start => 0.7,
            y if y >= prefs.min_year => 0.4,
            _ => 0.1,
        }
    } else {
        match track_year {
            y if y <= start + 10 => 1.0,
            y if y <= end => 0.9,
            y if y <= current_year - 5 => 0.8,
            _ => 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prefs(recency_weight: f64, min_year: i32) -> YearPreference {
        YearPreference {
            min_year,
            preferred_years: (min_year, (min_year + 25).min(PREFERRED_YEARS_CEILING)),
            recency_weight,
            description: String::new(),
            demographic_influence: None,
        }
    }

    #[test]
    fn test_demographic_average_and_caps() {
        assert_eq!(demographic_min_year(&[]), 1980);
        assert_eq!(
            demographic_min_year(&[Demographic::YoungAdults, Demographic::BusinessProfessionals]),
            1995
        );
        assert_eq!(
            demographic_min_year(&[Demographic::SeniorsMature, Demographic::YoungAdults]),
            1960
        );
        assert_eq!(
            demographic_min_year(&[Demographic::SeniorsMature, Demographic::LocalsRegulars]),
            1955
        );
    }

    #[test]
    fn test_modern_vibes_raise_floor() {
        let resolution = resolve_year_preference(
            &[Demographic::SeniorsMature],
            Some(Vibe::InternationalModern),
            &[VibeWord::Youthful],
            None,
        );
        assert_eq!(resolution.era, EraBalance::ModernOnly);
        assert_eq!(resolution.preference.min_year, 1995);
        assert_eq!(resolution.preference.preferred_years, (1995, 2020));
        assert_relative_eq!(resolution.preference.recency_weight, 0.4);
    }

    #[test]
    fn test_mixed_vibes_are_mildly_recent() {
        let resolution = resolve_year_preference(
            &[],
            Some(Vibe::ClassicTimeless),
            &[VibeWord::Hip],
            None,
        );
        assert_eq!(resolution.era, EraBalance::Mixed);
        assert_relative_eq!(resolution.preference.recency_weight, 0.1);

        let none = resolve_year_preference(&[], None, &[], None);
        assert_eq!(none.era, EraBalance::Mixed);
        assert_eq!(none.preference.preferred_years, (1980, 2005));
    }

    #[test]
    fn test_heritage_culture_lowers_min_year_only() {
        let resolution = resolve_year_preference(
            &[Demographic::YoungAdults],
            Some(Vibe::InternationalModern),
            &[],
            Some(Culture::Italian),
        );
        assert!(resolution.heritage_adjusted);
        assert_eq!(resolution.preference.min_year, 1980);
        assert_eq!(resolution.preference.preferred_years, (2000, 2024));

        let british = resolve_year_preference(&[Demographic::YoungAdults], None, &[], Some(Culture::British));
        assert!(!british.heritage_adjusted);
        assert_eq!(british.preference.min_year, 2000);
    }

    #[test]
    fn test_traditional_boost_favours_classic_era() {
        let p = prefs(-0.4, 1975);
        assert_relative_eq!(calculate_year_boost(1975, Some(&p)), 1.0);
        assert_relative_eq!(calculate_year_boost(2018, Some(&p)), 0.1);
    }

    #[test]
    fn test_year_boost_bands() {
        let modern = prefs(0.4, 1995);
        assert_relative_eq!(calculate_year_boost(2021, Some(&modern)), 1.0);
        assert_relative_eq!(calculate_year_boost(2012, Some(&modern)), 0.7);
        assert_relative_eq!(calculate_year_boost(1999, Some(&modern)), 0.2);

        let mild = prefs(0.1, 1985);
        assert_relative_eq!(calculate_year_boost(2008, Some(&mild)), 1.0);
        assert_relative_eq!(calculate_year_boost(2001, Some(&mild)), 0.9);
        assert_relative_eq!(calculate_year_boost(1990, Some(&mild)), 0.7);
        assert_relative_eq!(calculate_year_boost(1970, Some(&mild)), 0.1);

        assert_relative_eq!(calculate_year_boost(1950, Some(&prefs(0.0, 1985))), 1.0);
        assert_relative_eq!(calculate_year_boost(1950, None), 1.0);
    }

    #[test]
    fn test_year_score_bands() {
        let modern = prefs(0.4, 1995);
        assert_relative_eq!(calculate_year_score(2012, Some(&modern), 2026), 0.85);
        assert_relative_eq!(calculate_year_score(2010, Some(&modern), 2026), 0.7);
        assert_relative_eq!(calculate_year_score(1990, Some(&modern), 2026), 0.1);

        let classic = prefs(-0.4, 1960);
        assert_relative_eq!(calculate_year_score(1968, Some(&classic), 2026), 1.0);
        assert_relative_eq!(calculate_year_score(1984, Some(&classic), 2026), 0.9);
        assert_relative_eq!(calculate_year_score(2015, Some(&classic), 2026), 0.8);
        assert_relative_eq!(calculate_year_score(2024, Some(&classic), 2026), 0.7);
    }
}

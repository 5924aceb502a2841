//! Ranked secondary-genre recommendation from the questionnaire answers.

use super::answers::{BusinessType, ExcludedGenre, OperationalGoal, TimeChoice, VibeWord};
use super::cultural::CulturalContext;
use log::debug;
use serde::{Deserialize, Serialize};

/// Number of genres returned by the recommender
pub const MAX_SECONDARY_GENRES: usize = 8;
const CULTURAL_GENRE_FACTOR: f64 = 0.4;
const GENRE_HINT_BOOST: f64 = 0.3;

/// A recommended genre and its normalized weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreWeight {
    pub genre: String,
    pub weight: f64,
}

/// Insertion-ordered genre weight accumulator; absent genres read as zero
#[derive(Debug, Clone, Default)]
pub struct GenreWeights {
    entries: Vec<(String, f64)>,
}

impl GenreWeights {
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        let mut weights = Self::default();
        for &(genre, weight) in pairs {
            weights.add(genre, weight);
        }
        weights
    }

    pub fn get(&self, genre: &str) -> f64 {
        self.entries
            .iter()
            .find(|(g, _)| g == genre)
            .map_or(0.0, |(_, w)| *w)
    }

    pub fn set(&mut self, genre: &str, weight: f64) {
        match self.entries.iter_mut().find(|(g, _)| g == genre) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((genre.to_string(), weight)),
        }
    }

    pub fn add(&mut self, genre: &str, delta: f64) {
        let current = self.get(genre);
        self.set(genre, current + delta);
    }

    pub fn add_all(&mut self, pairs: &[(&str, f64)]) {
        for &(genre, delta) in pairs {
            self.add(genre, delta);
        }
    }

    /// Lower a genre by `delta` without letting it drop under `floor`
    pub fn penalize(&mut self, genre: &str, delta: f64, floor: f64) {
        let current = self.get(genre);
        self.set(genre, (current - delta).max(floor));
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(genre, _)| keep(genre.as_str()));
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(genre, _)| genre.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalize to sum 1, sort descending (stable), keep the top `n` rounded to 2 decimals
    pub fn top_normalized(&self, n: usize) -> Vec<GenreWeight> {
        let sum: f64 = self.entries.iter().map(|(_, w)| w).sum();
        let total = if sum == 0.0 { 1.0 } else { sum };

        let mut normalized: Vec<(String, f64)> = self
            .entries
            .iter()
            .map(|(genre, weight)| (genre.clone(), weight / total))
            .collect();
        normalized.sort_by(|a, b| b.1.total_cmp(&a.1));

        normalized
            .into_iter()
            .take(n)
            .map(|(genre, weight)| GenreWeight {
                genre,
                weight: (weight * 100.0).round() / 100.0,
            })
            .collect()
    }
}

fn business_base_genres(business_type: Option<BusinessType>) -> GenreWeights {
    let pairs: &[(&str, f64)] = match business_type {
        Some(BusinessType::FineDining) => {
            &[("jazz", 0.4), ("classical", 0.3), ("acoustic", 0.2), ("ambient", 0.1)]
        }
        Some(BusinessType::CasualDining) => {
            &[("pop", 0.3), ("rock", 0.3), ("acoustic", 0.2), ("folk", 0.2)]
        }
        Some(BusinessType::BrunchBreakfast) | Some(BusinessType::CoffeeShop) => {
            &[("acoustic", 0.4), ("folk", 0.3), ("indie", 0.2), ("jazz", 0.1)]
        }
        Some(BusinessType::BarLounge) => {
            &[("electronic", 0.3), ("pop", 0.3), ("rock", 0.2), ("indie", 0.2)]
        }
        Some(BusinessType::RetailFood) => {
            &[("pop", 0.4), ("indie", 0.3), ("electronic", 0.2), ("rock", 0.1)]
        }
        Some(BusinessType::QuickService) => {
            &[("pop", 0.4), ("electronic", 0.3), ("rock", 0.2), ("indie", 0.1)]
        }
        None => &[("pop", 0.4), ("rock", 0.3), ("acoustic", 0.3)],
    };
    GenreWeights::from_pairs(pairs)
}

fn vibe_word_genres(word: VibeWord) -> &'static [(&'static str, f64)] {
    match word {
        VibeWord::Energetic => &[("pop", 0.3), ("rock", 0.2), ("electronic", 0.2)],
        VibeWord::Calm => &[("acoustic", 0.3), ("ambient", 0.2), ("jazz", 0.1)],
        VibeWord::Happy => &[("pop", 0.3), ("folk", 0.2), ("reggae", 0.1)],
        VibeWord::Traditional => &[("folk", 0.3), ("country", 0.2), ("classical", 0.1)],
        VibeWord::Modern => &[("indie", 0.3), ("electronic", 0.2), ("pop", 0.1)],
        VibeWord::Rough => &[("rock", 0.3), ("alternative", 0.2), ("grunge", 0.1)],
        VibeWord::Romantic => &[("acoustic", 0.2), ("jazz", 0.2), ("soul", 0.1)],
        VibeWord::Upbeat => &[("pop", 0.2), ("rock", 0.2), ("electronic", 0.1)],
        VibeWord::Luxurious => &[("jazz", 0.2), ("classical", 0.1), ("ambient", 0.1)],
        VibeWord::Hip => &[("indie", 0.2), ("electronic", 0.1), ("alternative", 0.1)],
        VibeWord::Youthful => &[("pop", 0.2), ("indie", 0.1), ("electronic", 0.1)],
        VibeWord::Serious | VibeWord::Authentic => &[],
    }
}

fn time_choice_genres(choice: TimeChoice) -> &'static [(&'static str, f64)] {
    match choice {
        TimeChoice::EveningLively => &[("pop", 0.1), ("rock", 0.1)],
        TimeChoice::EveningIntimate => &[("jazz", 0.1), ("acoustic", 0.1)],
        TimeChoice::MorningEnergetic => &[("pop", 0.1), ("electronic", 0.1)],
        TimeChoice::AfternoonSocial => &[("pop", 0.05), ("indie", 0.05)],
        _ => &[],
    }
}

/// Niche genres for extreme vibe-word and business-type combinations
pub fn genre_hints(vibe_words: &[VibeWord], business_type: Option<BusinessType>) -> Vec<&'static str> {
    use BusinessType::*;

    let mut hints = Vec::new();
    let has = |word: VibeWord| vibe_words.contains(&word);

    if has(VibeWord::Rough) {
        match business_type {
            Some(FineDining) => hints.extend(["alternative", "indie rock", "post-rock", "art rock"]),
            Some(CasualDining) => hints.extend(["rock", "alternative rock", "garage rock", "grunge"]),
            Some(BarLounge) => hints.extend(["industrial", "dark ambient", "post-punk"]),
            _ => {}
        }
    }
    if has(VibeWord::Luxurious) {
        match business_type {
            Some(FineDining) => hints.extend(["classical", "chamber music", "solo piano", "ambient"]),
            Some(CasualDining) => hints.extend(["smooth jazz", "neo-soul", "acoustic"]),
            Some(BarLounge) => hints.extend(["lounge", "chillout", "downtempo", "nu jazz"]),
            _ => {}
        }
    }
    if has(VibeWord::Hip) {
        match business_type {
            Some(FineDining) => hints.extend(["nu jazz", "trip hop", "electronic", "experimental"]),
            Some(CoffeeShop) => hints.extend(["indie pop", "indie electronic", "chillwave"]),
            Some(BarLounge) => hints.extend(["deep house", "minimal techno", "electro-jazz"]),
            _ => {}
        }
    }
    if has(VibeWord::Energetic) {
        match business_type {
            Some(CoffeeShop) => hints.extend(["indie pop", "electro pop", "dance-punk"]),
            Some(BarLounge) => hints.extend(["house", "disco", "funk"]),
            _ => {}
        }
    }
    if has(VibeWord::Youthful) {
        hints.extend(["indie pop", "electro pop", "bedroom pop", "indie dance"]);
    }

    hints
}

/// Whether a recommended genre collides with any keyword of an excluded category
pub fn is_genre_excluded(genre: &str, excluded: &[ExcludedGenre]) -> bool {
    let genre = genre.to_lowercase();
    excluded.iter().any(|category| {
        category
            .profile_keywords()
            .iter()
            .any(|keyword| genre.contains(keyword) || keyword.contains(genre.as_str()))
    })
}

/// Everything the recommender reads from the questionnaire
#[derive(Debug, Clone, Copy)]
pub struct GenreInputs<'a> {
    pub business_type: Option<BusinessType>,
    pub resolved_goal: OperationalGoal,
    pub vibe_words: &'a [VibeWord],
    pub time_choices: &'a [TimeChoice],
    pub excluded: &'a [ExcludedGenre],
    pub cultural_context: Option<&'a CulturalContext>,
}

/// Build the full weight map before normalization
pub fn accumulate_genre_weights(inputs: &GenreInputs<'_>) -> GenreWeights {
    let mut weights = business_base_genres(inputs.business_type);

    for word in inputs.vibe_words {
        weights.add_all(vibe_word_genres(*word));
    }
    for choice in inputs.time_choices {
        weights.add_all(time_choice_genres(*choice));
    }

    if let Some(context) = inputs.cultural_context {
        let cultural_weight = CULTURAL_GENRE_FACTOR * context.score;
        for genre in &context.cultural_genres {
            weights.add(genre, cultural_weight);
        }
    }

    let hints = genre_hints(inputs.vibe_words, inputs.business_type);
    if !hints.is_empty() {
        debug!("Genre hints: {}", hints.join(", "));
    }
    for hint in hints {
        weights.add(hint, GENRE_HINT_BOOST);
    }

    if inputs.resolved_goal == OperationalGoal::HighRevenuePerCustomer {
        weights.add_all(&[
            ("acoustic", 0.4),
            ("instrumental", 0.3),
            ("ambient", 0.2),
            ("folk", 0.2),
            ("classical", 0.2),
            ("jazz", 0.15),
            ("easy listening", 0.15),
        ]);
        weights.penalize("pop", 0.5, 0.02);
        weights.penalize("rock", 0.5, 0.02);
        weights.penalize("alternative rock", 0.4, 0.02);
        weights.penalize("garage rock", 0.4, 0.01);
    }

    if !inputs.excluded.is_empty() {
        weights.retain(|genre| {
            let excluded = is_genre_excluded(genre, inputs.excluded);
            if excluded {
                debug!("Removing {genre} from secondary genres (excluded)");
            }
            !excluded
        });
    }

    weights
}

/// Top weighted secondary genres for the questionnaire
pub fn recommend_genres(inputs: &GenreInputs<'_>) -> Vec<GenreWeight> {
    accumulate_genre_weights(inputs).top_normalized(MAX_SECONDARY_GENRES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs<'a>(
        business_type: Option<BusinessType>,
        vibe_words: &'a [VibeWord],
        excluded: &'a [ExcludedGenre],
    ) -> GenreInputs<'a> {
        GenreInputs {
            business_type,
            resolved_goal: OperationalGoal::BalancedOperation,
            vibe_words,
            time_choices: &[],
            excluded,
            cultural_context: None,
        }
    }

    #[test]
    fn test_default_base_map_without_business_type() {
        let genres = recommend_genres(&inputs(None, &[], &[]));
        let names: Vec<&str> = genres.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(names, vec!["pop", "rock", "acoustic"]);
        assert_relative_eq!(genres[0].weight, 0.4);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let genres = recommend_genres(&inputs(Some(BusinessType::CasualDining), &[], &[]));
        let names: Vec<&str> = genres.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(names, vec!["pop", "rock", "acoustic", "folk"]);
    }

    #[test]
    fn test_hints_for_rough_fine_dining() {
        let hints = genre_hints(&[VibeWord::Rough], Some(BusinessType::FineDining));
        assert_eq!(hints, vec!["alternative", "indie rock", "post-rock", "art rock"]);
        assert!(genre_hints(&[VibeWord::Rough], Some(BusinessType::CoffeeShop)).is_empty());
        assert_eq!(genre_hints(&[VibeWord::Youthful], None).len(), 4);
    }

    #[test]
    fn test_spend_goal_reshapes_weights() {
        let spend = GenreInputs {
            resolved_goal: OperationalGoal::HighRevenuePerCustomer,
            ..inputs(Some(BusinessType::CasualDining), &[], &[])
        };
        let weights = accumulate_genre_weights(&spend);
        assert_relative_eq!(weights.get("pop"), 0.02);
        assert_relative_eq!(weights.get("rock"), 0.02);
        assert_relative_eq!(weights.get("garage rock"), 0.01);
        assert_relative_eq!(weights.get("acoustic"), 0.6, epsilon = 1e-12);
        assert_relative_eq!(weights.get("instrumental"), 0.3);
    }

    #[test]
    fn test_exclusion_removes_every_matching_genre() {
        let excluded = [ExcludedGenre::ElectronicDance, ExcludedGenre::PunkRock];
        let weights = accumulate_genre_weights(&inputs(
            Some(BusinessType::BarLounge),
            &[VibeWord::Rough, VibeWord::Hip],
            &excluded,
        ));
        for genre in weights.genres() {
            assert!(!is_genre_excluded(genre, &excluded), "{genre} survived");
        }
        assert_relative_eq!(weights.get("electronic"), 0.0);
        assert_relative_eq!(weights.get("deep house"), 0.0);
    }

    #[test]
    fn test_folk_exclusion_over_matches_compound_genres() {
        // Known over-match: substring matching also drops compound labels
        assert!(is_genre_excluded("indie-folk-rock", &[ExcludedGenre::Folk]));
        assert!(is_genre_excluded("mediterranean folk", &[ExcludedGenre::Folk]));
        // and short genres contained in a keyword
        assert!(is_genre_excluded("rock", &[ExcludedGenre::Folk]));
    }

    #[test]
    fn test_output_is_capped_and_sorted() {
        let genres = recommend_genres(&inputs(
            Some(BusinessType::BarLounge),
            &[VibeWord::Luxurious, VibeWord::Hip, VibeWord::Energetic, VibeWord::Youthful],
            &[],
        ));
        assert_eq!(genres.len(), MAX_SECONDARY_GENRES);
        assert!(genres.windows(2).all(|w| w[0].weight >= w[1].weight));
    }
}

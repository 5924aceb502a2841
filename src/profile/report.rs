use super::answers::VibeWord;
use super::MusicProfile;
use serde::Serialize;

/// Vibe words that push the profile far from the goal baseline
const STRONG_VIBE_WORDS: [VibeWord; 4] = [
    VibeWord::Luxurious,
    VibeWord::Rough,
    VibeWord::Energetic,
    VibeWord::Youthful,
];

/// Rough return-on-investment estimate for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiEstimate {
    pub revenue_increase: String,
    pub dwell_time_increase: String,
    pub customer_satisfaction: String,
    pub monthly_impact: String,
    pub implementation_time: String,
}

/// Staged rollout advice for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationPlan {
    pub immediate: Vec<String>,
    pub weekly: Vec<String>,
    pub monthly: Vec<String>,
}

fn revenue_points(profile: &MusicProfile) -> i64 {
    let f = &profile.features;
    let mut base: i64 = 5;

    if f.acousticness > 0.7 {
        base += 15;
    }
    if f.tempo < 80.0 {
        base += 12;
    }
    if f.instrumentalness > 0.6 {
        base += 8;
    }
    if f.energy < 0.4 {
        base += 10;
    }

    if let Some(context) = profile.cultural_context.as_ref().filter(|c| c.score > 0.5) {
        base += (context.score * 10.0).round() as i64;
    }

    base += profile.demographics.len() as i64;

    if profile.vibe_words.iter().any(|w| STRONG_VIBE_WORDS.contains(w)) {
        base += 3;
    }

    base
}

pub fn calculate_roi(profile: &MusicProfile) -> RoiEstimate {
    let base = revenue_points(profile);

    RoiEstimate {
        revenue_increase: format!("{}%", base.max(5)),
        dwell_time_increase: if profile.features.tempo < 80.0 { "+56%" } else { "+25%" }.to_string(),
        customer_satisfaction: "+25%".to_string(),
        monthly_impact: format!("€{}", base * 50),
        implementation_time: "2-3 weeks".to_string(),
    }
}

pub fn generate_implementation_plan(profile: &MusicProfile) -> ImplementationPlan {
    let f = &profile.features;
    let pace = if f.tempo < 80.0 {
        "slow for longer stays"
    } else if f.tempo > 100.0 {
        "fast for turnover"
    } else {
        "balanced"
    };

    let mut immediate = vec![
        format!("Target tempo: {} BPM ({pace})", f.tempo),
        format!("Energy level: {:.1}/10", f.energy * 10.0),
        format!("Acousticness: {:.1}/10", f.acousticness * 10.0),
        format!("Instrumentalness: {:.1}/10", f.instrumentalness * 10.0),
    ];
    let mut weekly = vec![
        "A/B test different tempo ranges during peak hours".to_string(),
        "Monitor customer dwell time and satisfaction metrics".to_string(),
        "Implement time-of-day adjustments based on atmosphere settings".to_string(),
        "Track correlation between music features and sales data".to_string(),
    ];
    let monthly = vec![
        "Analyze revenue impact vs music feature data".to_string(),
        "Seasonal adjustments to energy and valence levels".to_string(),
        "Staff feedback collection and feature optimization".to_string(),
        "Expand playlist based on successful feature combinations".to_string(),
    ];

    if let Some(context) = &profile.cultural_context {
        immediate.push(format!("Cultural theme: {} music integration", context.culture.id()));
        weekly.push(format!(
            "Test {} genre performance during different time slots",
            context.culture.id()
        ));
    }

    if !profile.demographics.is_empty() {
        let names: Vec<&str> = profile.demographics.iter().map(|d| d.id()).collect();
        immediate.push(format!(
            "Target demographics: {} - optimized for {}",
            names.join(", "),
            profile.year_preferences.description
        ));
        weekly.push(
            "Monitor demographic response to music selection and adjust year preferences if needed"
                .to_string(),
        );
    }

    if !profile.vibe_words.is_empty() {
        immediate.push(
            "Enhanced vibe differentiation - monitor customer response to stronger musical character"
                .to_string(),
        );
        weekly.push("A/B test strong vs subtle vibe adjustments for customer preference".to_string());
    }

    if !profile.excluded_genres.is_empty() {
        immediate.push(format!(
            "Genre exclusions: {} categories filtered out",
            profile.excluded_genres.len()
        ));
        weekly.push("Monitor if excluded genres accidentally appear and adjust filters".to_string());
    }

    ImplementationPlan {
        immediate,
        weekly,
        monthly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::answers::{
        BrandAnswers, BusinessType, Demographic, ExternalSignals, OperationalGoal,
    };
    use crate::profile::compute_music_profile;

    fn premium_profile() -> MusicProfile {
        let answers = BrandAnswers {
            business_type: Some(BusinessType::FineDining),
            operational_goal: Some(OperationalGoal::PremiumExperience),
            demographics: vec![Demographic::FoodEnthusiasts, Demographic::BusinessProfessionals],
            vibe_words: vec![VibeWord::Luxurious],
            ..Default::default()
        };
        compute_music_profile(&answers, &ExternalSignals::default())
    }

    #[test]
    fn test_roi_rewards_calm_acoustic_profiles() {
        let profile = premium_profile();
        // acoustic, slow, instrumental, low energy, two demographics, strong vibe word
        assert_eq!(calculate_roi(&profile).revenue_increase, "55%");
        assert_eq!(calculate_roi(&profile).monthly_impact, "€2750");
        assert_eq!(calculate_roi(&profile).dwell_time_increase, "+56%");
    }

    #[test]
    fn test_plan_mentions_profile_specifics() {
        let plan = generate_implementation_plan(&premium_profile());
        assert!(plan.immediate[0].contains("slow for longer stays"));
        assert!(plan.immediate.iter().any(|line| line.starts_with("Target demographics")));
        assert_eq!(plan.monthly.len(), 4);
    }
}

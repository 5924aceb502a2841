use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of hospitality business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    FineDining,
    CasualDining,
    BrunchBreakfast,
    CoffeeShop,
    BarLounge,
    RetailFood,
    QuickService,
}

impl BusinessType {
    pub fn id(self) -> &'static str {
        match self {
            BusinessType::FineDining => "fine_dining",
            BusinessType::CasualDining => "casual_dining",
            BusinessType::BrunchBreakfast => "brunch_breakfast",
            BusinessType::CoffeeShop => "coffee_shop",
            BusinessType::BarLounge => "bar_lounge",
            BusinessType::RetailFood => "retail_food",
            BusinessType::QuickService => "quick_service",
        }
    }
}

/// What the business wants the music to do for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalGoal {
    HighRevenuePerCustomer,
    HighTableTurnover,
    #[default]
    BalancedOperation,
    PremiumExperience,
}

impl OperationalGoal {
    pub fn id(self) -> &'static str {
        match self {
            OperationalGoal::HighRevenuePerCustomer => "high_revenue_per_customer",
            OperationalGoal::HighTableTurnover => "high_table_turnover",
            OperationalGoal::BalancedOperation => "balanced_operation",
            OperationalGoal::PremiumExperience => "premium_experience",
        }
    }
}

/// Whether a descriptor leans towards recent or vintage music
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraLean {
    Modern,
    Traditional,
    Neutral,
}

/// The single overall atmosphere choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vibe {
    LocalAuthentic,
    EuropeanSophisticated,
    InternationalModern,
    ClassicTimeless,
}

impl Vibe {
    pub fn id(self) -> &'static str {
        match self {
            Vibe::LocalAuthentic => "local_authentic",
            Vibe::EuropeanSophisticated => "european_sophisticated",
            Vibe::InternationalModern => "international_modern",
            Vibe::ClassicTimeless => "classic_timeless",
        }
    }

    pub fn era_lean(self) -> EraLean {
        match self {
            Vibe::InternationalModern => EraLean::Modern,
            Vibe::LocalAuthentic | Vibe::EuropeanSophisticated | Vibe::ClassicTimeless => {
                EraLean::Traditional
            }
        }
    }
}

/// Target audience segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demographic {
    LocalsRegulars,
    FamiliesGroups,
    BusinessProfessionals,
    YoungAdults,
    TouristsVisitors,
    SeniorsMature,
    FoodEnthusiasts,
    QuickConvenience,
}

impl Demographic {
    pub fn id(self) -> &'static str {
        match self {
            Demographic::LocalsRegulars => "locals_regulars",
            Demographic::FamiliesGroups => "families_groups",
            Demographic::BusinessProfessionals => "business_professionals",
            Demographic::YoungAdults => "young_adults",
            Demographic::TouristsVisitors => "tourists_visitors",
            Demographic::SeniorsMature => "seniors_mature",
            Demographic::FoodEnthusiasts => "food_enthusiasts",
            Demographic::QuickConvenience => "quick_convenience",
        }
    }

    /// Representative release year the segment grew up with
    pub fn target_year(self) -> i32 {
        match self {
            Demographic::YoungAdults => 2000,
            Demographic::BusinessProfessionals => 1990,
            Demographic::FamiliesGroups => 1985,
            Demographic::LocalsRegulars => 1975,
            Demographic::SeniorsMature => 1950,
            Demographic::TouristsVisitors => 1985,
            Demographic::FoodEnthusiasts => 1975,
            Demographic::QuickConvenience => 1995,
        }
    }
}

/// Part of the opening hours an atmosphere choice applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "morning")]
    Morning,
    #[serde(rename = "middag")]
    Afternoon,
    #[serde(rename = "avond")]
    Evening,
}

impl TimeSlot {
    pub fn id(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "middag",
            TimeSlot::Evening => "avond",
        }
    }
}

/// Atmosphere picked for a particular time slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeChoice {
    #[serde(rename = "morning_energetic")]
    MorningEnergetic,
    #[serde(rename = "morning_rustig")]
    MorningCalm,
    #[serde(rename = "morning_productief")]
    MorningProductive,
    #[serde(rename = "middag_social")]
    AfternoonSocial,
    #[serde(rename = "middag_professioneel")]
    AfternoonProfessional,
    #[serde(rename = "middag_ontspannen")]
    AfternoonRelaxed,
    #[serde(rename = "avond_intiem")]
    EveningIntimate,
    #[serde(rename = "avond_levendig")]
    EveningLively,
    #[serde(rename = "avond_sophisticated")]
    EveningSophisticated,
}

/// Quick descriptive words for the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibeWord {
    Luxurious,
    Hip,
    Modern,
    Traditional,
    Rough,
    Happy,
    Serious,
    Calm,
    Upbeat,
    Romantic,
    Authentic,
    Energetic,
    Youthful,
}

impl VibeWord {
    pub fn id(self) -> &'static str {
        match self {
            VibeWord::Luxurious => "luxurious",
            VibeWord::Hip => "hip",
            VibeWord::Modern => "modern",
            VibeWord::Traditional => "traditional",
            VibeWord::Rough => "rough",
            VibeWord::Happy => "happy",
            VibeWord::Serious => "serious",
            VibeWord::Calm => "calm",
            VibeWord::Upbeat => "upbeat",
            VibeWord::Romantic => "romantic",
            VibeWord::Authentic => "authentic",
            VibeWord::Energetic => "energetic",
            VibeWord::Youthful => "youthful",
        }
    }

    pub fn era_lean(self) -> EraLean {
        match self {
            VibeWord::Youthful
            | VibeWord::Modern
            | VibeWord::Hip
            | VibeWord::Energetic
            | VibeWord::Upbeat => EraLean::Modern,
            VibeWord::Traditional | VibeWord::Authentic | VibeWord::Luxurious => {
                EraLean::Traditional
            }
            VibeWord::Rough
            | VibeWord::Happy
            | VibeWord::Serious
            | VibeWord::Calm
            | VibeWord::Romantic => EraLean::Neutral,
        }
    }
}

/// Genre families the business never wants to hear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludedGenre {
    HeavyMetal,
    RapHipHop,
    ElectronicDance,
    Country,
    Classical,
    PunkRock,
    Reggae,
    Folk,
}

impl ExcludedGenre {
    pub fn id(self) -> &'static str {
        match self {
            ExcludedGenre::HeavyMetal => "heavy_metal",
            ExcludedGenre::RapHipHop => "rap_hip_hop",
            ExcludedGenre::ElectronicDance => "electronic_dance",
            ExcludedGenre::Country => "country",
            ExcludedGenre::Classical => "classical",
            ExcludedGenre::PunkRock => "punk_rock",
            ExcludedGenre::Reggae => "reggae",
            ExcludedGenre::Folk => "folk",
        }
    }

    /// Keywords pruned from the recommended genre list (matched in both directions)
    pub fn profile_keywords(self) -> &'static [&'static str] {
        match self {
            ExcludedGenre::HeavyMetal => &["metal", "heavy metal", "death metal", "black metal"],
            ExcludedGenre::RapHipHop => &["hip hop", "rap", "trap"],
            ExcludedGenre::ElectronicDance => &["electronic", "edm", "house", "techno", "dance"],
            ExcludedGenre::Country => &["country", "country rock", "folk country"],
            ExcludedGenre::Classical => &["classical", "opera", "baroque"],
            ExcludedGenre::PunkRock => &["punk", "punk rock", "hard rock", "alternative rock"],
            ExcludedGenre::Reggae => &["reggae", "ska"],
            ExcludedGenre::Folk => &["folk", "folk rock", "indie folk"],
        }
    }

    /// Keywords that remove a catalog track when found anywhere in its genre text
    pub fn catalog_keywords(self) -> &'static [&'static str] {
        match self {
            ExcludedGenre::HeavyMetal => {
                &["metal", "heavy metal", "death metal", "black metal", "metalcore"]
            }
            ExcludedGenre::Country => &["country", "country rock", "folk country", "americana"],
            ExcludedGenre::RapHipHop => &["hip hop", "rap", "hip-hop", "trap", "gangsta rap"],
            ExcludedGenre::ElectronicDance => &[
                "electronic", "edm", "house", "techno", "dance", "dubstep", "trance",
            ],
            ExcludedGenre::PunkRock => &["punk", "punk rock", "hard rock", "grunge", "hardcore"],
            ExcludedGenre::Classical => {
                &["classical", "orchestra", "symphony", "baroque", "romantic"]
            }
            ExcludedGenre::Reggae => &["reggae", "ska", "dub"],
            ExcludedGenre::Folk => &["folk", "folk rock", "indie folk", "traditional folk"],
        }
    }
}

/// Answers collected by the brand questionnaire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandAnswers {
    pub restaurant_name: Option<String>,
    pub business_type: Option<BusinessType>,
    pub operational_goal: Option<OperationalGoal>,
    pub vibe: Option<Vibe>,
    pub demographics: Vec<Demographic>,
    pub time_atmosphere: BTreeMap<TimeSlot, TimeChoice>,
    pub vibe_words: Vec<VibeWord>,
    pub excluded_genres: Vec<ExcludedGenre>,
}

/// Audio nudges suggested by an external website/menu/image analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalAdjustments {
    pub acousticness_boost: Option<f64>,
    pub energy_adjustment: Option<f64>,
    pub instrumentalness_boost: Option<f64>,
    pub tempo_adjustment: Option<f64>,
    pub valence_adjustment: Option<f64>,
}

/// Structured output of one external analysis collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSignal {
    pub menu_items: Vec<String>,
    pub audio_feature_adjustments: Option<SignalAdjustments>,
    pub confidence_score: f64,
}

/// Everything the external analysis collaborators produced for a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSignals {
    pub website: Option<AnalysisSignal>,
    pub menu: Option<AnalysisSignal>,
}

//! Background-music selection for hospitality brands.
//!
//! [`profile::compute_music_profile`] turns questionnaire answers and optional
//! external analyses into target audio features, and [`playlist::search_catalog`]
//! picks matching tracks from a catalog.

pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod playlist;
pub mod profile;

pub use cache::CatalogCache;
pub use client::{CatalogError, CatalogSource};
pub use models::{CatalogTrack, FeatureVector};
pub use playlist::{MatchQualityScorer, SearchConfig, SearchOutcome, SearchRequest, search_catalog};
pub use profile::{BrandAnswers, ExternalSignals, MusicProfile, compute_music_profile};

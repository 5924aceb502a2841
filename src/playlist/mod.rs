pub mod config;
pub mod filters;
pub mod metadata;
pub mod ordering;
pub mod scoring;
pub mod search;

pub use config::*;
pub use metadata::*;
pub use scoring::MatchQualityScorer;
pub use search::*;

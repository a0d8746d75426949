pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use jobs::{RecommendationSweepJob, ScoreSweepJob, SweepMode};
pub use services::{
    CandidateFilter, CandidateRanker, CreditScoreCalculator, CreditScoreService,
    ProfileAggregator, RecommendationNotifier, RecommendationService,
};

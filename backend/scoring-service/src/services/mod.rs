pub mod credit;
pub mod matching;
pub mod notifier;
pub mod profile;

pub use credit::{CreditScoreCalculator, CreditScoreService, ScoreStore};
pub use matching::{CandidateFilter, CandidateRanker, JobRepository, RecommendationService};
pub use notifier::{NotificationSink, RecommendationNotifier};
pub use profile::{ProfileAggregator, ProfileDatabase};

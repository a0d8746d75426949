// ============================================
// Credit Scoring (信用評分)
// ============================================
//
// - calculator: pure ProfileSignals -> ScoreResult
// - score_store: persisted ScoreRecord per user
// - updater: aggregate, compute, persist, notify

pub mod calculator;
pub mod score_store;
pub mod updater;

pub use calculator::{CreditScoreCalculator, BASE_SCORE, MAX_SCORE, MIN_SCORE};
pub use score_store::{InMemoryScoreStore, RedisScoreStore, ScoreStore};
pub use updater::CreditScoreService;

#[cfg(test)]
pub use score_store::MockScoreStore;

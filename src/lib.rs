//! Synheart Streak - Habit streak and goal-achievement engine
//!
//! Streak turns a series of per-day health-metric observations into streak
//! statistics, an achievement rate, motivational insights, and a
//! continuation-probability estimate:
//! goal evaluation → streak scan → insights → continuation prediction.
//!
//! Every stage is a pure function of its arguments. Nothing is cached between
//! calls, so independent (user, metric) series can be analyzed concurrently.
//!
//! ## Modules
//!
//! - **goal**: Goal predicate evaluation and validation
//! - **streak**: Single-pass streak scanning
//! - **insight**: Performance tiers, messages, and milestones
//! - **prediction**: Continuation probability, risks, and recommendations
//! - **pipeline**: Validated end-to-end analysis reports

pub mod adapter;
pub mod config;
pub mod error;
pub mod goal;
pub mod insight;
pub mod pipeline;
pub mod prediction;
pub mod streak;
pub mod summary;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapter::ObservationAdapter;
pub use config::EngineConfig;
pub use error::StreakError;
pub use goal::{is_goal_met, validate_goal};
pub use insight::generate_insights;
pub use pipeline::{streak_report_json, StreakProcessor};
pub use prediction::predict_continuation;
pub use streak::compute_streak;
pub use types::{
    ContinuationPrediction, GoalDefinition, GoalKind, Insight, InsightLevel, Observation,
    ObservationSource, StreakDay, StreakReport, StreakResult, Threshold,
};

/// Streak version embedded in all reports
pub const STREAK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-streak";

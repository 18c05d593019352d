#![forbid(unsafe_code)]

pub mod completion;
pub mod grader;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod time;

pub use completion::{
    CompletionAttempt, CompletionGate, CompletionRecord, GateState, PlaybackProgress,
    ReadinessReport,
};
pub use grader::{ScoreReport, grade};
pub use matcher::{DEFAULT_SYNONYMS, GradeOutcome, SynonymRule, classify};
pub use normalize::normalize;
pub use time::Clock;

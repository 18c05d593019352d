#![forbid(unsafe_code)]

pub mod error;
pub mod lesson_session;
pub mod status;

pub use lesson_core::Clock;

pub use error::LessonSessionError;
pub use lesson_session::{DEFAULT_ROLEPLAY_TAB, GradedAnswers, LessonSession};
pub use status::LessonStatus;

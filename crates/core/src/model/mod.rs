mod answers;
mod lesson;
mod settings;

pub use answers::{AnswerSetError, UserAnswerSet};
pub use lesson::{LessonDocument, LessonDocumentDraft, LessonError, VocabularyEntry};
pub use settings::{LessonSettings, LessonSettingsDraft, SettingsError};

use lesson_core::completion::{CompletionAttempt, ReadinessReport};
use services::{LessonSession, LessonSessionError, LessonStatus};

use crate::events::{Event, HELP};

const RECORDING_UNSUPPORTED: &str = "Recording not supported in this environment.";

/// Apply one event to the session and return the lines to print.
///
/// `Quit` is handled by the caller.
pub async fn handle(
    session: &mut LessonSession,
    event: Event,
) -> Result<Vec<String>, LessonSessionError> {
    let lines = match event {
        Event::Answer { question, text } => {
            session.edit_answer(question - 1, text).await?;
            vec![format!("saved answer {question}")]
        }
        Event::Check => {
            let lesson = session.lesson();
            let labels: Vec<String> = (0..lesson.question_count())
                .filter_map(|idx| lesson.question_label(idx))
                .collect();
            let graded = session.check_answers();
            let mut lines: Vec<String> = labels
                .into_iter()
                .zip(&graded.outcomes)
                .map(|(label, outcome)| {
                    format!("{label}  [{}] {}", outcome.style(), outcome.label())
                })
                .collect();
            lines.push(graded.score_display());
            lines
        }
        Event::Reset => {
            session.reset_answers().await;
            vec!["answers cleared".to_string()]
        }
        Event::Tick { position, duration } => {
            let readiness = session.playback_tick(position, duration).await;
            vec![readiness_line(&readiness, session.can_complete())]
        }
        Event::Complete => match session.mark_complete().await {
            CompletionAttempt::Recorded(record) => vec![record.display()],
            CompletionAttempt::AlreadyCompleted => session
                .gate()
                .record()
                .map(|record| vec![record.display()])
                .unwrap_or_default(),
            CompletionAttempt::NotReady(report) => {
                vec![format!("not ready yet: {}", missing(&report).join(", "))]
            }
        },
        Event::Resume => match session.take_resume() {
            Some(position) => vec![format!("seek to {position}s")],
            None => vec!["nothing to resume".to_string()],
        },
        Event::Tab(name) => {
            let script = session.select_roleplay_tab(&name);
            vec![script.to_string()]
        }
        Event::Transcript => vec![session.lesson().transcript_text()],
        Event::Questions => {
            let lesson = session.lesson();
            (0..lesson.question_count())
                .filter_map(|idx| {
                    let label = lesson.question_label(idx)?;
                    let answer = session.answers().get(idx).unwrap_or("");
                    Some(format!("{label}\n   > {answer}"))
                })
                .collect()
        }
        Event::Vocabulary => session
            .lesson()
            .vocabulary()
            .iter()
            .map(|entry| format!("{} | {} | {}", entry.term, entry.meaning, entry.example))
            .collect(),
        Event::Record => vec![RECORDING_UNSUPPORTED.to_string()],
        Event::Status => status_lines(&session.status()),
        Event::Help => HELP.iter().map(|line| (*line).to_string()).collect(),
        Event::Quit => Vec::new(),
    };
    Ok(lines)
}

fn missing(report: &ReadinessReport) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !report.listened_enough {
        missing.push("listen to more of the audio");
    }
    if !report.has_any_score {
        missing.push("check your answers");
    }
    if !report.vocab_loaded {
        missing.push("vocabulary not loaded");
    }
    missing
}

fn readiness_line(report: &ReadinessReport, can_complete: bool) -> String {
    if can_complete {
        "ready to mark complete".to_string()
    } else if report.is_ready() {
        "lesson already completed".to_string()
    } else {
        format!("not ready yet: {}", missing(report).join(", "))
    }
}

fn status_lines(status: &LessonStatus) -> Vec<String> {
    let mut lines = vec![format!(
        "answered {} of {}",
        status.answered, status.total_questions
    )];
    if let Some(score) = status.score {
        lines.push(score.to_string());
    }
    match &status.completed_on {
        Some(done) => lines.push(done.clone()),
        None => lines.push(readiness_line(&status.readiness, status.can_complete)),
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lesson_core::model::{LessonDocument, LessonSettings};
    use lesson_core::time::fixed_clock;
    use storage::repository::InMemoryStore;

    use super::*;

    async fn session() -> LessonSession {
        let lesson = LessonDocument::from_json(
            r#"{
                "transcript": ["one", "two"],
                "questions": ["When?", "What?"],
                "answerKey": ["Cleared within 48 hours", "mild skin rash appeared"],
                "vocabulary": [{"term": "rash", "meaning": "red skin", "example": "A rash."}],
                "roleplay": {"rep": "Rep line"}
            }"#,
        )
        .unwrap();
        LessonSession::load(
            lesson,
            LessonSettings::default(),
            Arc::new(InMemoryStore::new()),
            fixed_clock(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn check_prints_feedback_and_score() {
        let mut session = session().await;
        handle(
            &mut session,
            Event::Answer {
                question: 1,
                text: "48 hours".into(),
            },
        )
        .await
        .unwrap();

        let lines = handle(&mut session, Event::Check).await.unwrap();
        assert_eq!(
            lines,
            vec![
                "1. When?  [correct] Correct".to_string(),
                "2. What?  [wrong] No answer yet.".to_string(),
                "Score: 1 / 2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn complete_explains_what_is_missing() {
        let mut session = session().await;
        let lines = handle(&mut session, Event::Complete).await.unwrap();
        assert_eq!(
            lines,
            vec!["not ready yet: listen to more of the audio, check your answers".to_string()]
        );
    }

    #[tokio::test]
    async fn complete_after_listening_and_checking() {
        let mut session = session().await;
        handle(&mut session, Event::Check).await.unwrap();
        let tick = handle(
            &mut session,
            Event::Tick {
                position: 25.0,
                duration: Some(20.0),
            },
        )
        .await
        .unwrap();
        assert_eq!(tick, vec!["ready to mark complete".to_string()]);

        let done = handle(&mut session, Event::Complete).await.unwrap();
        assert_eq!(done, vec!["Completed on 2023-11-14 22:13:20 UTC".to_string()]);
        let again = handle(&mut session, Event::Complete).await.unwrap();
        assert_eq!(again, done);
    }

    #[tokio::test]
    async fn answer_to_missing_question_is_an_error() {
        let mut session = session().await;
        let result = handle(
            &mut session,
            Event::Answer {
                question: 9,
                text: "x".into(),
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(LessonSessionError::UnknownQuestion { index: 8, count: 2 })
        ));
    }

    #[tokio::test]
    async fn record_only_prints_a_notice() {
        let mut session = session().await;
        handle(&mut session, Event::Check).await.unwrap();
        let before = session.status();

        let lines = handle(&mut session, Event::Record).await.unwrap();

        assert_eq!(
            lines,
            vec!["Recording not supported in this environment.".to_string()]
        );
        assert_eq!(session.status(), before);
        assert_eq!(session.active_tab(), "rep");
        assert!(session.answers().is_empty());
    }
}

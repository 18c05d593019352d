use crate::model::LessonSettings;

//
// ─── PLAYBACK ──────────────────────────────────────────────────────────────────
//

/// Latest position/duration reported by the audio transport, in seconds.
///
/// `duration` is `None` while the transport does not know it yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackProgress {
    pub position: f64,
    pub duration: Option<f64>,
}

impl PlaybackProgress {
    #[must_use]
    pub fn new(position: f64, duration: Option<f64>) -> Self {
        Self { position, duration }
    }

    /// Position to compare against; non-finite or negative reads as 0.
    #[must_use]
    pub fn effective_position(&self) -> f64 {
        if self.position.is_finite() && self.position > 0.0 {
            self.position
        } else {
            0.0
        }
    }

    /// Seconds of listening required: `min(duration * ratio, floor)`.
    ///
    /// Unknown, zero or non-finite durations fall back to
    /// `settings.unknown_duration_secs()`, which with default settings makes
    /// the floor the effective threshold.
    #[must_use]
    pub fn listen_threshold(&self, settings: &LessonSettings) -> f64 {
        let duration = self
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(settings.unknown_duration_secs());
        (duration * settings.listen_ratio()).min(settings.listen_floor_secs())
    }

    #[must_use]
    pub fn listened_enough(&self, settings: &LessonSettings) -> bool {
        self.effective_position() >= self.listen_threshold(settings)
    }
}

//
// ─── READINESS ─────────────────────────────────────────────────────────────────
//

/// The three independent conditions for marking a lesson complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessReport {
    pub listened_enough: bool,
    pub has_any_score: bool,
    pub vocab_loaded: bool,
}

impl ReadinessReport {
    #[must_use]
    pub fn evaluate(
        playback: &PlaybackProgress,
        has_any_score: bool,
        vocab_loaded: bool,
        settings: &LessonSettings,
    ) -> Self {
        Self {
            listened_enough: playback.listened_enough(settings),
            has_any_score,
            vocab_loaded,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.listened_enough && self.has_any_score && self.vocab_loaded
    }
}

//
// ─── COMPLETION GATE ───────────────────────────────────────────────────────────
//

/// Persisted proof of completion: the stamp shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    stamp: String,
}

impl CompletionRecord {
    #[must_use]
    pub fn new(stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
        }
    }

    #[must_use]
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// e.g. `"Completed on 2023-11-14 22:13:20 UTC"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("Completed on {}", self.stamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Incomplete,
    Completed,
}

/// Result of an explicit "mark complete" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionAttempt {
    /// The transition fired; the new record must be persisted.
    Recorded(CompletionRecord),
    /// Already terminal; nothing changed.
    AlreadyCompleted,
    /// Conditions not met; nothing changed.
    NotReady(ReadinessReport),
}

/// `Incomplete -> Completed`, fired only by [`CompletionGate::mark_complete`]
/// while ready. `Completed` is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionGate {
    record: Option<CompletionRecord>,
}

impl CompletionGate {
    /// Start in `Completed` iff a record was found in the store at load time.
    #[must_use]
    pub fn new(existing: Option<CompletionRecord>) -> Self {
        Self { record: existing }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        if self.record.is_some() {
            GateState::Completed
        } else {
            GateState::Incomplete
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.record.is_some()
    }

    #[must_use]
    pub fn record(&self) -> Option<&CompletionRecord> {
        self.record.as_ref()
    }

    /// Whether the "mark complete" action should be enabled right now.
    #[must_use]
    pub fn can_complete(&self, readiness: &ReadinessReport) -> bool {
        !self.is_completed() && readiness.is_ready()
    }

    /// Apply the explicit completion action. `stamp` is only called when the
    /// transition actually fires.
    pub fn mark_complete(
        &mut self,
        readiness: &ReadinessReport,
        stamp: impl FnOnce() -> String,
    ) -> CompletionAttempt {
        if self.is_completed() {
            return CompletionAttempt::AlreadyCompleted;
        }
        if !readiness.is_ready() {
            return CompletionAttempt::NotReady(*readiness);
        }

        let record = CompletionRecord::new(stamp());
        self.record = Some(record.clone());
        CompletionAttempt::Recorded(record)
    }
}

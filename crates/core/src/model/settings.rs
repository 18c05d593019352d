use thiserror::Error;

pub const DEFAULT_KEY_PREFIX: &str = "lesson";
pub const DEFAULT_LISTEN_RATIO: f64 = 0.8;
pub const DEFAULT_LISTEN_FLOOR_SECS: f64 = 30.0;
pub const DEFAULT_UNKNOWN_DURATION_SECS: f64 = 60.0;
pub const DEFAULT_RESUME_MIN_SECS: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("key prefix must not be empty")]
    EmptyKeyPrefix,
    #[error("listen ratio must be in (0, 1], got {provided}")]
    InvalidListenRatio { provided: f64 },
    #[error("{field} must be finite and positive, got {provided}")]
    InvalidSeconds { field: &'static str, provided: f64 },
}

/// Validated knobs for one lesson page.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSettings {
    key_prefix: String,
    listen_ratio: f64,
    listen_floor_secs: f64,
    unknown_duration_secs: f64,
    resume_min_secs: f64,
}

/// Unvalidated settings; `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct LessonSettingsDraft {
    pub key_prefix: Option<String>,
    pub listen_ratio: Option<f64>,
    pub listen_floor_secs: Option<f64>,
    pub unknown_duration_secs: Option<f64>,
    pub resume_min_secs: Option<f64>,
}

impl LessonSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the prefix is blank, the ratio is outside
    /// `(0, 1]`, or any duration is not a positive finite number.
    pub fn validate(self) -> Result<LessonSettings, SettingsError> {
        let key_prefix = self
            .key_prefix
            .map(|val| val.trim().to_string())
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        if key_prefix.is_empty() {
            return Err(SettingsError::EmptyKeyPrefix);
        }

        let listen_ratio = self.listen_ratio.unwrap_or(DEFAULT_LISTEN_RATIO);
        if !(listen_ratio > 0.0 && listen_ratio <= 1.0) {
            return Err(SettingsError::InvalidListenRatio {
                provided: listen_ratio,
            });
        }

        let listen_floor_secs = positive_secs(
            "listen floor",
            self.listen_floor_secs.unwrap_or(DEFAULT_LISTEN_FLOOR_SECS),
        )?;
        let unknown_duration_secs = positive_secs(
            "unknown duration",
            self.unknown_duration_secs
                .unwrap_or(DEFAULT_UNKNOWN_DURATION_SECS),
        )?;
        let resume_min_secs = self.resume_min_secs.unwrap_or(DEFAULT_RESUME_MIN_SECS);
        if !resume_min_secs.is_finite() || resume_min_secs < 0.0 {
            return Err(SettingsError::InvalidSeconds {
                field: "resume minimum",
                provided: resume_min_secs,
            });
        }

        Ok(LessonSettings {
            key_prefix,
            listen_ratio,
            listen_floor_secs,
            unknown_duration_secs,
            resume_min_secs,
        })
    }
}

fn positive_secs(field: &'static str, value: f64) -> Result<f64, SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SettingsError::InvalidSeconds {
            field,
            provided: value,
        })
    }
}

impl LessonSettings {
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Store key for the last playback position.
    #[must_use]
    pub fn position_key(&self) -> String {
        format!("{}-time", self.key_prefix)
    }

    /// Store key for the completion stamp.
    #[must_use]
    pub fn completion_key(&self) -> String {
        format!("{}-done", self.key_prefix)
    }

    /// Store key for the serialized answer set.
    #[must_use]
    pub fn answers_key(&self) -> String {
        format!("{}-qa", self.key_prefix)
    }

    #[must_use]
    pub fn listen_ratio(&self) -> f64 {
        self.listen_ratio
    }

    #[must_use]
    pub fn listen_floor_secs(&self) -> f64 {
        self.listen_floor_secs
    }

    #[must_use]
    pub fn unknown_duration_secs(&self) -> f64 {
        self.unknown_duration_secs
    }

    #[must_use]
    pub fn resume_min_secs(&self) -> f64 {
        self.resume_min_secs
    }
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            listen_ratio: DEFAULT_LISTEN_RATIO,
            listen_floor_secs: DEFAULT_LISTEN_FLOOR_SECS,
            unknown_duration_secs: DEFAULT_UNKNOWN_DURATION_SECS,
            resume_min_secs: DEFAULT_RESUME_MIN_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_yields_defaults() {
        let settings = LessonSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, LessonSettings::default());
        assert_eq!(settings.answers_key(), "lesson-qa");
    }

    #[test]
    fn prefix_is_trimmed_and_used_for_keys() {
        let settings = LessonSettingsDraft {
            key_prefix: Some("  ps-ae ".into()),
            ..LessonSettingsDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(settings.position_key(), "ps-ae-time");
        assert_eq!(settings.completion_key(), "ps-ae-done");
    }

    #[test]
    fn rejects_blank_prefix() {
        let err = LessonSettingsDraft {
            key_prefix: Some("   ".into()),
            ..LessonSettingsDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, SettingsError::EmptyKeyPrefix);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let ratio = LessonSettingsDraft {
            listen_ratio: Some(1.5),
            ..LessonSettingsDraft::default()
        }
        .validate();
        assert!(matches!(ratio, Err(SettingsError::InvalidListenRatio { .. })));

        let floor = LessonSettingsDraft {
            listen_floor_secs: Some(f64::NAN),
            ..LessonSettingsDraft::default()
        }
        .validate();
        assert!(matches!(floor, Err(SettingsError::InvalidSeconds { .. })));
    }
}

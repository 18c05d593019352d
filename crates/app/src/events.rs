use std::fmt;

/// One line of learner/transport input.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `answer <n> <text>`; `n` is the 1-based question number.
    Answer { question: usize, text: String },
    Check,
    Reset,
    /// `tick <position> [duration]`.
    Tick { position: f64, duration: Option<f64> },
    Complete,
    Resume,
    Tab(String),
    Transcript,
    Questions,
    Vocabulary,
    /// Practice recording; only answered with a capability notice.
    Record,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidNumber { command: &'static str, raw: String },
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Unknown(cmd) => write!(f, "unknown command: {cmd} (try `help`)"),
            EventError::MissingArgument { command } => {
                write!(f, "{command} is missing an argument")
            }
            EventError::InvalidNumber { command, raw } => {
                write!(f, "{command}: not a number: {raw}")
            }
        }
    }
}

impl std::error::Error for EventError {}

impl Event {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `EventError` for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, EventError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(cmd, rest)| (cmd, rest.trim()));

        let event = match command {
            "answer" => {
                let (number, text) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(n, text)| (n, text.trim_start()));
                if number.is_empty() {
                    return Err(EventError::MissingArgument { command: "answer" });
                }
                let question = number
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| EventError::InvalidNumber {
                        command: "answer",
                        raw: number.to_string(),
                    })?;
                Event::Answer {
                    question,
                    text: text.to_string(),
                }
            }
            "check" => Event::Check,
            "reset" => Event::Reset,
            "tick" => {
                let mut parts = rest.split_whitespace();
                let position = parts
                    .next()
                    .ok_or(EventError::MissingArgument { command: "tick" })
                    .and_then(|raw| parse_secs("tick", raw))?;
                let duration = parts.next().map(|raw| parse_secs("tick", raw)).transpose()?;
                Event::Tick { position, duration }
            }
            "complete" => Event::Complete,
            "resume" => Event::Resume,
            "tab" => {
                if rest.is_empty() {
                    return Err(EventError::MissingArgument { command: "tab" });
                }
                Event::Tab(rest.to_string())
            }
            "transcript" => Event::Transcript,
            "questions" => Event::Questions,
            "vocab" => Event::Vocabulary,
            "record" => Event::Record,
            "status" => Event::Status,
            "help" => Event::Help,
            "quit" | "exit" => Event::Quit,
            other => return Err(EventError::Unknown(other.to_string())),
        };
        Ok(Some(event))
    }
}

fn parse_secs(command: &'static str, raw: &str) -> Result<f64, EventError> {
    raw.parse::<f64>().map_err(|_| EventError::InvalidNumber {
        command,
        raw: raw.to_string(),
    })
}

pub const HELP: &[&str] = &[
    "answer <n> <text>    type an answer for question n",
    "check                grade all answers",
    "reset                clear answers and score",
    "tick <pos> [dur]     report playback position/duration in seconds",
    "complete             mark the lesson complete",
    "resume               jump back to the saved playback position",
    "tab <name>           show a roleplay script",
    "record               practice recording (if supported)",
    "transcript | questions | vocab | status",
    "quit",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answer_with_free_text() {
        let event = Event::parse("answer 2   a mild  skin rash ").unwrap();
        assert_eq!(
            event,
            Some(Event::Answer {
                question: 2,
                text: "a mild  skin rash".into()
            })
        );
    }

    #[test]
    fn answer_without_text_clears_field() {
        assert_eq!(
            Event::parse("answer 1").unwrap(),
            Some(Event::Answer {
                question: 1,
                text: String::new()
            })
        );
    }

    #[test]
    fn rejects_zero_or_missing_question_number() {
        assert!(matches!(
            Event::parse("answer 0 x"),
            Err(EventError::InvalidNumber { .. })
        ));
        assert_eq!(
            Event::parse("answer"),
            Err(EventError::MissingArgument { command: "answer" })
        );
    }

    #[test]
    fn parses_tick_with_optional_duration() {
        assert_eq!(
            Event::parse("tick 12.5").unwrap(),
            Some(Event::Tick {
                position: 12.5,
                duration: None
            })
        );
        assert_eq!(
            Event::parse("tick 25 20").unwrap(),
            Some(Event::Tick {
                position: 25.0,
                duration: Some(20.0)
            })
        );
        assert!(Event::parse("tick soon").is_err());
    }

    #[test]
    fn parses_record() {
        assert_eq!(Event::parse(" record ").unwrap(), Some(Event::Record));
        assert!(HELP.iter().any(|line| line.starts_with("record")));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Event::parse("   ").unwrap(), None);
        assert_eq!(
            Event::parse("dance"),
            Err(EventError::Unknown("dance".into()))
        );
    }
}

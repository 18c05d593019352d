use std::fmt;
use std::path::PathBuf;

use lesson_core::model::{LessonDocument, LessonSettingsDraft};
use services::{Clock, LessonSession};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod dispatch;
mod events;

use events::Event;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--lesson <path>] [--db <sqlite_url>] [--key-prefix <prefix>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --lesson assets/data/lesson.json");
    eprintln!("  --db sqlite://lesson.sqlite3");
    eprintln!("  --key-prefix lesson");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LESSON_PATH, LESSON_DB_URL, LESSON_KEY_PREFIX");
    eprintln!("  RUST_LOG (default info), LESSON_LOG_JSON=1 for JSON logs");
    eprintln!();
    eprintln!("Commands are read from stdin, one per line; type `help`.");
}

#[derive(Debug, PartialEq)]
struct Args {
    lesson_path: PathBuf,
    db_url: String,
    key_prefix: Option<String>,
    show_help: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut lesson_path = env("LESSON_PATH")
            .map_or_else(|| PathBuf::from("assets/data/lesson.json"), PathBuf::from);
        let mut db_url = env("LESSON_DB_URL")
            .map_or_else(|| "sqlite://lesson.sqlite3".into(), normalize_sqlite_url);
        let mut key_prefix = env("LESSON_KEY_PREFIX");
        let mut show_help = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lesson" => lesson_path = PathBuf::from(require_value(args, "--lesson")?),
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--key-prefix" => key_prefix = Some(require_value(args, "--key-prefix")?),
                "--help" | "-h" => show_help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            lesson_path,
            db_url,
            key_prefix,
            show_help,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LESSON_LOG_JSON").is_ok_and(|v| v == "1");
    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.show_help {
        print_usage();
        return Ok(());
    }

    init_tracing();

    let settings = LessonSettingsDraft {
        key_prefix: parsed.key_prefix.clone(),
        ..LessonSettingsDraft::default()
    }
    .validate()?;

    let raw = tokio::fs::read_to_string(&parsed.lesson_path).await?;
    let lesson = LessonDocument::from_json(&raw)?;
    tracing::info!(path = %parsed.lesson_path.display(), "lesson loaded");

    // Open + migrate SQLite at startup; core/services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let mut session = LessonSession::load(lesson, settings, storage.kv, Clock::default()).await?;

    if let Some(position) = session.resume_offer() {
        println!("Resume from {position}s? (type `resume`)");
    }
    if let Some(record) = session.gate().record() {
        println!("{}", record.display());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match Event::parse(&line) {
            Ok(Some(Event::Quit)) => break,
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match dispatch::handle(&mut session, event).await {
            Ok(output) => {
                for out in output {
                    println!("{out}");
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use services::{
    AnswerResult, Clock, ProgressObserver, ProgressSnapshot, StickerBook, TitleMatch,
};
use sticker_core::model::{BookSettings, OptionLetter, QuizOutcome, QuizView, RewardId, SlotStatus};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

mod config;

use config::BookFile;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingRewardId,
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingRewardId => write!(f, "attempt requires a reward id"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC 3339): {raw}")
            }
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
    eprintln!("  sticker-book [status]        [options]");
    eprintln!("  sticker-book attempt <id>    [options]");
    eprintln!("  sticker-book wait            [options]   # count down the cooldown");
    eprintln!("  sticker-book certificate     [options]");
    eprintln!("  sticker-book reset           [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     default sqlite://sticker-book.sqlite3");
    eprintln!("  --book <path>         default book.toml");
    eprintln!("  --now <rfc3339>       pin the clock");
    eprintln!("  --lesson <title>      a title on the current page (repeatable)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STICKER_DB_URL, STICKER_BOOK, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Attempt(RewardId),
    Wait,
    Certificate,
    Reset,
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    book_path: PathBuf,
    now: Option<DateTime<Utc>>,
    lessons: Vec<String>,
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();

        let command = match args.next_if(|arg| !arg.starts_with('-')) {
            None => Command::Status,
            Some(first) => match first.as_str() {
                "status" => Command::Status,
                "wait" => Command::Wait,
                "certificate" => Command::Certificate,
                "reset" => Command::Reset,
                "attempt" => {
                    let raw = args.next().ok_or(ArgsError::MissingRewardId)?;
                    let id = raw.parse().map_err(|_| ArgsError::MissingRewardId)?;
                    Command::Attempt(id)
                }
                _ => return Err(ArgsError::UnknownArg(first)),
            },
        };

        let mut db_url = std::env::var("STICKER_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://sticker-book.sqlite3".into(), normalize_sqlite_url);
        let mut book_path = std::env::var("STICKER_BOOK")
            .ok()
            .map_or_else(|| PathBuf::from("book.toml"), PathBuf::from);
        let mut now = None;
        let mut lessons = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--book" => book_path = require_value(&mut args, "--book")?.into(),
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?;
                    now = Some(parsed.with_timezone(&Utc));
                }
                "--lesson" => lessons.push(require_value(&mut args, "--lesson")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            book_path,
            now,
            lessons,
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

/// Prints engine signals as terminal lines.
struct TerminalObserver;

impl ProgressObserver for TerminalObserver {
    fn on_quiz_feedback(&self, outcome: QuizOutcome) {
        match outcome {
            QuizOutcome::JustCorrect => println!("Correct!"),
            QuizOutcome::JustIncorrect => println!("Not quite, try again."),
            QuizOutcome::Pending => {}
        }
    }

    fn on_completed_once(&self) {
        println!();
        println!("*** Sticker book complete! Every sticker collected. ***");
    }
}

fn print_status(snapshot: &ProgressSnapshot, book: &StickerBook) {
    println!("Stickers: {}", snapshot.badge());
    for slot in &snapshot.slots {
        let name = book
            .catalog()
            .get(slot.index)
            .map_or("?", |reward| reward.name());
        let marker = match slot.status {
            SlotStatus::Collected => "[x]",
            SlotStatus::Claimable => "[ ]",
            SlotStatus::LockedBySequence => "[-]",
            SlotStatus::LockedByCooldown => "[~]",
        };
        println!("  {marker} {:<12} {name}", slot.reward_id.as_str());
    }
    if let Some(countdown) = snapshot.countdown() {
        println!("Next sticker in {countdown}");
    } else if let Some(slot) = snapshot.claimable() {
        println!("Next: sticker-book attempt {}", slot.reward_id);
    }
}

fn print_question(view: &QuizView) {
    println!("{}: {}", view.reward_name, view.prompt);
    for (letter, text) in &view.options {
        println!("  {letter}) {text}");
    }
}

async fn run_attempt(book: &mut StickerBook, id: &RewardId) -> Result<(), Box<dyn std::error::Error>> {
    let Some(view) = book.request_attempt(id).await else {
        println!("{id} cannot be attempted right now.");
        print_status(&book.snapshot(), book);
        return Ok(());
    };
    print_question(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Answer (blank to stop): ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            book.cancel_quiz();
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            book.cancel_quiz();
            return Ok(());
        }
        let Ok(letter) = line.parse::<OptionLetter>() else {
            println!("Please answer with one of the listed letters.");
            continue;
        };

        match book.submit_answer(letter).await? {
            AnswerResult::Incorrect => book.clear_feedback(),
            AnswerResult::Claimed => {
                book.acknowledge_correct();
                print_status(&book.snapshot(), book);
                return Ok(());
            }
            AnswerResult::Stale => {
                println!("That sticker was already claimed elsewhere.");
                book.acknowledge_correct();
                return Ok(());
            }
            AnswerResult::NoQuiz | AnswerResult::Ignored => return Ok(()),
        }
    }
}

async fn run_wait(book: &mut StickerBook) -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut ticks) = book.cooldown_ticks() else {
        println!("No cooldown running.");
        return Ok(());
    };
    while ticks.changed().await.is_ok() {
        let left = *ticks.borrow_and_update();
        let left = chrono::Duration::from_std(left).unwrap_or_default();
        print!("\rNext sticker in {}  ", sticker_core::cooldown::format_countdown(left));
        std::io::stdout().flush()?;
        if left.is_zero() {
            break;
        }
    }
    println!();
    let snapshot = book.refresh().await?;
    print_status(&snapshot, book);
    Ok(())
}

/// The page titles given on the command line, checked against the book's target lesson.
fn lesson_gate(settings: &BookSettings, titles: &[String]) -> Arc<TitleMatch> {
    let lesson = Arc::new(TitleMatch::from_settings(settings));
    lesson.set_titles(titles.iter().cloned());
    lesson
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    debug!(?args, "parsed arguments");

    let book_def = BookFile::load(&args.book_path)?.into_book()?;

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let clock = args.now.map_or_else(Clock::default, Clock::fixed);
    let lesson = lesson_gate(&book_def.settings, &args.lessons);
    let mut book = StickerBook::open(
        Arc::new(book_def.catalog),
        book_def.settings,
        storage.records,
        clock,
    )
    .await
    .with_observer(Arc::new(TerminalObserver))
    .with_cooldown_ticks(StdDuration::from_secs(1))
    .with_lesson_context(lesson);
    if !book.is_visible() {
        println!("This sticker book belongs to another lesson.");
        return Ok(());
    }

    let snapshot = book.refresh().await?;
    match args.command {
        Command::Status => print_status(&snapshot, &book),
        Command::Attempt(id) => run_attempt(&mut book, &id).await?,
        Command::Wait => run_wait(&mut book).await?,
        Command::Certificate => match book.certificate(args.now.unwrap_or_else(Utc::now)) {
            Some(cert) => {
                println!("Certificate of completion, awarded {}", cert.awarded_on);
                for entry in cert.rewards {
                    println!("  {} ({})", entry.name, entry.artwork);
                }
            }
            None => println!("Collect every sticker to earn the certificate ({}).", snapshot.badge()),
        },
        Command::Reset => {
            let snapshot = book.reset().await?;
            println!("Progress cleared.");
            print_status(&snapshot, &book);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

use std::fmt;
use std::io::{BufRead, Write};
use std::time::Instant;

use services::{AppServices, Clock, LearningSession};
use tracing_subscriber::EnvFilter;
use tutor_core::model::{Achievement, CodeExample, Question, Topic, TopicId};
use tutor_core::time::format_time_spent;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingTopic { command: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingTopic { command } => write!(f, "{command} requires a topic id"),
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
    eprintln!("  cargo run -p app -- topics              [--db <sqlite_url>] [--content <dir>]");
    eprintln!("  cargo run -p app -- progress            [--db <sqlite_url>]");
    eprintln!(
        "  cargo run -p app -- quiz <topic-id>     [--db <sqlite_url>] [--content <dir>] [--shuffle]"
    );
    eprintln!("  cargo run -p app -- examples <topic-id> [--content <dir>]");
    eprintln!("  cargo run -p app -- challenges          [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset               [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://tutor.sqlite3");
    eprintln!("  --content content");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_DB_URL, TUTOR_CONTENT_DIR, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Topics,
    Progress,
    Quiz(TopicId),
    Examples(TopicId),
    Challenges,
    Reset,
}

impl Command {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topic = |command: &'static str| {
            args.next()
                .filter(|arg| !arg.starts_with("--"))
                .map(TopicId::new)
                .ok_or(ArgsError::MissingTopic { command })
        };
        match name {
            "topics" => Ok(Self::Topics),
            "progress" => Ok(Self::Progress),
            "quiz" => Ok(Self::Quiz(topic("quiz")?)),
            "examples" => Ok(Self::Examples(topic("examples")?)),
            "challenges" => Ok(Self::Challenges),
            "reset" => Ok(Self::Reset),
            other => Err(ArgsError::UnknownArg(other.to_owned())),
        }
    }
}

struct Args {
    command: Command,
    db_url: String,
    content_dir: String,
    shuffle: bool,
}

impl Args {
    fn parse(command: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("TUTOR_DB_URL").unwrap_or_else(|_| "sqlite://tutor.sqlite3".into()),
        );
        let mut content_dir =
            std::env::var("TUTOR_CONTENT_DIR").unwrap_or_else(|_| "content".into());
        let mut shuffle = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => content_dir = require_value(args, "--content")?,
                "--shuffle" => shuffle = true,
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
            content_dir,
            shuffle,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    let with_mode = |url: String| {
        if url == "sqlite::memory:" || url.contains("mode=") {
            url
        } else if url.contains('?') {
            format!("{url}&mode=rwc")
        } else {
            format!("{url}?mode=rwc")
        }
    };

    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return with_mode(raw);
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    with_mode(format!("sqlite://{}", absolute.display()))
}

fn prepare_sqlite_dir(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn prompt(label: &str) -> std::io::Result<Option<String>> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// Maps a typed reply onto the stored answer string. Option numbers pick
/// the option text; anything else is taken verbatim.
fn resolve_answer(question: &Question, reply: &str) -> String {
    let options = question.options.as_deref().unwrap_or_default();
    reply
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| reply.to_owned())
}

fn print_achievements(unlocked: &[Achievement]) {
    for achievement in unlocked {
        println!(
            "Achievement unlocked: {} ({})",
            achievement.title(),
            achievement.description()
        );
    }
}

async fn show_topics(mut learning: LearningSession) -> Result<(), Box<dyn std::error::Error>> {
    learning.load_topics().await?;
    write_topics(&mut std::io::stdout().lock(), learning.topics())?;
    Ok(())
}

fn write_topics(out: &mut impl Write, topics: &[Topic]) -> std::io::Result<()> {
    if topics.is_empty() {
        return writeln!(out, "No topics available.");
    }
    for topic in topics {
        let mark = if topic.is_completed() { "x" } else { " " };
        writeln!(
            out,
            "[{mark}] {:<28} {:>4.0}%  {}",
            topic.id.as_str(),
            topic.progress() * 100.0,
            topic.title
        )?;
    }
    Ok(())
}

fn show_progress(learning: &LearningSession) {
    let progress = learning.progress();
    println!(
        "Topics completed: {}   Time spent: {}",
        progress.total_topics_completed(),
        format_time_spent(progress.total_time_spent())
    );
    for record in progress.topics() {
        let best = record
            .best_score()
            .map_or_else(|| "-".to_owned(), |s| format!("{:.0}%", s * 100.0));
        println!(
            "  {:<28} {:>4.0}%  best {best:>4}  attempts {}  {}",
            record.topic_id.as_str(),
            record.progress * 100.0,
            record.attempts(),
            format_time_spent(record.time_spent)
        );
    }
    let achievements = progress.achievements();
    if achievements.is_empty() {
        println!("No achievements yet.");
    }
    for achievement in achievements {
        println!("* {}: {}", achievement.title(), achievement.description());
    }
}

async fn run_quiz(
    services: &AppServices,
    topic_id: &TopicId,
    shuffle: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut quiz = services.quiz_session().with_shuffle(shuffle);
    quiz.load_questions(topic_id).await?;
    if quiz.questions().is_empty() {
        println!("No questions for {topic_id}.");
        return Ok(());
    }

    let started = Instant::now();
    while let Some(question) = quiz.current_question().cloned() {
        println!();
        println!(
            "Question {}/{} [{}]",
            quiz.current_index() + 1,
            quiz.questions().len(),
            question.difficulty.label()
        );
        println!("{}", question.question);
        if let Some(snippet) = &question.code_snippet {
            println!("{snippet}");
        }
        for (i, option) in question.options.iter().flatten().enumerate() {
            println!("  {}. {option}", i + 1);
        }

        let Some(reply) = prompt("> ")? else {
            break;
        };
        quiz.submit_answer(&question.id, resolve_answer(&question, &reply));
        if quiz.is_answer_correct(&question.id) == Some(true) {
            println!("Correct.");
        } else {
            println!("Answer: {}", question.correct_answer);
        }
        if !question.explanation.is_empty() {
            println!("{}", question.explanation);
        }

        if quiz.is_last() {
            break;
        }
        quiz.next();
    }

    let score = quiz.finish();
    let mut learning = services.learning_session().await;
    if let Err(err) = learning.load_topics().await {
        tracing::warn!(%err, "topics unavailable, checking against the configured list");
    }
    let outcome = learning.complete_quiz(score, topic_id).await?;
    learning
        .record_time_spent(topic_id, started.elapsed().as_secs_f64())
        .await?;

    println!();
    println!(
        "Score: {:.0}%  {}",
        score * 100.0,
        if outcome.completed { "topic completed" } else { "keep practicing (70% to complete)" }
    );
    print_achievements(&outcome.unlocked);
    Ok(())
}

fn print_example(example: &CodeExample) {
    println!("== {} ({})", example.title, example.language);
    println!("{}", example.description);
    if example.is_migration_example {
        println!("-- before");
        println!("{}", example.display_code(true));
        println!("-- after");
        println!("{}", example.display_code(false));
    } else {
        println!("{}", example.code);
    }
    for note in example.highlighted_lines() {
        println!("  line {}: {}", note.line_number, note.text);
    }
    println!();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let command = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if matches!(first.as_str(), "--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::parse(&first, &mut argv),
    };

    let parsed = command
        .and_then(|command| Args::parse(command, &mut argv))
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    prepare_sqlite_dir(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, &parsed.content_dir, Clock::system()).await?;
    tracing::debug!(db = %parsed.db_url, content = %parsed.content_dir, "services ready");

    match &parsed.command {
        Command::Topics => show_topics(services.learning_session().await).await,
        Command::Progress => {
            show_progress(&services.learning_session().await);
            Ok(())
        }
        Command::Quiz(topic_id) => run_quiz(&services, topic_id, parsed.shuffle).await,
        Command::Examples(topic_id) => {
            let mut examples = services.code_example_session();
            examples.load_examples(topic_id).await?;
            if examples.examples().is_empty() {
                println!("No code examples for {topic_id}.");
            }
            examples.examples().iter().for_each(print_example);
            Ok(())
        }
        Command::Challenges => {
            let questions = services.curated_questions().await.questions_with_fallback().await;
            if questions.is_empty() {
                println!("No community questions available.");
            }
            for question in questions {
                println!(
                    "== {} [{}, {}]",
                    question.title,
                    question.source_type,
                    question.difficulty.label()
                );
                println!("{}", question.question);
                if let Some(url) = question.source_url() {
                    println!("   {url}");
                }
                println!();
            }
            Ok(())
        }
        Command::Reset => {
            services.learning_session().await.reset_progress().await;
            println!("Progress reset.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

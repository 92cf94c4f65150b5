mod echo;
mod session;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use quizify_client::llm::prompt::{MAX_QUESTIONS, MIN_QUESTIONS};
use quizify_client::pipeline::INVALID_URL_MESSAGE;
use quizify_client::{ContentExtractor, QuizPipeline, validate_article_url};
use quizify_core::quiz::{FeedbackMode, QuizData, ResetRequested};
use quizify_core::{AppConfig, GeneratedQuiz};
use tracing_subscriber::EnvFilter;

use crate::echo::{describe_article, print_banner, print_error, print_info, print_step, print_success, print_warning};
use crate::session::Session;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "quizify")]
#[command(author, version, about = "Turn web articles into multiple-choice quizzes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output with progress and timing on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the readable text of an article
    Extract {
        /// Article or feed URL
        url: String,

        /// Print the full extraction result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract an article and generate a quiz from it
    Generate {
        /// Article or feed URL
        url: String,

        /// Write the quiz JSON to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Take a quiz saved by `generate` (use - for stdin)
    Take {
        /// Quiz JSON file
        file: String,

        /// When to reveal correctness: immediate or deferred
        #[arg(long, value_parser = parse_feedback_mode)]
        feedback: Option<FeedbackMode>,

        #[arg(long, hide = true, default_value = "1500")]
        delay_ms: u64,
    },

    /// Generate a quiz from an article and take it straight away
    Run {
        /// Article or feed URL
        url: String,

        /// When to reveal correctness: immediate or deferred
        #[arg(long, value_parser = parse_feedback_mode)]
        feedback: Option<FeedbackMode>,

        #[arg(long, hide = true, default_value = "1500")]
        delay_ms: u64,
    },
}

fn parse_feedback_mode(s: &str) -> Result<FeedbackMode, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    if let Err(e) = dispatch(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let verbose = cli.verbose;
    if verbose {
        print_banner(&config);
    }

    match cli.command {
        Command::Extract { url, json } => extract(&config, &url, json, verbose).await,
        Command::Generate { url, output } => {
            let quiz = generate(&config, &url, verbose).await?;
            write_quiz(&quiz, output.as_deref())
        }
        Command::Take { file, feedback, delay_ms } => {
            let quiz = load_quiz(&file)?;
            let mode = feedback.unwrap_or(config.feedback_mode);
            take(quiz, mode, Duration::from_millis(delay_ms)).await
        }
        Command::Run { url, feedback, delay_ms } => {
            let generated = generate(&config, &url, verbose).await?;
            let mode = feedback.unwrap_or(config.feedback_mode);
            take(generated.quiz_data, mode, Duration::from_millis(delay_ms)).await
        }
    }
}

async fn extract(config: &AppConfig, url: &str, json: bool, verbose: bool) -> Result<()> {
    let url = validate_article_url(url).map_err(|_| anyhow!(INVALID_URL_MESSAGE))?;
    let extractor = ContentExtractor::from_config(config)?;

    if verbose {
        print_step(1, 1, &format!("Extracting {url}"));
    }
    let start = Instant::now();
    let extracted = extractor.extract(&url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&extracted)?);
        if let Some(error) = &extracted.extraction_error {
            bail!("{error}");
        }
        return Ok(());
    }

    let Some(text) = extracted.text() else {
        let message = extracted.extraction_error.as_deref().unwrap_or("Failed to extract content");
        bail!("{message}");
    };

    if verbose {
        if let Some(strategy) = extracted.strategy {
            print_info(&format!("Strategy: {strategy:?}"));
        }
        print_success(&format!("Extracted {} in {:.2?}", describe_article(text), start.elapsed()));
    }
    if extracted.requires_javascript {
        print_warning("page asks for JavaScript; the text may be incomplete");
    }

    if let Some(title) = &extracted.title {
        println!("# {title}\n");
    }
    println!("{text}");
    Ok(())
}

async fn generate(config: &AppConfig, url: &str, verbose: bool) -> Result<GeneratedQuiz> {
    validate_article_url(url).map_err(|_| anyhow!(INVALID_URL_MESSAGE))?;
    let pipeline = QuizPipeline::from_config(config)?;

    if verbose {
        print_step(1, 2, &format!("Extracting {url}"));
    }
    let start = Instant::now();
    let quiz = pipeline.run(url).await?;

    let count = quiz.quiz_data.len();
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
        print_warning(&format!("expected {MIN_QUESTIONS}-{MAX_QUESTIONS} questions, got {count}"));
    }

    if verbose {
        print_step(2, 2, "Generated quiz");
        print_success(&format!(
            "{count} questions from \"{}\" in {:.2?}",
            quiz.title,
            start.elapsed()
        ));
    }
    Ok(quiz)
}

fn write_quiz(quiz: &GeneratedQuiz, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(quiz)?;
    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            print_success(&format!("Saved quiz to {}", path.display()));
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Read a quiz saved by `generate`, or a bare quiz object.
fn load_quiz(path: &str) -> Result<QuizData> {
    let raw = if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("failed to read quiz from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
    };

    let value: serde_json::Value = serde_json::from_str(&raw).context("quiz file is not valid JSON")?;
    let quiz: QuizData = if value.get("quizData").is_some() {
        serde_json::from_value::<GeneratedQuiz>(value)?.quiz_data
    } else {
        serde_json::from_value(value)?
    };

    quiz.validate().context("invalid quiz")?;
    Ok(quiz)
}

async fn take(quiz: QuizData, mode: FeedbackMode, delay: Duration) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let end = Session::new(&quiz, mode, delay, stdin.lock(), &mut stdout)?.run()?;
        stdout.flush()?;

        if let Some(score) = &end.score {
            tracing::info!(correct = score.correct_count, total = score.total, "final score");
        }
        let ResetRequested = end.reset;
        drop(quiz);
        Ok(())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feedback_mode() {
        assert_eq!(parse_feedback_mode("Immediate"), Ok(FeedbackMode::Immediate));
        assert!(parse_feedback_mode("later").is_err());
    }

    #[test]
    fn test_cli_parses_take() {
        let cli = Cli::try_parse_from(["quizify", "take", "quiz.json", "--feedback", "immediate"]).unwrap();
        match cli.command {
            Command::Take { file, feedback, delay_ms } => {
                assert_eq!(file, "quiz.json");
                assert_eq!(feedback, Some(FeedbackMode::Immediate));
                assert_eq!(delay_ms, 1500);
            }
            _ => panic!("expected take"),
        }
    }

    #[test]
    fn test_load_quiz_accepts_both_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let quiz = r#"{"title": "T", "questions": [{"id": "q1", "questionText": "?",
            "options": [{"id": "a", "text": "A"}, {"id": "b", "text": "B"}], "correctOptionId": "a"}]}"#;

        let bare = dir.path().join("bare.json");
        fs::write(&bare, quiz).unwrap();
        assert_eq!(load_quiz(bare.to_str().unwrap()).unwrap().title, "T");

        let wrapped = dir.path().join("wrapped.json");
        fs::write(&wrapped, format!(r#"{{"title": "Article", "content": "text", "quizData": {quiz}}}"#)).unwrap();
        assert_eq!(load_quiz(wrapped.to_str().unwrap()).unwrap().questions.len(), 1);
    }
}

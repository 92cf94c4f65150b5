//! Interactive quiz session on a line-oriented terminal.
//!
//! Commands (one per line):
//!
//! - `a`-`d` or `1`-`4`: choose an option for the current question
//! - `n` or an empty line: next / submit
//! - `p`: previous question
//! - `g N`: go to question N
//! - `q`: quit
//!
//! The session reads from any `BufRead` and writes to any `Write` so it can
//! be driven by tests as well as by stdin/stdout.

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;
use quizify_core::quiz::{
    FeedbackMode, QuizData, QuizQuestion, QuizRunner, ResetRequested, RunnerError, Score, Step,
};

const HELP: &str = "Commands: a-d or 1-4 choose, n/Enter next, p previous, g N go to question, q quit";

enum Command {
    Choose(usize),
    Next,
    Previous,
    Go(usize),
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "" | "n" | "next" | "s" | "submit" => return Some(Command::Next),
        "p" | "prev" | "previous" => return Some(Command::Previous),
        "q" | "quit" | "exit" => return Some(Command::Quit),
        "h" | "help" | "?" => return Some(Command::Help),
        _ => {}
    }

    if let Some(rest) = line.strip_prefix('g') {
        return rest.trim().parse::<usize>().ok().filter(|n| *n > 0).map(|n| Command::Go(n - 1));
    }
    if let Ok(n) = line.parse::<usize>() {
        return (n > 0).then(|| Command::Choose(n - 1));
    }

    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(Command::Choose(c as usize - 'a' as usize)),
        _ => None,
    }
}

/// How a session ended.
#[derive(Debug)]
pub struct SessionEnd {
    /// Score of the last finished attempt, if any.
    pub score: Option<Score>,
    /// The quiz is no longer needed once the session is over.
    pub reset: ResetRequested,
}

fn option_label(index: usize) -> char {
    char::from_u32('a' as u32 + index as u32).unwrap_or('?')
}

/// Drives a [`QuizRunner`] from line input.
pub struct Session<'q, R, W> {
    runner: QuizRunner<'q>,
    input: R,
    out: W,
    delay: Duration,
}

impl<'q, R: BufRead, W: Write> Session<'q, R, W> {
    /// `delay` overrides how long deferred feedback stays on screen.
    pub fn new(quiz: &'q QuizData, mode: FeedbackMode, delay: Duration, input: R, out: W) -> Result<Self> {
        let runner = QuizRunner::new(quiz, mode)?.with_on_complete(|answers| {
            tracing::info!(answered = answers.len(), "quiz session completed");
        });
        Ok(Self { runner, input, out, delay })
    }

    /// Run until the user quits, declines a retake or input ends.
    ///
    /// The returned [`SessionEnd`] carries the last completed score, if any
    /// attempt was finished.
    pub fn run(mut self) -> Result<SessionEnd> {
        let quiz = self.runner.quiz();
        writeln!(self.out, "{}", quiz.title.bold())?;
        writeln!(self.out, "{} questions, {} feedback. {}", quiz.len(), self.runner.mode(), HELP.dimmed())?;

        let mut last_score = None;
        loop {
            if self.runner.is_completed() {
                let score = self.runner.score();
                self.render_results(&score)?;
                last_score = Some(score);

                write!(self.out, "Retake the quiz? [y/N] ")?;
                self.out.flush()?;
                match self.read_line()? {
                    Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                        self.runner.retake()?;
                        continue;
                    }
                    _ => break,
                }
            }

            self.render_question()?;
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            let Some(command) = parse_command(&line) else {
                writeln!(self.out, "{}", format!("Unrecognised input `{}`. {HELP}", line.trim()).yellow())?;
                continue;
            };

            match command {
                Command::Choose(index) => self.choose(index)?,
                Command::Next => self.next()?,
                Command::Previous => {
                    if !self.runner.previous() {
                        writeln!(self.out, "{}", "Already at the first question.".yellow())?;
                    }
                }
                Command::Go(index) => {
                    if let Err(e) = self.runner.go_to_question(index) {
                        writeln!(self.out, "{}", e.to_string().yellow())?;
                    }
                }
                Command::Help => writeln!(self.out, "{HELP}")?,
                Command::Quit => break,
            }
        }

        Ok(SessionEnd { score: last_score, reset: self.runner.reset() })
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn choose(&mut self, index: usize) -> Result<()> {
        let Some(question) = self.runner.current_question() else {
            return Ok(());
        };
        let Some(option) = question.options.get(index) else {
            writeln!(self.out, "{}", format!("No option {}.", option_label(index)).yellow())?;
            return Ok(());
        };

        match self.runner.select_option(&question.id, &option.id) {
            Ok(()) => {
                if self.runner.feedback_visible() {
                    self.render_feedback(question)?;
                }
            }
            Err(RunnerError::AnswerLocked(_)) => {
                writeln!(self.out, "{}", "Answer already locked in. Press Enter to continue.".yellow())?;
            }
            Err(e) => writeln!(self.out, "{}", e.to_string().yellow())?,
        }
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        let question = self.runner.current_question();
        match self.runner.next_or_submit() {
            Step::Blocked => writeln!(self.out, "{}", "Choose an answer first.".yellow())?,
            Step::Unanswered { index } => {
                let n = index + 1;
                let message = format!("Question {n} is still unanswered. Use `g {n}` to go back to it.");
                writeln!(self.out, "{}", message.yellow())?;
            }
            Step::FeedbackShown { delay } => {
                if let Some(question) = question {
                    self.render_feedback(question)?;
                }
                thread::sleep(self.delay.min(delay));
                self.runner.advance();
            }
            Step::AwaitingAdvance => {
                self.runner.advance();
            }
            Step::Advanced { .. } | Step::Completed(_) | Step::Idle | Step::AlreadyCompleted => {}
        }
        Ok(())
    }

    fn render_question(&mut self) -> Result<()> {
        let (Some(index), Some(question)) = (self.runner.current_index(), self.runner.current_question()) else {
            return Ok(());
        };
        let (answered, total) = self.runner.progress();
        let selected = self.runner.answers().get(&question.id);

        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} {}",
            format!("Question {} of {}", index + 1, total).bold(),
            format!("({answered} answered)").dimmed()
        )?;
        writeln!(self.out, "{}", question.question_text)?;
        for (i, option) in question.options.iter().enumerate() {
            let marker = if selected == Some(option.id.as_str()) { "*" } else { " " };
            writeln!(self.out, " {marker} {}) {}", option_label(i), option.text)?;
        }
        Ok(())
    }

    fn render_feedback(&mut self, question: &QuizQuestion) -> Result<()> {
        let Some(correct) = self.runner.question_feedback(&question.id) else {
            return Ok(());
        };

        if correct {
            writeln!(self.out, "{}", "Correct!".green().bold())?;
        } else {
            let answer = question.correct_option().map(|o| o.text.as_str()).unwrap_or_default();
            writeln!(self.out, "{} The answer is: {}", "Incorrect.".red().bold(), answer)?;
        }
        if let Some(explanation) = &question.explanation {
            writeln!(self.out, "{}", explanation.dimmed())?;
        }
        Ok(())
    }

    fn render_results(&mut self, score: &Score) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", "═".repeat(40).dimmed())?;
        writeln!(
            self.out,
            "{}",
            format!("Score: {}/{} ({}%)", score.correct_count, score.total, score.percentage).bold()
        )?;
        writeln!(self.out, "{}", score.feedback_message().bright_cyan())?;

        let quiz = self.runner.quiz();
        for (i, question) in quiz.questions.iter().enumerate() {
            let mark = match self.runner.question_feedback(&question.id) {
                Some(true) => "✓".green().to_string(),
                Some(false) => "✗".red().to_string(),
                None => "-".dimmed().to_string(),
            };
            writeln!(self.out, " {mark} {}. {}", i + 1, question.question_text)?;
        }
        writeln!(self.out, "{}", "═".repeat(40).dimmed())?;
        Ok(())
    }
}

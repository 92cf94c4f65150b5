use owo_colors::OwoColorize;
use quizify_core::AppConfig;

use crate::VERSION;

/// Words per minute used for the reading-time estimate.
const READING_WPM: usize = 200;

/// Print the verbose-mode banner with the settings quizzes are built with
pub fn print_banner(config: &AppConfig) {
    eprintln!("\n{} {} {}", "Quizify".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    let settings = format!(
        "model {} · {} feedback · {} quizzes/day\n",
        config.llm_model, config.feedback_mode, config.daily_quiz_limit
    );
    eprintln!("{}", settings.dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Word count and reading time of extracted article text, e.g.
/// `"1,250 words, ~7 min read"`.
pub fn describe_article(text: &str) -> String {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(READING_WPM).max(1);
    format!("{} words, ~{minutes} min read", group_thousands(words))
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

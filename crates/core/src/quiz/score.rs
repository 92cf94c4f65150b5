//! Quiz scoring.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::model::{QuizData, UserAnswers};

/// Outcome of scoring a set of answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub correct_count: usize,
    pub total: usize,
    /// `round(100 * correct / total)`, 0 for an empty quiz.
    pub percentage: u32,
}

impl Score {
    /// Headline shown on the results screen for this percentage.
    pub fn feedback_message(&self) -> &'static str {
        match self.percentage {
            100.. => "Perfect Score! Outstanding!",
            80..=99 => "Excellent Job!",
            60..=79 => "Good Effort!",
            40..=59 => "Keep Practicing!",
            _ => "Better Luck Next Time!",
        }
    }
}

/// Score `answers` against `quiz`.
///
/// Answers for unknown question ids are ignored; unanswered questions count
/// as incorrect. Half percentages round up, so 1 of 8 is 13%.
pub fn score(quiz: &QuizData, answers: &UserAnswers) -> Score {
    let total = quiz.questions.len();
    let correct_count = quiz
        .questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|chosen| q.is_correct(chosen)))
        .count();

    Score { correct_count, total, percentage: percentage(correct_count, total) }
}

fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

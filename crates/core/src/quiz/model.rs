//! Quiz data model shared by the generator, the runner and the store.
//!
//! The serde representation is the camelCase wire format exchanged with the
//! LLM and with clients: `questionText`, `correctOptionId`, `quizData`.

use std::collections::{BTreeMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One answer choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizQuestionOption {
    pub id: String,
    pub text: String,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question_text: String,
    pub options: Vec<QuizQuestionOption>,
    /// Id of the option that answers the question.
    pub correct_option_id: String,
    /// Optional rationale shown alongside feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    pub fn option(&self, option_id: &str) -> Option<&QuizQuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn correct_option(&self) -> Option<&QuizQuestionOption> {
        self.option(&self.correct_option_id)
    }

    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_option_id == option_id
    }
}

/// A complete quiz. Treated as immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizData {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

/// Structural problem found while validating a quiz.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

impl QuizData {
    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Check the structural invariants a usable quiz must satisfy.
    ///
    /// The title and every question text must be non-blank, there must be at
    /// least one question, ids must be unique (questions within the quiz,
    /// options within their question) and each `correct_option_id` must
    /// name one of the question's options.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.title.trim().is_empty() {
            return Err(SchemaError("quiz title is missing".into()));
        }
        if self.questions.is_empty() {
            return Err(SchemaError("quiz has no questions".into()));
        }

        let mut question_ids = HashSet::new();
        for (index, question) in self.questions.iter().enumerate() {
            let position = index + 1;
            if question.id.trim().is_empty() {
                return Err(SchemaError(format!("question {position} has an empty id")));
            }
            if !question_ids.insert(question.id.as_str()) {
                return Err(SchemaError(format!("duplicate question id `{}`", question.id)));
            }
            if question.question_text.trim().is_empty() {
                return Err(SchemaError(format!("question `{}` has no questionText", question.id)));
            }
            if question.options.is_empty() {
                return Err(SchemaError(format!("question `{}` has no options", question.id)));
            }

            let mut option_ids = HashSet::new();
            for option in &question.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(SchemaError(format!(
                        "duplicate option id `{}` in question `{}`",
                        option.id, question.id
                    )));
                }
            }

            if question.correct_option().is_none() {
                return Err(SchemaError(format!(
                    "correctOptionId `{}` of question `{}` does not match any option",
                    question.correct_option_id, question.id
                )));
            }
        }

        Ok(())
    }
}

/// Answers recorded during a session: question id -> chosen option id.
///
/// Entries are overwritten but never removed; only a retake clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UserAnswers(BTreeMap<String, String>);

impl UserAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, returning the option it replaced.
    pub fn record(&mut self, question_id: impl Into<String>, option_id: impl Into<String>) -> Option<String> {
        self.0.insert(question_id.into(), option_id.into())
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, o)| (q.as_str(), o.as_str()))
    }
}

impl<Q: Into<String>, O: Into<String>> FromIterator<(Q, O)> for UserAnswers {
    fn from_iter<I: IntoIterator<Item = (Q, O)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(q, o)| (q.into(), o.into())).collect())
    }
}

/// Output of the extract-and-generate pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuiz {
    /// Extracted article title, falling back to the quiz title.
    pub title: String,
    /// Plain text the quiz was generated from.
    pub content: String,
    pub quiz_data: QuizData,
}

//! Chat-completion response types and quiz normalization.
//!
//! Model output is accepted in a slightly looser shape than the canonical
//! [`QuizData`] wire format and normalized on the way in:
//!
//! - missing question ids become `q{n}`, missing option ids `{question}-opt{m}`
//! - options may be bare strings
//! - a legacy `correctAnswer` / `correctAnswerIndex` (zero-based index, or an
//!   option id/text) is converted to `correctOptionId`
//!
//! The result must then pass [`QuizData::validate`].

use quizify_core::quiz::{QuizData, QuizQuestion, QuizQuestionOption};
use serde::Deserialize;

use super::error::GenerationError;
use super::prompt::{MAX_QUESTIONS, MIN_QUESTIONS, OPTIONS_PER_QUESTION};

/// Envelope returned by `POST /chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

#[derive(Debug, Deserialize)]
struct RawQuiz {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "question")]
    question_text: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    correct_option_id: Option<String>,
    #[serde(default, alias = "correctAnswerIndex")]
    correct_answer: Option<AnswerRef>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Text(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerRef {
    Index(usize),
    Label(String),
}

/// Parse the model's reply into a validated quiz.
///
/// # Errors
///
/// `EmptyResponse` for blank text, `MalformedJson` when the text is not
/// JSON, and `InvalidSchema` when the JSON is not a usable quiz.
pub fn parse_quiz(raw: &str) -> Result<QuizData, GenerationError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|source| GenerationError::MalformedJson { source, raw: raw.to_string() })?;

    if !value.is_object() {
        return Err(GenerationError::InvalidSchema("reply is not a JSON object".into()));
    }

    let quiz: RawQuiz = serde_json::from_value(value).map_err(|e| GenerationError::InvalidSchema(e.to_string()))?;
    let quiz = normalize(quiz)?;
    quiz.validate().map_err(|e| GenerationError::InvalidSchema(e.0))?;

    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&quiz.questions.len()) {
        tracing::warn!(
            questions = quiz.questions.len(),
            "model returned {} questions, expected {}-{}",
            quiz.questions.len(),
            MIN_QUESTIONS,
            MAX_QUESTIONS
        );
    }
    if let Some(question) = quiz.questions.iter().find(|q| q.options.len() != OPTIONS_PER_QUESTION) {
        tracing::warn!(question = %question.id, options = question.options.len(), "unexpected option count");
    }

    Ok(quiz)
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn normalize(raw: RawQuiz) -> Result<QuizData, GenerationError> {
    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| normalize_question(index + 1, question))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuizData { title: raw.title.map(|t| t.trim().to_string()).unwrap_or_default(), questions })
}

fn normalize_question(position: usize, raw: RawQuestion) -> Result<QuizQuestion, GenerationError> {
    let id = non_blank(raw.id).unwrap_or_else(|| format!("q{position}"));

    let options: Vec<QuizQuestionOption> = raw
        .options
        .into_iter()
        .enumerate()
        .map(|(index, option)| {
            let (option_id, text) = match option {
                RawOption::Text(text) => (None, text),
                RawOption::Full { id, text } => (non_blank(id), text),
            };
            QuizQuestionOption { id: option_id.unwrap_or_else(|| format!("{id}-opt{}", index + 1)), text }
        })
        .collect();

    let correct_option_id = match (non_blank(raw.correct_option_id), raw.correct_answer) {
        (Some(option_id), _) => option_id,
        (None, Some(answer)) => resolve_answer(&options, answer).ok_or_else(|| {
            GenerationError::InvalidSchema(format!("correct answer of question `{id}` does not match any option"))
        })?,
        (None, None) => {
            return Err(GenerationError::InvalidSchema(format!("question `{id}` has no correctOptionId")));
        }
    };

    Ok(QuizQuestion {
        id,
        question_text: raw.question_text.map(|t| t.trim().to_string()).unwrap_or_default(),
        options,
        correct_option_id,
        explanation: non_blank(raw.explanation),
    })
}

fn resolve_answer(options: &[QuizQuestionOption], answer: AnswerRef) -> Option<String> {
    match answer {
        AnswerRef::Index(index) => options.get(index).map(|option| option.id.clone()),
        AnswerRef::Label(label) => {
            let label = label.trim();
            options
                .iter()
                .find(|option| option.id == label)
                .or_else(|| options.iter().find(|option| option.text.trim() == label))
                .map(|option| option.id.clone())
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

//! Quiz domain: model, scoring and the quiz-taking state machine.

pub mod model;
pub mod runner;
pub mod score;

pub use model::{GeneratedQuiz, QuizData, QuizQuestion, QuizQuestionOption, SchemaError, UserAnswers};
pub use runner::{FEEDBACK_DELAY, FeedbackMode, QuizRunner, ResetRequested, RunnerError, SessionState, Step};
pub use score::{Score, score};

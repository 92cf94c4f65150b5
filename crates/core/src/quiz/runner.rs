//! Quiz-taking state machine.
//!
//! A `QuizRunner` owns one session over a borrowed `QuizData`. It never
//! sleeps or renders: transitions that involve a pause return a [`Step`]
//! describing what the driver should do next.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::model::{QuizData, QuizQuestion, UserAnswers};
use super::score::{Score, score};

/// How long deferred feedback stays on screen before the runner advances.
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1500);

/// When correctness feedback is revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// The first selection locks the answer and reveals feedback at once.
    Immediate,
    /// Answers may be changed until submitted with `next_or_submit`.
    #[default]
    Deferred,
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackMode::Immediate => f.write_str("immediate"),
            FeedbackMode::Deferred => f.write_str("deferred"),
        }
    }
}

impl FromStr for FeedbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(FeedbackMode::Immediate),
            "deferred" => Ok(FeedbackMode::Deferred),
            other => Err(format!("unknown feedback mode `{other}` (expected immediate or deferred)")),
        }
    }
}

/// Session state: either answering questions or showing results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    InProgress { current_index: usize, answers: UserAnswers, feedback_visible: bool },
    Completed { answers: UserAnswers },
}

impl SessionState {
    fn initial() -> Self {
        SessionState::InProgress { current_index: 0, answers: UserAnswers::new(), feedback_visible: false }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The current question has no answer yet; nothing changed.
    Blocked,
    /// The last question was submitted while the question at `index` (the
    /// first one without an answer) is still open; nothing changed.
    Unanswered { index: usize },
    /// Moved to the question at `index`.
    Advanced { index: usize },
    /// Feedback is visible; call [`QuizRunner::advance`] after `delay`.
    FeedbackShown { delay: Duration },
    /// A previous `FeedbackShown` is still waiting for `advance`.
    AwaitingAdvance,
    /// `advance` was called with nothing pending.
    Idle,
    /// The last question was submitted and the session is complete.
    Completed(Score),
    /// The session had already completed.
    AlreadyCompleted,
}

/// Rejected runner transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("quiz session is already completed")]
    Completed,

    #[error("quiz session is still in progress")]
    NotCompleted,

    #[error("unknown question `{0}`")]
    UnknownQuestion(String),

    #[error("question `{0}` is not the current question")]
    NotCurrentQuestion(String),

    #[error("unknown option `{option}` for question `{question}`")]
    UnknownOption { question: String, option: String },

    #[error("answer to question `{0}` is locked")]
    AnswerLocked(String),

    #[error("question index {index} out of range (quiz has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("question {0} has not been reached yet")]
    NotReachable(usize),

    #[error("feedback is on display; wait for the quiz to advance")]
    FeedbackPending,
}

/// Returned by [`QuizRunner::reset`]; the caller should discard the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ResetRequested;

type CompletionHook<'q> = Box<dyn FnMut(&UserAnswers) + 'q>;

/// Drives a single quiz-taking session.
pub struct QuizRunner<'q> {
    quiz: &'q QuizData,
    mode: FeedbackMode,
    state: SessionState,
    furthest_index: usize,
    awaiting_advance: bool,
    on_complete: Option<CompletionHook<'q>>,
}

impl fmt::Debug for QuizRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRunner")
            .field("quiz", &self.quiz.title)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("furthest_index", &self.furthest_index)
            .field("awaiting_advance", &self.awaiting_advance)
            .finish_non_exhaustive()
    }
}

impl<'q> QuizRunner<'q> {
    /// Start a session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::EmptyQuiz` if the quiz has no questions.
    pub fn new(quiz: &'q QuizData, mode: FeedbackMode) -> Result<Self, RunnerError> {
        if quiz.is_empty() {
            return Err(RunnerError::EmptyQuiz);
        }

        Ok(Self {
            quiz,
            mode,
            state: SessionState::initial(),
            furthest_index: 0,
            awaiting_advance: false,
            on_complete: None,
        })
    }

    /// Register a callback invoked with the final answers on completion.
    pub fn with_on_complete(mut self, hook: impl FnMut(&UserAnswers) + 'q) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn quiz(&self) -> &'q QuizData {
        self.quiz
    }

    pub fn mode(&self) -> FeedbackMode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    /// Index of the question on screen, `None` once completed.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress { current_index, .. } => Some(current_index),
            SessionState::Completed { .. } => None,
        }
    }

    pub fn current_question(&self) -> Option<&'q QuizQuestion> {
        self.current_index().and_then(|index| self.quiz.questions.get(index))
    }

    pub fn answers(&self) -> &UserAnswers {
        match &self.state {
            SessionState::InProgress { answers, .. } | SessionState::Completed { answers } => answers,
        }
    }

    pub fn feedback_visible(&self) -> bool {
        matches!(self.state, SessionState::InProgress { feedback_visible: true, .. })
    }

    /// True while deferred feedback is waiting for [`QuizRunner::advance`].
    pub fn is_awaiting_advance(&self) -> bool {
        self.awaiting_advance
    }

    /// Index of the first question without an answer.
    pub fn first_unanswered(&self) -> Option<usize> {
        let answers = self.answers();
        self.quiz.questions.iter().position(|q| !answers.is_answered(&q.id))
    }

    /// `(answered, total)` counted over the quiz's own questions.
    pub fn progress(&self) -> (usize, usize) {
        let answers = self.answers();
        let answered = self.quiz.questions.iter().filter(|q| answers.is_answered(&q.id)).count();
        (answered, self.quiz.len())
    }

    /// Whether the recorded answer to `question_id` is correct.
    ///
    /// `None` when the question is unknown or unanswered.
    pub fn question_feedback(&self, question_id: &str) -> Option<bool> {
        let question = self.quiz.question(question_id)?;
        let chosen = self.answers().get(question_id)?;
        Some(question.is_correct(chosen))
    }

    /// Score of the answers recorded so far.
    pub fn score(&self) -> Score {
        score(self.quiz, self.answers())
    }

    /// Record `option_id` as the answer to the current question.
    ///
    /// # Errors
    ///
    /// Rejected when the session is complete, the ids do not resolve, the
    /// question is not the one on screen, the answer is locked (immediate
    /// mode) or feedback for a submitted answer is on display (deferred).
    pub fn select_option(&mut self, question_id: &str, option_id: &str) -> Result<(), RunnerError> {
        let quiz = self.quiz;
        let SessionState::InProgress { current_index, answers, feedback_visible } = &mut self.state else {
            return Err(RunnerError::Completed);
        };

        let question = &quiz.questions[*current_index];
        if question.id != question_id {
            return Err(match quiz.question(question_id) {
                Some(_) => RunnerError::NotCurrentQuestion(question_id.to_string()),
                None => RunnerError::UnknownQuestion(question_id.to_string()),
            });
        }
        if question.option(option_id).is_none() {
            return Err(RunnerError::UnknownOption { question: question_id.to_string(), option: option_id.to_string() });
        }

        match self.mode {
            FeedbackMode::Immediate => {
                if answers.is_answered(question_id) {
                    return Err(RunnerError::AnswerLocked(question_id.to_string()));
                }
                answers.record(question_id, option_id);
                *feedback_visible = true;
            }
            FeedbackMode::Deferred => {
                if self.awaiting_advance {
                    return Err(RunnerError::FeedbackPending);
                }
                answers.record(question_id, option_id);
            }
        }

        Ok(())
    }

    /// Jump to the question at `index`, hiding feedback.
    ///
    /// # Errors
    ///
    /// Out-of-range indices are rejected. In immediate mode only visited
    /// questions and the one right after the furthest visited are reachable.
    pub fn go_to_question(&mut self, index: usize) -> Result<(), RunnerError> {
        let len = self.quiz.len();
        let SessionState::InProgress { current_index, feedback_visible, .. } = &mut self.state else {
            return Err(RunnerError::Completed);
        };

        if index >= len {
            return Err(RunnerError::IndexOutOfRange { index, len });
        }
        if self.mode == FeedbackMode::Immediate && index > self.furthest_index + 1 {
            return Err(RunnerError::NotReachable(index));
        }

        *current_index = index;
        *feedback_visible = false;
        self.awaiting_advance = false;
        self.furthest_index = self.furthest_index.max(index);
        Ok(())
    }

    /// Step back one question. Returns false (and changes nothing) at the
    /// first question or after completion.
    pub fn previous(&mut self) -> bool {
        let SessionState::InProgress { current_index, feedback_visible, .. } = &mut self.state else {
            return false;
        };
        if *current_index == 0 {
            return false;
        }

        *current_index -= 1;
        *feedback_visible = false;
        self.awaiting_advance = false;
        true
    }

    /// Submit the current answer and move on.
    ///
    /// Immediate mode advances (or completes) straight away. Deferred mode
    /// reveals feedback and returns [`Step::FeedbackShown`]; the driver then
    /// calls [`QuizRunner::advance`] once the delay has elapsed.
    ///
    /// The last question only completes the session once every question has
    /// an answer; otherwise [`Step::Unanswered`] names the first open one.
    pub fn next_or_submit(&mut self) -> Step {
        let quiz = self.quiz;
        let first_unanswered = self.first_unanswered();
        let SessionState::InProgress { current_index, answers, feedback_visible } = &mut self.state else {
            return Step::AlreadyCompleted;
        };

        if !answers.is_answered(&quiz.questions[*current_index].id) {
            return Step::Blocked;
        }
        if *current_index + 1 == quiz.len()
            && let Some(index) = first_unanswered
        {
            return Step::Unanswered { index };
        }

        match self.mode {
            FeedbackMode::Immediate => {
                *feedback_visible = true;
                self.step_forward()
            }
            FeedbackMode::Deferred => {
                if self.awaiting_advance {
                    return Step::AwaitingAdvance;
                }
                *feedback_visible = true;
                self.awaiting_advance = true;
                Step::FeedbackShown { delay: FEEDBACK_DELAY }
            }
        }
    }

    /// Finish a deferred submission: hide feedback and advance or complete.
    pub fn advance(&mut self) -> Step {
        if self.is_completed() {
            return Step::AlreadyCompleted;
        }
        if !self.awaiting_advance {
            return Step::Idle;
        }

        self.awaiting_advance = false;
        self.step_forward()
    }

    /// Start over after completion with no answers at the first question.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::NotCompleted` while the session is in progress.
    pub fn retake(&mut self) -> Result<(), RunnerError> {
        if !self.is_completed() {
            return Err(RunnerError::NotCompleted);
        }

        self.state = SessionState::initial();
        self.furthest_index = 0;
        self.awaiting_advance = false;
        Ok(())
    }

    /// End the session and ask the caller to drop the quiz.
    pub fn reset(self) -> ResetRequested {
        ResetRequested
    }

    fn step_forward(&mut self) -> Step {
        let last = self.quiz.len().saturating_sub(1);
        match &mut self.state {
            SessionState::InProgress { current_index, feedback_visible, .. } if *current_index < last => {
                *current_index += 1;
                *feedback_visible = false;
                self.furthest_index = self.furthest_index.max(*current_index);
                Step::Advanced { index: *current_index }
            }
            SessionState::InProgress { answers, .. } => {
                let answers = std::mem::take(answers);
                let result = score(self.quiz, &answers);
                if let Some(hook) = self.on_complete.as_mut() {
                    hook(&answers);
                }
                tracing::debug!(correct = result.correct_count, total = result.total, "quiz session completed");
                self.state = SessionState::Completed { answers };
                Step::Completed(result)
            }
            SessionState::Completed { .. } => Step::AlreadyCompleted,
        }
    }
}

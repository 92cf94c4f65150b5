//! Core types and shared functionality for quizify.
//!
//! This crate provides:
//! - The quiz model, scorer and quiz-taking state machine
//! - SQLite persistence for quizzes, results and daily quotas
//! - The in-memory handoff cache for freshly generated quizzes
//! - Unified error types and layered configuration

pub mod config;
pub mod error;
pub mod handoff;
pub mod quiz;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use handoff::{Handoff, HandoffCache, HandoffId};
pub use quiz::{GeneratedQuiz, QuizData, QuizRunner, Score, UserAnswers};
pub use store::{QuizStore, UsageLedger};

//! SQLite persistence for quizzes, results and usage quotas.
//!
//! Access goes through tokio-rusqlite so statements run on a background
//! thread. The schema is versioned by `migrations` and opened in WAL mode.

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod quizzes;
pub mod usage;

pub use connection::QuizStore;
pub use hash::content_hash;
pub use quizzes::{QuizDetails, QuizId, QuizMeta, QuizRecord, QuizRepository};
pub use usage::{QuotaLimits, QuotaReservation, UsageLedger, UsageQuota, UsageSubject};

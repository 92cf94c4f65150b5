//! MCP tool implementations.
//!
//! This module contains all tools exposed by the quizify server.

pub mod quiz_generate;
pub mod quiz_get;
pub mod quiz_handoff;
pub mod quiz_submit;

pub use quiz_generate::QuizGenerateParams;
pub use quiz_get::QuizGetParams;
pub use quiz_handoff::QuizHandoffParams;
pub use quiz_submit::QuizSubmitParams;

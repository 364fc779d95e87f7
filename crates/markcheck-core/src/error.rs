//! Exam file error types.
//!
//! Typed failures for exam content that is well-formed TOML but cannot be
//! mapped onto the data model.

use thiserror::Error;

/// Errors that can occur when turning a parsed exam file into an `Exam`.
#[derive(Debug, Error)]
pub enum ExamError {
    /// A key in a student's score table is not a question id.
    #[error("student '{student_id}': score key '{key}' is not a question id")]
    InvalidScoreKey { student_id: String, key: String },

    /// The exam date is not an ISO-8601 calendar date.
    #[error("invalid exam date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A question's max score is NaN or infinite.
    #[error("question {0}: max_score must be a finite number")]
    NonFiniteMaxScore(u32),

    /// A recorded score is NaN or infinite.
    #[error("student '{student_id}': score for question {question_id} must be a finite number")]
    NonFiniteScore { student_id: String, question_id: u32 },
}

//! markcheck-core — Exam data model, score analysis, and report snapshots.
//!
//! This crate defines the data model for exams and the pure analysis engine
//! that turns recorded scores into question, outcome, and student statistics.

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;

pub use analysis::{compute, AnalysisResult, OUTCOME_FAIL_THRESHOLD};
pub use error::ExamError;
pub use model::{Exam, ExamMetadata, LearningOutcome, QuestionConfig, Student};
pub use report::ExamReport;

//! Core data model types for markcheck.
//!
//! These are the plain-data inputs to the analysis engine: the questions of
//! an exam, the outcomes they assess, and the students who sat it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A curriculum objective that one or more questions assess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningOutcome {
    /// Join key across questions. Blank means "no outcome assigned".
    #[serde(default)]
    pub code: String,
    /// Human-readable text, usually taken from a curriculum table.
    #[serde(default)]
    pub description: String,
}

impl LearningOutcome {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Returns `true` if no outcome code is assigned.
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty()
    }
}

/// A single exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    /// Stable key used to look up a student's score for this question.
    pub id: u32,
    /// Display position on the exam paper.
    pub order: u32,
    /// Points available for this question.
    pub max_score: f64,
    /// The outcome this question assesses.
    #[serde(default)]
    pub outcome: LearningOutcome,
}

/// A student and their recorded per-question scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier for this student.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Scores keyed by question id. An absent entry counts as 0.
    #[serde(default)]
    pub scores: BTreeMap<u32, f64>,
}

impl Student {
    /// The recorded score for a question, or 0 when nothing was entered.
    pub fn score_for(&self, question_id: u32) -> f64 {
        self.scores.get(&question_id).copied().unwrap_or(0.0)
    }
}

/// Descriptive header for an exam, carried through to reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamMetadata {
    pub title: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// An exam as loaded from disk: header, questions, and the class's scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub metadata: ExamMetadata,
    #[serde(default)]
    pub questions: Vec<QuestionConfig>,
    #[serde(default)]
    pub students: Vec<Student>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_outcome_detection() {
        assert!(LearningOutcome::default().is_blank());
        assert!(LearningOutcome::new("   ", "whitespace").is_blank());
        assert!(!LearningOutcome::new("M.7.1", "").is_blank());
    }

    #[test]
    fn missing_score_reads_as_zero() {
        let student = Student {
            id: "s1".into(),
            name: "Ada".into(),
            scores: BTreeMap::from([(1, 7.5)]),
        };
        assert_eq!(student.score_for(1), 7.5);
        assert_eq!(student.score_for(2), 0.0);
    }

    #[test]
    fn student_scores_survive_json_with_integer_keys() {
        let student = Student {
            id: "s1".into(),
            name: "Ada".into(),
            scores: BTreeMap::from([(1, 10.0), (12, 3.5)]),
        };
        let json = serde_json::to_string(&student).unwrap();
        assert!(json.contains("\"12\":3.5"));
        let back: Student = serde_json::from_str(&json).unwrap();
        assert_eq!(back, student);
    }

    #[test]
    fn question_outcome_defaults_when_absent() {
        let q: QuestionConfig =
            serde_json::from_str(r#"{"id": 3, "order": 3, "max_score": 4.0}"#).unwrap();
        assert!(q.outcome.is_blank());
        assert_eq!(q.outcome.description, "");
    }
}

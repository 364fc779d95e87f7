//! TOML exam file parser.
//!
//! Loads exams from TOML files and directories, and validates their
//! contents. Validation is advisory: the analysis engine accepts whatever
//! the parser produces.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ExamError;
use crate::model::{Exam, ExamMetadata, LearningOutcome, QuestionConfig, Student};

/// Intermediate TOML structure for parsing exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    students: Vec<TomlStudent>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    title: String,
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    teacher: String,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u32,
    #[serde(default)]
    order: Option<u32>,
    max_score: f64,
    #[serde(default)]
    outcome: Option<TomlOutcome>,
}

#[derive(Debug, Deserialize)]
struct TomlOutcome {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    scores: BTreeMap<String, f64>,
}

/// Parse a single TOML file into an `Exam`.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `Exam` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let date = parsed
        .exam
        .date
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            d.trim()
                .parse::<NaiveDate>()
                .map_err(|_| ExamError::InvalidDate(d.clone()))
        })
        .transpose()
        .with_context(|| format!("invalid exam header in {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(idx, q)| {
            if !q.max_score.is_finite() {
                return Err(ExamError::NonFiniteMaxScore(q.id));
            }
            let outcome = q
                .outcome
                .map(|o| LearningOutcome {
                    code: o.code.trim().to_string(),
                    description: o.description,
                })
                .unwrap_or_default();
            Ok(QuestionConfig {
                id: q.id,
                order: q.order.unwrap_or(idx as u32 + 1),
                max_score: q.max_score,
                outcome,
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid question in {}", source_path.display()))?;

    let students = parsed
        .students
        .into_iter()
        .map(convert_student)
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid student in {}", source_path.display()))?;

    Ok(Exam {
        metadata: ExamMetadata {
            title: parsed.exam.title,
            class_name: parsed.exam.class_name,
            subject: parsed.exam.subject,
            teacher: parsed.exam.teacher,
            date,
        },
        questions,
        students,
    })
}

fn convert_student(s: TomlStudent) -> std::result::Result<Student, ExamError> {
    let mut scores = BTreeMap::new();
    for (key, value) in s.scores {
        let question_id = key
            .trim()
            .parse::<u32>()
            .map_err(|_| ExamError::InvalidScoreKey {
                student_id: s.id.clone(),
                key: key.clone(),
            })?;
        if !value.is_finite() {
            return Err(ExamError::NonFiniteScore {
                student_id: s.id.clone(),
                question_id,
            });
        }
        scores.insert(question_id, value);
    }

    Ok(Student {
        id: s.id,
        name: s.name,
        scores,
    })
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// Load a single exam file, or every exam under a directory.
pub fn load_exams(path: &Path) -> Result<Vec<Exam>> {
    if path.is_dir() {
        load_exam_directory(path)
    } else {
        Ok(vec![parse_exam(path)?])
    }
}

/// A warning from exam validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The student the warning concerns (if applicable).
    pub student_id: Option<String>,
    /// The question the warning concerns (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn exam(message: impl Into<String>) -> Self {
        Self {
            student_id: None,
            question_id: None,
            message: message.into(),
        }
    }

    fn question(question_id: u32, message: impl Into<String>) -> Self {
        Self {
            student_id: None,
            question_id: Some(question_id),
            message: message.into(),
        }
    }

    fn score(student_id: &str, question_id: u32, message: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.to_string()),
            question_id: Some(question_id),
            message: message.into(),
        }
    }
}

/// Validate an exam for data-entry issues.
///
/// None of these stop an analysis from running; they flag input that will
/// produce surprising numbers.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.questions.is_empty() {
        warnings.push(ValidationWarning::exam("exam has no questions"));
    }
    if exam.students.is_empty() {
        warnings.push(ValidationWarning::exam("exam has no students"));
    }

    let mut seen_questions = HashSet::new();
    for q in &exam.questions {
        if !seen_questions.insert(q.id) {
            warnings.push(ValidationWarning::question(
                q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if q.max_score < 0.0 {
            warnings.push(ValidationWarning::question(
                q.id,
                format!("max_score is negative ({})", q.max_score),
            ));
        }
    }

    let mut seen_students = HashSet::new();
    for s in &exam.students {
        if !seen_students.insert(s.id.as_str()) {
            warnings.push(ValidationWarning {
                student_id: Some(s.id.clone()),
                question_id: None,
                message: format!("duplicate student ID: {}", s.id),
            });
        }
    }

    // Outcome codes whose description text differs between questions
    let mut first_description: HashMap<&str, &str> = HashMap::new();
    for q in &exam.questions {
        if q.outcome.is_blank() {
            continue;
        }
        let first = *first_description
            .entry(q.outcome.code.as_str())
            .or_insert(q.outcome.description.as_str());
        if first != q.outcome.description {
            warnings.push(ValidationWarning::question(
                q.id,
                format!(
                    "outcome {} has description '{}' but was first described as '{}'",
                    q.outcome.code, q.outcome.description, first
                ),
            ));
        }
    }

    let max_scores: HashMap<u32, f64> = exam.questions.iter().map(|q| (q.id, q.max_score)).collect();
    for s in &exam.students {
        for (&question_id, &score) in &s.scores {
            let Some(&max_score) = max_scores.get(&question_id) else {
                warnings.push(ValidationWarning::score(
                    &s.id,
                    question_id,
                    format!("score recorded for unknown question {question_id}"),
                ));
                continue;
            };
            if score < 0.0 {
                warnings.push(ValidationWarning::score(
                    &s.id,
                    question_id,
                    format!("negative score {score}"),
                ));
            } else if score > max_score {
                warnings.push(ValidationWarning::score(
                    &s.id,
                    question_id,
                    format!("score {score} exceeds max_score {max_score}"),
                ));
            }
        }

        let missing: Vec<String> = exam
            .questions
            .iter()
            .filter(|q| !s.scores.contains_key(&q.id))
            .map(|q| q.id.to_string())
            .collect();
        if !missing.is_empty() {
            warnings.push(ValidationWarning {
                student_id: Some(s.id.clone()),
                question_id: None,
                message: format!(
                    "no score entered for question(s) {}, counted as 0",
                    missing.join(", ")
                ),
            });
        }
    }

    warnings
}

//! The `markcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use markcheck_core::parser::{self, ValidationWarning};

pub fn execute(exam_path: PathBuf) -> Result<()> {
    let exams = parser::load_exams(&exam_path)?;

    let mut total_warnings = 0;

    for exam in &exams {
        println!(
            "Exam: {} ({} questions, {} students)",
            exam.metadata.title,
            exam.questions.len(),
            exam.students.len()
        );

        let warnings = parser::validate_exam(exam);
        for w in &warnings {
            println!("{} WARNING: {}", warning_prefix(w), w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

pub(crate) fn warning_prefix(w: &ValidationWarning) -> String {
    match (&w.student_id, w.question_id) {
        (Some(student), Some(question)) => format!("  [{student} q{question}]"),
        (Some(student), None) => format!("  [{student}]"),
        (None, Some(question)) => format!("  [q{question}]"),
        (None, None) => "  ".to_string(),
    }
}

//! CSV export of report tables.
//!
//! Each table is written as its own file so it opens cleanly in a
//! spreadsheet. Cells for statistics that were not computed (an exam with
//! no students, say) are written as `-`.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use markcheck_core::report::ExamReport;

const MISSING: &str = "-";

/// One row per student: id, name, raw score per question, total, percentage.
pub fn write_students_csv<W: Write>(out: W, report: &ExamReport) -> Result<()> {
    let analysis = report.analysis_or_compute();
    let mut wtr = ::csv::WriterBuilder::new().has_headers(true).from_writer(out);

    let mut header = vec!["student_id".to_string(), "name".to_string()];
    header.extend(report.questions.iter().map(|q| format!("q{}", q.id)));
    header.push("total_score".into());
    header.push("percentage".into());
    wtr.write_record(&header)?;

    for s in &report.students {
        let mut row = vec![s.id.clone(), s.name.clone()];
        row.extend(report.questions.iter().map(|q| {
            s.scores
                .get(&q.id)
                .map(|score| score.to_string())
                .unwrap_or_default()
        }));
        match analysis.student(&s.id) {
            Some(stats) => {
                row.push(stats.total_score.to_string());
                row.push(format!("{:.1}", stats.percentage));
            }
            None => {
                row.push(MISSING.into());
                row.push(MISSING.into());
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per question with its class-wide statistics.
pub fn write_questions_csv<W: Write>(out: W, report: &ExamReport) -> Result<()> {
    let analysis = report.analysis_or_compute();
    let mut wtr = ::csv::WriterBuilder::new().has_headers(true).from_writer(out);

    wtr.write_record([
        "question_id",
        "order",
        "max_score",
        "outcome_code",
        "average_score",
        "success_rate",
    ])?;

    for q in &report.questions {
        let (average, rate) = match analysis.question(q.id) {
            Some(stats) => (
                format!("{:.2}", stats.average_score),
                format!("{:.1}", stats.success_rate),
            ),
            None => (MISSING.to_string(), MISSING.to_string()),
        };
        wtr.write_record([
            q.id.to_string(),
            q.order.to_string(),
            q.max_score.to_string(),
            q.outcome.code.clone(),
            average,
            rate,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One row per learning outcome.
pub fn write_outcomes_csv<W: Write>(out: W, report: &ExamReport) -> Result<()> {
    let analysis = report.analysis_or_compute();
    let mut wtr = ::csv::WriterBuilder::new().has_headers(true).from_writer(out);

    wtr.write_record(["code", "description", "success_rate", "failed"])?;

    for o in &analysis.outcome_stats {
        wtr.write_record([
            o.code.clone(),
            o.description.clone(),
            format!("{:.1}", o.success_rate),
            o.is_failed.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `<stem>-students.csv`, `<stem>-questions.csv`, and
/// `<stem>-outcomes.csv` into `dir`, returning the paths written.
pub fn write_csv_reports(report: &ExamReport, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    type TableWriter = fn(File, &ExamReport) -> Result<()>;
    let tables: [(&str, TableWriter); 3] = [
        ("students", write_students_csv),
        ("questions", write_questions_csv),
        ("outcomes", write_outcomes_csv),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (name, write_table) in tables {
        let path = dir.join(format!("{stem}-{name}.csv"));
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_table(file, report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

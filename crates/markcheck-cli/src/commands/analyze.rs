//! The `markcheck analyze` command.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use markcheck_core::config::load_config_from;
use markcheck_core::parser;
use markcheck_core::report::ExamReport;
use markcheck_report::csv::write_csv_reports;
use markcheck_report::html::write_html_report;

use super::validate::warning_prefix;

const KNOWN_FORMATS: [&str; 3] = ["json", "html", "csv"];

pub fn execute(
    exam_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let formats = match &format {
        Some(f) => parse_formats(f)?,
        None => parse_formats(&config.formats.join(","))?,
    };

    let exams = parser::load_exams(&exam_path)?;
    anyhow::ensure!(
        !exams.is_empty(),
        "no exams found in {}",
        exam_path.display()
    );

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let mut used_stems = HashSet::new();

    for exam in exams {
        let warnings = parser::validate_exam(&exam);
        for w in &warnings {
            let prefix = warning_prefix(w);
            match prefix.trim() {
                "" => tracing::warn!(exam = %exam.metadata.title, "{}", w.message),
                scope => tracing::warn!(exam = %exam.metadata.title, "{scope} {}", w.message),
            }
        }

        let report = ExamReport::new(exam);
        print_summary(&report);

        let base = format!("{}-{timestamp}", slug(&report.metadata.title));
        let stem = unique_stem(&base, &output, &mut used_stems);
        std::fs::create_dir_all(&output)?;
        write_outputs(&report, &output, &stem, &formats)?;
    }

    Ok(())
}

fn parse_formats(spec: &str) -> Result<Vec<&'static str>> {
    let mut formats = Vec::new();
    for f in spec.split(',').map(|s| s.trim().to_lowercase()) {
        if f.is_empty() {
            continue;
        }
        if f == "all" {
            return Ok(KNOWN_FORMATS.to_vec());
        }
        let Some(known) = KNOWN_FORMATS.iter().find(|k| **k == f) else {
            anyhow::bail!("unknown format '{f}', expected one of: json, html, csv, all");
        };
        if !formats.contains(known) {
            formats.push(*known);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

fn write_outputs(report: &ExamReport, output: &Path, stem: &str, formats: &[&str]) -> Result<()> {
    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "csv" => {
                for path in write_csv_reports(report, output, stem)? {
                    eprintln!("CSV table: {}", path.display());
                }
            }
            other => anyhow::bail!("unknown format: {other}"),
        }
    }
    Ok(())
}

/// First of `base`, `base-2`, `base-3`, ... not already taken in this run
/// and with no report file of that name in `output`.
fn unique_stem(base: &str, output: &Path, used: &mut HashSet<String>) -> String {
    let taken = |stem: &str| {
        used.contains(stem)
            || [
                format!("{stem}.json"),
                format!("{stem}.html"),
                format!("{stem}-students.csv"),
            ]
            .iter()
            .any(|name| output.join(name).exists())
    };

    let mut stem = base.to_string();
    let mut n = 2;
    while taken(&stem) {
        stem = format!("{base}-{n}");
        n += 1;
    }
    used.insert(stem.clone());
    stem
}

/// Lowercase, dash-separated file-name stem for an exam title.
fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "exam".to_string()
    } else {
        trimmed.to_string()
    }
}

fn print_summary(report: &ExamReport) {
    use comfy_table::{Cell, Table};

    let analysis = report.analysis_or_compute();

    eprintln!(
        "\n{} — {} students, {} questions, class average {:.1}%",
        report.metadata.title,
        analysis.student_stats.len(),
        analysis.total_questions,
        analysis.class_average
    );

    if analysis.outcome_stats.is_empty() {
        eprintln!("No learning outcomes assigned.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Outcome", "Description", "Success Rate", "Status"]);

    for o in &analysis.outcome_stats {
        table.add_row(vec![
            Cell::new(&o.code),
            Cell::new(&o.description),
            Cell::new(format!("{:.1}%", o.success_rate)),
            Cell::new(if o.is_failed { "FAILED" } else { "OK" }),
        ]);
    }

    eprintln!("{table}");
}

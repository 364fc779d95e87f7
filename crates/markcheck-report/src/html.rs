//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use markcheck_core::analysis::{AnalysisResult, OutcomeStats, OUTCOME_FAIL_THRESHOLD};
use markcheck_core::report::ExamReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an exam report.
pub fn generate_html(report: &ExamReport) -> String {
    let analysis = report.analysis_or_compute();
    let meta = &report.metadata;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>markcheck report — {}</title>\n",
        html_escape(&meta.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&meta.title)));
    let mut details = Vec::new();
    for (label, value) in [
        ("Class", &meta.class_name),
        ("Subject", &meta.subject),
        ("Teacher", &meta.teacher),
    ] {
        if !value.is_empty() {
            details.push(format!("{label}: <strong>{}</strong>", html_escape(value)));
        }
    }
    if let Some(date) = meta.date {
        details.push(format!("Date: <strong>{}</strong>", date.format("%Y-%m-%d")));
    }
    details.push(format!(
        "Generated {}",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!("<p class=\"meta\">{}</p>\n", details.join(" | ")));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Students</th><th>Questions</th><th>Class Average</th><th>Outcomes</th><th>Failed Outcomes</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{:.1}%</td><td>{}</td><td>{}</td></tr></tbody>\n",
        analysis.student_stats.len(),
        analysis.total_questions,
        analysis.class_average,
        analysis.outcome_stats.len(),
        analysis.failed_outcomes().count(),
    ));
    html.push_str("</table>\n");
    html.push_str("</section>\n");

    html.push_str(&outcome_section(&analysis));
    html.push_str(&question_section(report, &analysis));
    html.push_str(&student_section(report, &analysis));

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn outcome_section(analysis: &AnalysisResult) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"outcomes\">\n");
    html.push_str("<h2>Learning Outcomes</h2>\n");

    if analysis.outcome_stats.is_empty() {
        html.push_str("<p class=\"empty\">No learning outcomes assigned.</p>\n");
        html.push_str("</section>\n");
        return html;
    }

    html.push_str("<table class=\"outcome-table\">\n");
    html.push_str("<thead><tr><th>Code</th><th>Description</th><th>Success Rate</th><th>Status</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for o in &analysis.outcome_stats {
        let (class, status) = if o.is_failed {
            ("fail", "FAILED")
        } else {
            ("pass", "OK")
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
            class,
            html_escape(&o.code),
            html_escape(&o.description),
            o.success_rate,
            status
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str(&generate_bar_chart(&analysis.outcome_stats));
    html.push_str("</section>\n");
    html
}

fn question_section(report: &ExamReport, analysis: &AnalysisResult) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"questions\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"questions\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable('questions', 0)\">#</th><th onclick=\"sortTable('questions', 1)\">Outcome</th><th onclick=\"sortTable('questions', 2)\">Max</th><th onclick=\"sortTable('questions', 3)\">Average</th><th onclick=\"sortTable('questions', 4)\">Success Rate</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for q in &report.questions {
        let outcome = if q.outcome.is_blank() {
            "-".to_string()
        } else {
            html_escape(&q.outcome.code)
        };
        let (class, average, rate) = match analysis.question(q.id) {
            Some(stats) => (
                if stats.success_rate < OUTCOME_FAIL_THRESHOLD {
                    "fail"
                } else {
                    "pass"
                },
                format!("{:.2}", stats.average_score),
                format!("{:.1}%", stats.success_rate),
            ),
            None => ("missing", "-".to_string(), "-".to_string()),
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class, q.order, outcome, q.max_score, average, rate
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");
    html
}

fn student_section(report: &ExamReport, analysis: &AnalysisResult) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"students\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"students\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable('students', 0)\">ID</th><th onclick=\"sortTable('students', 1)\">Name</th><th onclick=\"sortTable('students', 2)\">Total</th><th onclick=\"sortTable('students', 3)\">Percentage</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for s in &report.students {
        let (total, percentage) = match analysis.student(&s.id) {
            Some(stats) => (
                stats.total_score.to_string(),
                format!("{:.1}%", stats.percentage),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&s.id),
            html_escape(&s.name),
            total,
            percentage
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");
    html
}

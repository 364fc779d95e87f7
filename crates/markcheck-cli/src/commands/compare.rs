//! The `markcheck compare` command.

use std::path::PathBuf;

use anyhow::Result;

use markcheck_core::config::load_config_from;
use markcheck_core::report::ExamReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: Option<f64>,
    fail_on_regression: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let threshold = match threshold {
        Some(t) => t,
        None => load_config_from(config_path.as_deref())?.compare_threshold,
    };
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number of percentage points"
    );

    let baseline = ExamReport::load_json(&baseline_path)?;
    let current = ExamReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );
            println!(
                "Class average: {:.1}% -> {:.1}% ({:+.1})",
                report.baseline_class_average,
                report.current_class_average,
                report.class_average_delta()
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} ({}) {:.1}% -> {:.1}% ({:+.1})",
                        r.code, r.description, r.baseline_rate, r.current_rate, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} ({}) {:.1}% -> {:.1}% ({:+.1})",
                        i.code, i.description, i.baseline_rate, i.current_rate, i.delta
                    );
                }
            }

            if report.new_outcomes > 0 {
                println!("\n{} new outcome(s)", report.new_outcomes);
            }
            if report.removed_outcomes > 0 {
                println!("{} removed outcome(s)", report.removed_outcomes);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

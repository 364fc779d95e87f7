//! Exam report snapshots with JSON persistence and outcome comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{self, AnalysisResult};
use crate::model::{Exam, ExamMetadata, QuestionConfig, Student};

/// A saved exam: its inputs plus, optionally, the analysis derived from them.
///
/// The analysis is a snapshot and can always be recomputed from `questions`
/// and `students`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub metadata: ExamMetadata,
    pub questions: Vec<QuestionConfig>,
    pub students: Vec<Student>,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

impl ExamReport {
    /// Build a report for an exam, computing its analysis.
    pub fn new(exam: Exam) -> Self {
        let analysis = analysis::compute(&exam.questions, &exam.students);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            metadata: exam.metadata,
            questions: exam.questions,
            students: exam.students,
            analysis: Some(analysis),
        }
    }

    /// The stored analysis, or a fresh one when the snapshot has none.
    pub fn analysis_or_compute(&self) -> AnalysisResult {
        match &self.analysis {
            Some(a) => a.clone(),
            None => analysis::compute(&self.questions, &self.students),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare outcome success rates against a baseline report.
    ///
    /// `threshold` is in percentage points; changes within it count as
    /// unchanged.
    pub fn compare(&self, baseline: &ExamReport, threshold: f64) -> OutcomeComparison {
        let current = self.analysis_or_compute();
        let previous = baseline.analysis_or_compute();

        let baseline_rates: HashMap<&str, f64> = previous
            .outcome_stats
            .iter()
            .map(|o| (o.code.as_str(), o.success_rate))
            .collect();

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_outcomes = 0usize;

        for outcome in &current.outcome_stats {
            let Some(&baseline_rate) = baseline_rates.get(outcome.code.as_str()) else {
                new_outcomes += 1;
                continue;
            };
            let change = OutcomeChange {
                code: outcome.code.clone(),
                description: outcome.description.clone(),
                baseline_rate,
                current_rate: outcome.success_rate,
                delta: outcome.success_rate - baseline_rate,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_outcomes = previous
            .outcome_stats
            .iter()
            .filter(|o| current.outcome(&o.code).is_none())
            .count();

        OutcomeComparison {
            regressions,
            improvements,
            unchanged,
            new_outcomes,
            removed_outcomes,
            baseline_class_average: previous.class_average,
            current_class_average: current.class_average,
        }
    }
}

/// Result of comparing two reports outcome by outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeComparison {
    /// Outcomes whose success rate went down.
    pub regressions: Vec<OutcomeChange>,
    /// Outcomes whose success rate went up.
    pub improvements: Vec<OutcomeChange>,
    /// Outcomes with no significant change.
    pub unchanged: usize,
    /// Outcomes in current but not baseline.
    pub new_outcomes: usize,
    /// Outcomes in baseline but not current.
    pub removed_outcomes: usize,
    pub baseline_class_average: f64,
    pub current_class_average: f64,
}

/// A change in one outcome's success rate, in percentage points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeChange {
    pub code: String,
    pub description: String,
    pub baseline_rate: f64,
    pub current_rate: f64,
    pub delta: f64,
}

impl OutcomeComparison {
    pub fn class_average_delta(&self) -> f64 {
        self.current_class_average - self.baseline_class_average
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));
        md.push_str(&format!(
            "**Class average:** {:.1}% -> {:.1}% ({:+.1})\n\n",
            self.baseline_class_average,
            self.current_class_average,
            self.class_average_delta()
        ));

        for (heading, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {heading}\n\n"));
            md.push_str("| Outcome | Description | Baseline | Current | Delta |\n");
            md.push_str("|---------|-------------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {:.1}% | {:+.1} |\n",
                    c.code,
                    c.description.replace('|', "\\|"),
                    c.baseline_rate,
                    c.current_rate,
                    c.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

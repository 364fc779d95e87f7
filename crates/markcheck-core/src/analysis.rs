//! Score aggregation: per-question, per-outcome, and per-student statistics.
//!
//! Everything here is a pure function of the question list and the student
//! list. Rates and percentages are on a 0–100 scale and every zero
//! denominator resolves to 0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{LearningOutcome, QuestionConfig, Student};

/// An outcome whose success rate falls strictly below this is flagged failed.
pub const OUTCOME_FAIL_THRESHOLD: f64 = 50.0;

/// Full statistical report for one exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One entry per question, in input order.
    pub question_stats: Vec<QuestionStats>,
    /// One entry per distinct non-blank outcome code, in first-seen order.
    pub outcome_stats: Vec<OutcomeStats>,
    /// One entry per student, in input order.
    pub student_stats: Vec<StudentStats>,
    /// Mean of all student percentages.
    pub class_average: f64,
    /// Number of questions analysed.
    pub total_questions: usize,
}

/// Statistics for a single question across the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: u32,
    /// Mean score over all students, absent entries counted as 0.
    pub average_score: f64,
    /// `average_score` as a percentage of the question's max score.
    pub success_rate: f64,
    pub outcome: LearningOutcome,
}

/// Statistics for a single learning outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStats {
    pub code: String,
    /// Description from the first question carrying this code.
    pub description: String,
    /// Mean of the success rates of the questions sharing this code.
    pub success_rate: f64,
    pub is_failed: bool,
}

/// Statistics for a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    pub student_id: String,
    pub total_score: f64,
    /// `total_score` as a percentage of the exam's total max score.
    pub percentage: f64,
}

impl AnalysisResult {
    /// Outcomes below the fail threshold, in report order.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &OutcomeStats> {
        self.outcome_stats.iter().filter(|o| o.is_failed)
    }

    pub fn question(&self, question_id: u32) -> Option<&QuestionStats> {
        self.question_stats
            .iter()
            .find(|q| q.question_id == question_id)
    }

    pub fn student(&self, student_id: &str) -> Option<&StudentStats> {
        self.student_stats
            .iter()
            .find(|s| s.student_id == student_id)
    }

    pub fn outcome(&self, code: &str) -> Option<&OutcomeStats> {
        self.outcome_stats.iter().find(|o| o.code == code)
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is not positive.
fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Compute the full analysis for an exam.
///
/// Returns an empty result (zero class average, zero questions) when either
/// input is empty. Scores are taken as recorded: values above a question's
/// max or below zero are not clamped.
pub fn compute(questions: &[QuestionConfig], students: &[Student]) -> AnalysisResult {
    if questions.is_empty() || students.is_empty() {
        return AnalysisResult::default();
    }

    let total_max_score: f64 = questions.iter().map(|q| q.max_score).sum();

    let student_stats: Vec<StudentStats> = students
        .iter()
        .map(|s| {
            let total_score: f64 = questions.iter().map(|q| s.score_for(q.id)).sum();
            StudentStats {
                student_id: s.id.clone(),
                total_score,
                percentage: percent_of(total_score, total_max_score),
            }
        })
        .collect();

    let class_average = student_stats.iter().map(|s| s.percentage).sum::<f64>()
        / student_stats.len().max(1) as f64;

    let student_count = students.len().max(1) as f64;
    let question_stats: Vec<QuestionStats> = questions
        .iter()
        .map(|q| {
            let average_score =
                students.iter().map(|s| s.score_for(q.id)).sum::<f64>() / student_count;
            QuestionStats {
                question_id: q.id,
                average_score,
                success_rate: percent_of(average_score, q.max_score),
                outcome: q.outcome.clone(),
            }
        })
        .collect();

    let outcome_stats = aggregate_outcomes(&question_stats);

    tracing::debug!(
        questions = question_stats.len(),
        students = student_stats.len(),
        outcomes = outcome_stats.len(),
        class_average,
        "computed exam analysis"
    );

    AnalysisResult {
        question_stats,
        outcome_stats,
        student_stats,
        class_average,
        total_questions: questions.len(),
    }
}

/// Group question success rates by outcome code, preserving first-seen order.
fn aggregate_outcomes(question_stats: &[QuestionStats]) -> Vec<OutcomeStats> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut rates: HashMap<&str, Vec<f64>> = HashMap::new();

    for q in question_stats {
        if q.outcome.is_blank() {
            continue;
        }
        let code = q.outcome.code.as_str();
        let entry = rates.entry(code).or_default();
        if entry.is_empty() {
            order.push((code, q.outcome.description.as_str()));
        }
        entry.push(q.success_rate);
    }

    order
        .into_iter()
        .map(|(code, description)| {
            let group = rates.get(code).map(Vec::as_slice).unwrap_or_default();
            let success_rate = if group.is_empty() {
                0.0
            } else {
                group.iter().sum::<f64>() / group.len() as f64
            };
            OutcomeStats {
                code: code.to_string(),
                description: description.to_string(),
                success_rate,
                is_failed: success_rate < OUTCOME_FAIL_THRESHOLD,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn question(id: u32, max_score: f64, code: &str, description: &str) -> QuestionConfig {
        QuestionConfig {
            id,
            order: id,
            max_score,
            outcome: LearningOutcome::new(code, description),
        }
    }

    fn student(id: &str, scores: &[(u32, f64)]) -> Student {
        Student {
            id: id.into(),
            name: id.to_uppercase(),
            scores: scores.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_inputs_yield_zeroed_result() {
        let questions = vec![question(1, 10.0, "A", "d")];
        let students = vec![student("s1", &[(1, 5.0)])];

        for result in [
            compute(&[], &[]),
            compute(&[], &students),
            compute(&questions, &[]),
        ] {
            assert!(result.question_stats.is_empty());
            assert!(result.outcome_stats.is_empty());
            assert!(result.student_stats.is_empty());
            assert_eq!(result.class_average, 0.0);
            assert_eq!(result.total_questions, 0);
        }
    }

    #[test]
    fn scenario_two_students_split_one_outcome() {
        let questions = vec![question(1, 10.0, "A", "d"), question(2, 10.0, "A", "d")];
        let students = vec![
            student("s1", &[(1, 10.0), (2, 0.0)]),
            student("s2", &[(1, 0.0), (2, 10.0)]),
        ];

        let result = compute(&questions, &students);

        assert_eq!(result.total_questions, 2);
        for q in &result.question_stats {
            assert_close(q.average_score, 5.0);
            assert_close(q.success_rate, 50.0);
        }
        assert_eq!(result.outcome_stats.len(), 1);
        assert_eq!(result.outcome_stats[0].code, "A");
        assert_close(result.outcome_stats[0].success_rate, 50.0);
        assert!(!result.outcome_stats[0].is_failed);
        for s in &result.student_stats {
            assert_close(s.total_score, 10.0);
            assert_close(s.percentage, 50.0);
        }
        assert_close(result.class_average, 50.0);
    }

    #[test]
    fn zero_max_score_never_produces_nan() {
        let questions = vec![question(1, 0.0, "A", "d")];
        let students = vec![student("s1", &[(1, 3.0)]), student("s2", &[])];

        let result = compute(&questions, &students);

        assert_eq!(result.question_stats[0].success_rate, 0.0);
        for s in &result.student_stats {
            assert_eq!(s.percentage, 0.0);
            assert!(s.percentage.is_finite());
        }
        assert_eq!(result.class_average, 0.0);
        assert!(result.outcome_stats[0].is_failed);
    }

    #[test]
    fn student_without_scores_gets_zero() {
        let questions = vec![question(1, 10.0, "A", "d"), question(2, 5.0, "B", "e")];
        let students = vec![student("blank", &[]), student("s2", &[(1, 10.0), (2, 5.0)])];

        let result = compute(&questions, &students);

        let blank = result.student("blank").unwrap();
        assert_eq!(blank.total_score, 0.0);
        assert_eq!(blank.percentage, 0.0);
        assert_close(result.class_average, 50.0);
    }

    #[test]
    fn total_score_sums_recorded_entries() {
        let questions = vec![
            question(1, 4.0, "", ""),
            question(2, 6.0, "", ""),
            question(3, 10.0, "", ""),
        ];
        let students = vec![
            student("s1", &[(1, 4.0), (3, 7.5)]),
            student("s2", &[(2, 1.0)]),
        ];

        let result = compute(&questions, &students);

        assert_close(result.student_stats[0].total_score, 11.5);
        assert_close(result.student_stats[0].percentage, 57.5);
        assert_close(result.student_stats[1].total_score, 1.0);
        assert_close(result.student_stats[1].percentage, 5.0);
    }

    #[test]
    fn scores_for_unknown_questions_are_ignored() {
        let questions = vec![question(1, 10.0, "A", "d")];
        let students = vec![student("s1", &[(1, 5.0), (99, 100.0)])];

        let result = compute(&questions, &students);

        assert_close(result.student_stats[0].total_score, 5.0);
    }

    #[test]
    fn percentages_stay_in_range_for_valid_scores() {
        let questions = vec![question(1, 3.0, "A", ""), question(2, 7.0, "B", "")];
        let students = vec![
            student("full", &[(1, 3.0), (2, 7.0)]),
            student("none", &[(1, 0.0), (2, 0.0)]),
            student("some", &[(2, 6.5)]),
        ];

        let result = compute(&questions, &students);

        for s in &result.student_stats {
            assert!((0.0..=100.0).contains(&s.percentage), "{s:?}");
        }
    }

    #[test]
    fn over_max_scores_are_not_clamped() {
        let questions = vec![question(1, 10.0, "A", "d")];
        let students = vec![student("s1", &[(1, 15.0)])];

        let result = compute(&questions, &students);

        assert_close(result.student_stats[0].percentage, 150.0);
        assert_close(result.question_stats[0].success_rate, 150.0);
    }

    #[test]
    fn negative_scores_pass_through() {
        let questions = vec![question(1, 10.0, "A", "d")];
        let students = vec![student("s1", &[(1, -2.0)])];

        let result = compute(&questions, &students);

        assert_close(result.student_stats[0].total_score, -2.0);
        assert_close(result.student_stats[0].percentage, -20.0);
    }

    #[test]
    fn outcome_rate_is_mean_of_question_rates() {
        let questions = vec![question(1, 10.0, "A", "d"), question(2, 5.0, "A", "d")];
        let students = vec![student("s1", &[(1, 8.0), (2, 3.0)])];

        let result = compute(&questions, &students);

        assert_close(result.question_stats[0].success_rate, 80.0);
        assert_close(result.question_stats[1].success_rate, 60.0);
        let outcome = result.outcome("A").unwrap();
        assert_close(outcome.success_rate, 70.0);
        assert!(!outcome.is_failed);
    }

    #[test]
    fn fail_threshold_is_strict() {
        let questions = vec![
            question(1, 100.0, "AT", "at threshold"),
            question(2, 100_000.0, "BELOW", "just below"),
        ];
        let students = vec![student("s1", &[(1, 50.0), (2, 49_999.0)])];

        let result = compute(&questions, &students);

        let at = result.outcome("AT").unwrap();
        assert_close(at.success_rate, 50.0);
        assert!(!at.is_failed);
        let below = result.outcome("BELOW").unwrap();
        assert_close(below.success_rate, 49.999);
        assert!(below.is_failed);
        assert_eq!(result.failed_outcomes().count(), 1);
    }

    #[test]
    fn blank_outcomes_are_excluded() {
        let questions = vec![
            question(1, 10.0, "", ""),
            question(2, 10.0, "  ", "only spaces"),
            question(3, 10.0, "C", "real"),
        ];
        let students = vec![student("s1", &[(1, 1.0), (2, 2.0), (3, 3.0)])];

        let result = compute(&questions, &students);

        assert_eq!(result.question_stats.len(), 3);
        assert_eq!(result.outcome_stats.len(), 1);
        assert_eq!(result.outcome_stats[0].code, "C");
        assert!(result.outcome_stats.iter().all(|o| !o.code.trim().is_empty()));
    }

    #[test]
    fn outcomes_follow_first_appearance_and_first_description() {
        let questions = vec![
            question(1, 10.0, "B", "first B"),
            question(2, 10.0, "A", "first A"),
            question(3, 10.0, "B", "second B"),
        ];
        let students = vec![student("s1", &[(1, 10.0), (2, 10.0), (3, 10.0)])];

        let result = compute(&questions, &students);

        let codes: Vec<&str> = result.outcome_stats.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);
        assert_eq!(result.outcome_stats[0].description, "first B");
    }

    #[test]
    fn output_order_follows_input_order() {
        let questions = vec![question(7, 1.0, "", ""), question(3, 1.0, "", "")];
        let students = vec![student("z", &[]), student("a", &[])];

        let result = compute(&questions, &students);

        let qids: Vec<u32> = result.question_stats.iter().map(|q| q.question_id).collect();
        assert_eq!(qids, vec![7, 3]);
        let sids: Vec<&str> = result
            .student_stats
            .iter()
            .map(|s| s.student_id.as_str())
            .collect();
        assert_eq!(sids, vec!["z", "a"]);
    }

    #[test]
    fn compute_is_idempotent_and_does_not_mutate_inputs() {
        let questions = vec![question(1, 10.0, "A", "d"), question(2, 4.0, "B", "e")];
        let students = vec![
            student("s1", &[(1, 3.0), (2, 4.0)]),
            student("s2", &[(1, 9.0)]),
        ];
        let questions_before = questions.clone();
        let students_before = students.clone();

        let first = compute(&questions, &students);
        let second = compute(&questions, &students);

        assert_eq!(first, second);
        assert_eq!(questions, questions_before);
        assert_eq!(students, students_before);
    }

    #[test]
    fn result_serializes_with_empty_vectors() {
        let json = serde_json::to_value(compute(&[], &[])).unwrap();
        assert_eq!(json["question_stats"], serde_json::json!([]));
        assert_eq!(json["outcome_stats"], serde_json::json!([]));
        assert_eq!(json["student_stats"], serde_json::json!([]));
        assert_eq!(json["class_average"], serde_json::json!(0.0));
    }
}

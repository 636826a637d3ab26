//! Experiment report - per-case outcomes, accuracy statistics and CSV export.

use case_rules::{EvaluationResult, Verdict};
use std::path::Path;
use tracing::info;

use super::TestCase;
use crate::error::Result;

/// Every answer collected for one test case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// Position of the case in its preset.
    pub index: usize,
    pub case: TestCase,
    /// One result per completed run, in run order.
    pub results: Vec<EvaluationResult>,
    /// Runs the experiment was configured for.
    pub runs: usize,
}

impl CaseOutcome {
    /// Runs whose verdict equals the expected one.
    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict() == self.case.expected)
            .count()
    }

    /// Fraction of configured runs that matched, 0.0 with no runs.
    ///
    /// A run that produced no result counts as a miss.
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.success_count() as f64 / self.runs as f64
    }

    /// Most frequent verdict; ties go to the verdict seen first.
    pub fn most_common(&self) -> Option<Verdict> {
        let mut counts: Vec<(Verdict, usize)> = Vec::new();
        for result in &self.results {
            match counts.iter_mut().find(|(v, _)| *v == result.verdict()) {
                Some((_, count)) => *count += 1,
                None => counts.push((result.verdict(), 1)),
            }
        }

        let mut best: Option<(Verdict, usize)> = None;
        for (verdict, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((verdict, count));
            }
        }
        best.map(|(v, _)| v)
    }
}

/// Results of an experiment, one outcome per test case in preset order.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    runs: usize,
    outcomes: Vec<CaseOutcome>,
}

impl ExperimentReport {
    /// Create an empty report for `runs` runs.
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            outcomes: Vec::new(),
        }
    }

    /// Add one run's result for the case at `index`.
    pub fn record(&mut self, index: usize, case: &TestCase, result: EvaluationResult) {
        match self.outcomes.binary_search_by_key(&index, |o| o.index) {
            Ok(pos) => self.outcomes[pos].results.push(result),
            Err(pos) => self.outcomes.insert(
                pos,
                CaseOutcome {
                    index,
                    case: case.clone(),
                    results: vec![result],
                    runs: self.runs,
                },
            ),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// Share of runs answering exactly `expected`, over cases expecting it.
    pub fn strict_accuracy(&self, expected: Verdict) -> Option<f64> {
        self.accuracy(expected, |actual| actual == expected)
    }

    /// Like [`Self::strict_accuracy`], but the two correct verdicts count as each other.
    pub fn loose_accuracy(&self, expected: Verdict) -> Option<f64> {
        let correct_family = [Verdict::CompletelyCorrect, Verdict::PartiallyCorrect];
        if correct_family.contains(&expected) {
            self.accuracy(expected, |actual| correct_family.contains(&actual))
        } else {
            self.strict_accuracy(expected)
        }
    }

    fn accuracy(&self, expected: Verdict, accept: impl Fn(Verdict) -> bool) -> Option<f64> {
        let mut total = 0usize;
        let mut correct = 0usize;

        for outcome in self.outcomes.iter().filter(|o| o.case.expected == expected) {
            total += outcome.results.len();
            correct += outcome
                .results
                .iter()
                .filter(|r| accept(r.verdict()))
                .count();
        }

        (total > 0).then(|| correct as f64 / total as f64)
    }

    /// Render the report as CSV, one row per test case.
    pub fn to_csv(&self) -> String {
        let mut header = vec![
            "TestCase_ID".to_string(),
            "Question".to_string(),
            "Clue_ID".to_string(),
            "Expected_Result".to_string(),
        ];
        for run in 1..=self.runs {
            header.push(format!("Run_{}_Actual", run));
            header.push(format!("Run_{}_Explanation", run));
        }
        header.push("Success_Rate".to_string());
        header.push("Most_Common_Result".to_string());

        let mut csv = header.join(",");
        csv.push('\n');

        for outcome in &self.outcomes {
            let mut line = vec![
                outcome.index.to_string(),
                quote(&outcome.case.question),
                quote(outcome.case.clue_id.as_str()),
                outcome.case.expected.to_string(),
            ];
            for result in &outcome.results {
                line.push(result.verdict().to_string());
                line.push(quote(result.explanation()));
            }
            // skipped runs still occupy their columns
            for _ in outcome.results.len()..self.runs {
                line.push(String::new());
                line.push(String::new());
            }
            line.push(format!("{:.0}%", outcome.success_rate() * 100.0));
            line.push(
                outcome
                    .most_common()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );

            csv.push_str(&line.join(","));
            csv.push('\n');
        }

        csv
    }

    /// Write the CSV report to `path`, creating parent directories.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_csv())?;
        info!("CSV report saved to {}", path.display());
        Ok(())
    }
}

/// Quote a CSV field, doubling embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::ClueId;

    fn case(question: &str, expected: Verdict) -> TestCase {
        TestCase {
            clue_id: ClueId::from("easel"),
            question: question.to_string(),
            expected,
        }
    }

    fn result(verdict: Verdict) -> EvaluationResult {
        EvaluationResult::new(verdict, "because")
    }

    #[test]
    fn test_outcome_statistics() {
        let mut report = ExperimentReport::new(4);
        let c = case("q", Verdict::Incorrect);
        for v in [
            Verdict::Incorrect,
            Verdict::Irrelevant,
            Verdict::Incorrect,
            Verdict::Irrelevant,
        ] {
            report.record(0, &c, result(v));
        }

        let outcome = &report.outcomes()[0];
        assert_eq!(outcome.success_count(), 2);
        assert!((outcome.success_rate() - 0.5).abs() < 1e-9);
        // tie: the verdict seen first wins
        assert_eq!(outcome.most_common(), Some(Verdict::Incorrect));
    }

    #[test]
    fn test_outcomes_kept_in_preset_order() {
        let mut report = ExperimentReport::new(1);
        report.record(2, &case("third", Verdict::Incorrect), result(Verdict::Incorrect));
        report.record(0, &case("first", Verdict::Incorrect), result(Verdict::Incorrect));
        report.record(1, &case("second", Verdict::Incorrect), result(Verdict::Incorrect));

        let indexes: Vec<_> = report.outcomes().iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_strict_and_loose_accuracy() {
        let mut report = ExperimentReport::new(2);
        let c = case("q", Verdict::CompletelyCorrect);
        report.record(0, &c, result(Verdict::CompletelyCorrect));
        report.record(0, &c, result(Verdict::PartiallyCorrect));

        let i = case("q2", Verdict::Irrelevant);
        report.record(1, &i, result(Verdict::Irrelevant));
        report.record(1, &i, result(Verdict::Incorrect));

        assert_eq!(report.strict_accuracy(Verdict::CompletelyCorrect), Some(0.5));
        assert_eq!(report.loose_accuracy(Verdict::CompletelyCorrect), Some(1.0));
        assert_eq!(report.loose_accuracy(Verdict::Irrelevant), Some(0.5));
        assert_eq!(report.strict_accuracy(Verdict::Noncommittal), None);
    }

    #[test]
    fn test_csv_layout() {
        let mut report = ExperimentReport::new(2);
        let c = case("is it \"used\"?", Verdict::Incorrect);
        report.record(0, &c, result(Verdict::Incorrect));
        report.record(0, &c, EvaluationResult::new(Verdict::Incorrect, "no, \"unused\""));

        let csv = report.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "TestCase_ID,Question,Clue_ID,Expected_Result,Run_1_Actual,Run_1_Explanation,Run_2_Actual,Run_2_Explanation,Success_Rate,Most_Common_Result"
        );
        assert_eq!(
            lines[1],
            r#"0,"is it ""used""?","easel",Incorrect,Incorrect,"because",Incorrect,"no, ""unused""",100%,Incorrect"#
        );
    }

    #[test]
    fn test_csv_pads_missing_runs() {
        let mut report = ExperimentReport::new(3);
        report.record(0, &case("q", Verdict::Incorrect), result(Verdict::Irrelevant));

        let csv = report.to_csv();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row.split(',').count(), 4 + 3 * 2 + 2);
        assert!(row.ends_with(",0%,Irrelevant"));
    }

    #[test]
    fn test_success_rate_counts_missing_runs() {
        let mut report = ExperimentReport::new(4);
        report.record(0, &case("q", Verdict::Incorrect), result(Verdict::Incorrect));

        let outcome = &report.outcomes()[0];
        assert_eq!(outcome.success_count(), 1);
        assert!((outcome.success_rate() - 0.25).abs() < 1e-9);

        let csv = report.to_csv();
        assert!(csv.lines().nth(1).unwrap().ends_with(",25%,Incorrect"));
    }
}

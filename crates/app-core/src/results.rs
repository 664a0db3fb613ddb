//! Exam results
//!
//! Filtering and summary figures for a student's exam results.

use portal_client::types::{ExamResults, ResultStatus, SubjectResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which subjects to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFilter {
    /// Every subject
    #[default]
    All,
    /// Passed subjects only
    Passed,
    /// Failed subjects only
    Failed,
}

impl ResultFilter {
    /// Whether a subject result passes this filter
    pub fn matches(&self, result: &SubjectResult) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Passed => result.status == ResultStatus::Pass,
            ResultFilter::Failed => result.status == ResultStatus::Fail,
        }
    }
}

/// Verbal rating of an overall percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLabel {
    /// 90% and above
    Excellent,
    /// 80% to 90%
    VeryGood,
    /// 70% to 80%
    Good,
    /// 60% to 70%
    Satisfactory,
    /// Below 60%
    NeedsImprovement,
}

impl PerformanceLabel {
    /// Rating for a percentage
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            PerformanceLabel::Excellent
        } else if percent >= 80.0 {
            PerformanceLabel::VeryGood
        } else if percent >= 70.0 {
            PerformanceLabel::Good
        } else if percent >= 60.0 {
            PerformanceLabel::Satisfactory
        } else {
            PerformanceLabel::NeedsImprovement
        }
    }

    /// Display text
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLabel::Excellent => "Excellent",
            PerformanceLabel::VeryGood => "Very Good",
            PerformanceLabel::Good => "Good",
            PerformanceLabel::Satisfactory => "Satisfactory",
            PerformanceLabel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter band of a grade such as "A-" or "B+"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeBand {
    /// A grades
    A,
    /// B grades
    B,
    /// C grades
    C,
    /// D grades
    D,
    /// Anything else (F, incomplete, blank)
    Other,
}

impl GradeBand {
    /// Band of a grade, decided by its leading letter
    pub fn of(grade: &str) -> Self {
        match grade.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('A') => GradeBand::A,
            Some('B') => GradeBand::B,
            Some('C') => GradeBand::C,
            Some('D') => GradeBand::D,
            _ => GradeBand::Other,
        }
    }
}

/// Overall score as a percentage of the maximum, 0 when there is no maximum
pub fn performance_percent(results: &[SubjectResult]) -> f64 {
    let total: f64 = results.iter().map(|r| r.score).sum();
    let max: f64 = results.iter().map(|r| r.max_score).sum();
    if max <= 0.0 {
        0.0
    } else {
        total / max * 100.0
    }
}

/// A student's results for one exam with the active filter
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    results: ExamResults,
    filter: ResultFilter,
}

impl ResultsView {
    /// Wrap results; shows every subject
    pub fn new(results: ExamResults) -> Self {
        Self {
            results,
            filter: ResultFilter::All,
        }
    }

    /// Underlying results
    pub fn exam_results(&self) -> &ExamResults {
        &self.results
    }

    /// Active filter
    pub fn filter(&self) -> ResultFilter {
        self.filter
    }

    /// Change the filter
    pub fn set_filter(&mut self, filter: ResultFilter) {
        self.filter = filter;
    }

    /// Subjects passing the active filter
    pub fn visible(&self) -> Vec<&SubjectResult> {
        self.results
            .results
            .iter()
            .filter(|r| self.filter.matches(r))
            .collect()
    }

    /// Overall percentage across all subjects, regardless of the filter
    pub fn performance_percent(&self) -> f64 {
        performance_percent(&self.results.results)
    }

    /// Rating of the overall percentage
    pub fn performance_label(&self) -> PerformanceLabel {
        PerformanceLabel::from_percent(self.performance_percent())
    }

    /// Number of passed and failed subjects
    pub fn pass_fail_counts(&self) -> (usize, usize) {
        let passed = self
            .results
            .results
            .iter()
            .filter(|r| r.status == ResultStatus::Pass)
            .count();
        (passed, self.results.results.len() - passed)
    }
}

use serde::{Deserialize, Serialize};

pub mod summarizer;

pub use summarizer::{summarize, Summarizer, DEFAULT_TOP_LIMIT};

/// A ratio or average that may be undefined. `has_data == false` means no
/// record qualified and `value` is a placeholder `0.0`, not a measured zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: f64,
    pub has_data: bool,
}

impl Metric {
    pub fn measured(value: f64) -> Self {
        Self {
            value,
            has_data: true,
        }
    }

    pub fn no_data() -> Self {
        Self {
            value: 0.0,
            has_data: false,
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.has_data.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorCount {
    pub author: String,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseRate {
    pub rate: Metric,
    /// Issues with a recognized state.
    pub total: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenDuration {
    pub average_days: Metric,
    /// Closed issues that contributed to the average.
    pub qualifying: usize,
    /// Closed issues dropped because they were closed before they were created.
    pub inverted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub top_committers: Vec<ContributorCount>,
    pub total_commits: usize,
    pub distinct_authors: usize,
    pub close_rate: CloseRate,
    pub open_duration: OpenDuration,
}

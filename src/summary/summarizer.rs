use super::*;
use crate::records::{CommitRecord, IssueRecord, IssueState};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_TOP_LIMIT: usize = 5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Summarizes with the default top-committer limit.
pub fn summarize(commits: &[CommitRecord], issues: &[IssueRecord]) -> SummaryReport {
    Summarizer::default().summarize(commits, issues)
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    top_limit: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl Summarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_limit(top_limit: usize) -> Self {
        Self { top_limit }
    }

    /// Pure over its inputs: the same sequences always give the same report.
    pub fn summarize(&self, commits: &[CommitRecord], issues: &[IssueRecord]) -> SummaryReport {
        let tallies = tally_authors(commits);
        let total_commits = tallies.iter().map(|c| c.commits).sum();
        let distinct_authors = tallies.len();
        let top_committers = self.top_contributors(tallies);

        SummaryReport {
            top_committers,
            total_commits,
            distinct_authors,
            close_rate: close_rate(issues),
            open_duration: open_duration(issues),
        }
    }

    /// Ranks by commit count, descending. Equal counts keep first-seen order.
    fn top_contributors(&self, mut tallies: Vec<ContributorCount>) -> Vec<ContributorCount> {
        // sort_by is stable
        tallies.sort_by(|a, b| b.commits.cmp(&a.commits));
        tallies.truncate(self.top_limit);
        tallies
    }
}

/// Per-author counts in first-seen order. Authors are compared exactly.
fn tally_authors(commits: &[CommitRecord]) -> Vec<ContributorCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<ContributorCount> = Vec::new();

    for author in commits.iter().filter_map(|c| c.author.as_deref()) {
        match positions.get(author) {
            Some(&i) => tallies[i].commits += 1,
            None => {
                positions.insert(author, tallies.len());
                tallies.push(ContributorCount {
                    author: author.to_string(),
                    commits: 1,
                });
            }
        }
    }

    tallies
}

fn close_rate(issues: &[IssueRecord]) -> CloseRate {
    let recognized = issues.iter().filter(|i| i.state.is_recognized());
    let (total, closed) = recognized.fold((0usize, 0usize), |(total, closed), issue| {
        (total + 1, closed + usize::from(issue.state == IssueState::Closed))
    });

    let rate = if total == 0 {
        Metric::no_data()
    } else {
        Metric::measured(closed as f64 / total as f64)
    };

    CloseRate {
        rate,
        total,
        closed,
    }
}

fn open_duration(issues: &[IssueRecord]) -> OpenDuration {
    let mut total_millis: i128 = 0;
    let mut qualifying = 0usize;
    let mut inverted = 0usize;

    for duration in issues.iter().filter_map(IssueRecord::open_duration) {
        if duration < chrono::TimeDelta::zero() {
            inverted += 1;
            continue;
        }
        total_millis += i128::from(duration.num_milliseconds());
        qualifying += 1;
    }

    if inverted > 0 {
        debug!(
            "Dropped {} closed issues with closed_at earlier than created_at",
            inverted
        );
    }

    let average_days = if qualifying == 0 {
        Metric::no_data()
    } else {
        Metric::measured(total_millis as f64 / qualifying as f64 / MILLIS_PER_DAY)
    };

    OpenDuration {
        average_days,
        qualifying,
        inverted,
    }
}

//! Commit and issue mining for a single repository: export commit history
//! to CSV, load commit and issue tables, and summarize contributor activity
//! and issue lifecycle.

pub mod config;
pub mod git;
pub mod output;
pub mod records;
pub mod summary;

pub use records::{CommitRecord, IssueRecord, IssueState, LoadError, RecordLoader};
pub use summary::{summarize, Metric, SummaryReport, Summarizer};

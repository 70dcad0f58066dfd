use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod loader;

pub use loader::{LoadError, Loaded, RecordLoader, RowWarning};

/// One authorship event read from the commit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl CommitRecord {
    pub fn new(author: impl Into<String>, date: Option<DateTime<Utc>>) -> Self {
        Self {
            sha: None,
            author: Some(author.into()),
            email: None,
            date,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueState {
    Open,
    Closed,
    Unrecognized(String),
}

impl IssueState {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("open") {
            IssueState::Open
        } else if trimmed.eq_ignore_ascii_case("closed") {
            IssueState::Closed
        } else {
            IssueState::Unrecognized(trimmed.to_string())
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, IssueState::Unrecognized(_))
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => f.write_str("open"),
            IssueState::Closed => f.write_str("closed"),
            IssueState::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// One tracked issue read from the issue table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: IssueState,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl IssueRecord {
    pub fn new(
        state: IssueState,
        created_at: Option<DateTime<Utc>>,
        closed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            number: None,
            title: None,
            state,
            created_at,
            closed_at,
        }
    }

    /// Time between creation and closure for a closed issue with both
    /// timestamps. Negative when the source data is skewed.
    pub fn open_duration(&self) -> Option<TimeDelta> {
        if self.state != IssueState::Closed {
            return None;
        }
        match (self.created_at, self.closed_at) {
            (Some(created), Some(closed)) => Some(closed - created),
            _ => None,
        }
    }
}

/// Parses the ISO-8601 forms written by the exporter and by common API
/// dumps. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("unknown") {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

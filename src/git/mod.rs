use serde::{Deserialize, Serialize};

pub mod exporter;

pub use exporter::CommitExporter;

pub const UNKNOWN: &str = "Unknown";
pub const NO_MESSAGE: &str = "No message";

/// One line of the commit table handed from `fetch-commits` to `summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRow {
    pub sha: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub message: String,
}

impl CommitRow {
    pub const HEADER: [&'static str; 5] = ["sha", "author", "email", "date", "message"];
}

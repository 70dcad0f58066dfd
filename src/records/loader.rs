use super::*;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source unreadable: {location}: {reason}")]
    SourceUnreadable { location: String, reason: String },
}

impl LoadError {
    fn unreadable(location: &str, reason: impl fmt::Display) -> Self {
        LoadError::SourceUnreadable {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A row that was skipped during loading. `row` counts data rows from 1,
/// not including the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub warnings: Vec<RowWarning>,
}

/// Header lookup: column name to position.
pub struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    /// A repeated column name resolves to its first occurrence.
    fn new(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            if !name.is_empty() {
                index.entry(name.to_string()).or_insert(i);
            }
        }
        Self { index }
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Field value by column name; blank values read as absent.
    pub fn get<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        let position = *self.index.get(name)?;
        row.get(position).filter(|value| !value.is_empty())
    }

    fn timestamp(&self, row: &StringRecord, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.get(row, name)?;
        let parsed = parse_timestamp(raw);
        if parsed.is_none() && !raw.eq_ignore_ascii_case("unknown") {
            debug!("Ignoring unparseable {} value {:?}", name, raw);
        }
        parsed
    }
}

/// A record type that can be built from one row of a named-column table.
pub trait TabularRecord: Sized {
    /// Column that must appear in the header for the source to be usable.
    const REQUIRED_COLUMN: &'static str;
    const KIND: &'static str;

    /// Builds the record, or returns the reason the row must be skipped.
    fn from_row(columns: &Columns, row: &StringRecord) -> Result<Self, String>;
}

impl TabularRecord for CommitRecord {
    const REQUIRED_COLUMN: &'static str = "author";
    const KIND: &'static str = "commit";

    fn from_row(columns: &Columns, row: &StringRecord) -> Result<Self, String> {
        let author = columns
            .get(row, "author")
            .ok_or_else(|| "missing author".to_string())?;

        Ok(CommitRecord {
            sha: columns.get(row, "sha").map(str::to_string),
            author: Some(author.to_string()),
            email: columns.get(row, "email").map(str::to_string),
            date: columns.timestamp(row, "date"),
            message: columns.get(row, "message").map(str::to_string),
        })
    }
}

impl TabularRecord for IssueRecord {
    const REQUIRED_COLUMN: &'static str = "state";
    const KIND: &'static str = "issue";

    fn from_row(columns: &Columns, row: &StringRecord) -> Result<Self, String> {
        let state = columns
            .get(row, "state")
            .ok_or_else(|| "missing state".to_string())?;

        Ok(IssueRecord {
            number: columns.get(row, "number").and_then(|n| n.parse().ok()),
            title: columns.get(row, "title").map(str::to_string),
            state: IssueState::parse(state),
            created_at: columns.timestamp(row, "created_at"),
            closed_at: columns.timestamp(row, "closed_at"),
        })
    }
}

pub struct RecordLoader;

impl RecordLoader {
    pub fn load_commits(path: &Path) -> Result<Loaded<CommitRecord>, LoadError> {
        Self::load_path(path)
    }

    pub fn load_issues(path: &Path) -> Result<Loaded<IssueRecord>, LoadError> {
        Self::load_path(path)
    }

    pub fn load_path<T: TabularRecord>(path: &Path) -> Result<Loaded<T>, LoadError> {
        let location = path.display().to_string();
        let file = File::open(path).map_err(|e| LoadError::unreadable(&location, e))?;
        let loaded = Self::load_reader(file, &location)?;

        info!(
            "Loaded {} {} records from {} ({} skipped)",
            loaded.records.len(),
            T::KIND,
            location,
            loaded.warnings.len()
        );
        Ok(loaded)
    }

    /// Reads records in source order. Only a missing or unusable header, or
    /// an I/O failure, aborts the load; malformed rows become warnings.
    pub fn load_reader<T: TabularRecord, R: Read>(
        reader: R,
        location: &str,
    ) -> Result<Loaded<T>, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| LoadError::unreadable(location, e))?;
        let columns = Columns::new(headers);

        if columns.is_empty() {
            return Err(LoadError::unreadable(location, "no header row"));
        }
        if !columns.contains(T::REQUIRED_COLUMN) {
            return Err(LoadError::unreadable(
                location,
                format!("header has no '{}' column", T::REQUIRED_COLUMN),
            ));
        }

        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for (i, result) in reader.records().enumerate() {
            let row_number = i + 1;
            let outcome = match result {
                Ok(row) => T::from_row(&columns, &row),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(LoadError::unreadable(location, e));
                }
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(record) => records.push(record),
                Err(reason) => {
                    warn!("Skipping {} {} row {}: {}", location, T::KIND, row_number, reason);
                    warnings.push(RowWarning {
                        row: row_number,
                        reason,
                    });
                }
            }
        }

        Ok(Loaded { records, warnings })
    }
}

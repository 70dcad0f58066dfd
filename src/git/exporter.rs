use super::*;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, TimeZone, Utc};
use csv::WriterBuilder;
use git2::{Commit, ErrorCode, Repository, Sort};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CommitExporter {
    repo: Repository,
    path: PathBuf,
    include_merge_commits: bool,
}

impl CommitExporter {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).with_context(|| {
            format!(
                "Failed to open repository at {}\n Is it really a git repo?",
                path.display()
            )
        })?;

        info!("Opened Git repository at {}", path.display());

        Ok(Self {
            repo,
            path: path.to_path_buf(),
            include_merge_commits: true,
        })
    }

    pub fn include_merge_commits(mut self, include: bool) -> Self {
        self.include_merge_commits = include;
        self
    }

    /// Walks history from HEAD, newest first, stopping after `max_commits`
    /// exported rows. `Some(0)` means no limit, like an absent value.
    pub fn export(&self, max_commits: Option<usize>) -> Result<Vec<CommitRow>> {
        let mut revwalk = self.repo.revwalk()?;

        match self.repo.head() {
            Ok(head) => {
                let target = head
                    .target()
                    .with_context(|| format!("HEAD of {} is not a commit", self.path.display()))?;
                revwalk.push(target)?;
                info!(
                    "Exporting commits from current branch: {}",
                    head.shorthand().unwrap_or("HEAD")
                );
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                info!("Repository {} has no commits yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to resolve HEAD in {}", self.path.display()))
            }
        }

        revwalk.set_sorting(Sort::TIME)?;

        let mut commit_oids = Vec::new();
        for oid in revwalk {
            commit_oids.push(oid?);
        }

        let limit = max_commits
            .filter(|&max| max > 0)
            .unwrap_or(commit_oids.len());
        info!(
            "Found {} commits, exporting up to {}",
            commit_oids.len(),
            limit.min(commit_oids.len())
        );

        let pb = ProgressBar::new(limit.min(commit_oids.len()) as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} commits ({eta})",
            )?
            .progress_chars("#>-"),
        );

        let mut rows = Vec::with_capacity(limit.min(commit_oids.len()));
        for oid in commit_oids {
            if rows.len() >= limit {
                break;
            }

            let commit = self.repo.find_commit(oid)?;
            if !self.include_merge_commits && commit.parent_count() > 1 {
                debug!("Skipping merge commit {}", oid);
                continue;
            }

            rows.push(Self::to_row(&commit));
            pb.inc(1);
        }

        pb.set_length(rows.len() as u64);
        pb.finish_with_message("Commit export complete");
        Ok(rows)
    }

    fn to_row(commit: &Commit<'_>) -> CommitRow {
        let author = commit.author();

        let name = String::from_utf8_lossy(author.name_bytes()).trim().to_string();
        let email = String::from_utf8_lossy(author.email_bytes()).trim().to_string();
        let date = Utc
            .timestamp_opt(author.when().seconds(), 0)
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let message = String::from_utf8_lossy(commit.message_bytes())
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .unwrap_or_else(|| NO_MESSAGE.to_string());

        CommitRow {
            sha: commit.id().to_string(),
            author: or_unknown(name),
            email: or_unknown(email),
            date,
            message,
        }
    }

    /// Writes the header even when there are no rows.
    pub fn write_csv(rows: &[CommitRow], out: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;

        writer.write_record(CommitRow::HEADER)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", out.display()))?;

        info!("Wrote {} commits to {}", rows.len(), out.display());
        Ok(())
    }
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordLoader;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn commit_all(repo: &Repository, name: &str, seconds: i64, message: &str) {
        let mut index = repo.index().expect("open git index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.write().expect("write git index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let signature = Signature::new(name, "dev@example.com", &Time::new(seconds, 0))
            .expect("signature");

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .expect("commit");
    }

    fn repo_with_history(authors: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init git repo");
        for (i, author) in authors.iter().enumerate() {
            fs::write(dir.path().join("file.txt"), format!("revision {}\n", i))
                .expect("write file");
            commit_all(
                &repo,
                author,
                1_700_000_000 + i as i64 * 3600,
                &format!("Change {}\n\nLonger body", i),
            );
        }
        dir
    }

    #[test]
    fn test_export_all_commits_newest_first() {
        let dir = repo_with_history(&["Alice", "Bob", "Alice"]);
        let exporter = CommitExporter::open(dir.path()).unwrap();

        let rows = exporter.export(None).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].author, "Alice");
        assert_eq!(rows[0].message, "Change 2");
        assert_eq!(rows[1].author, "Bob");
        assert_eq!(rows[2].date, "2023-11-14T22:13:20Z");
        assert_eq!(rows[2].email, "dev@example.com");
    }

    #[test]
    fn test_export_respects_max_commits() {
        let dir = repo_with_history(&["A", "B", "C", "D", "E"]);
        let exporter = CommitExporter::open(dir.path()).unwrap();

        let rows = exporter.export(Some(3)).unwrap();

        let messages: Vec<_> = rows.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["Change 4", "Change 3", "Change 2"]);
    }

    #[test]
    fn test_zero_max_commits_means_no_limit() {
        let dir = repo_with_history(&["A", "B", "C"]);
        let exporter = CommitExporter::open(dir.path()).unwrap();

        assert_eq!(exporter.export(Some(0)).unwrap().len(), 3);
    }

    fn signature_at(seconds: i64) -> Signature<'static> {
        Signature::new("Merger", "dev@example.com", &Time::new(seconds, 0)).expect("signature")
    }

    /// main: c0 - c1 - c3 - merge - c5
    ///          \            /
    /// topic:    c2 --------
    fn repo_with_merge() -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init git repo");
        let tree_id = repo.index().unwrap().write_tree().expect("write tree");
        let tree = repo.find_tree(tree_id).unwrap();

        let commit = |seconds: i64, message: &str, parents: &[&Commit<'_>], update: Option<&str>| {
            let sig = signature_at(seconds);
            let oid = repo
                .commit(update, &sig, &sig, message, &tree, parents)
                .expect("commit");
            repo.find_commit(oid).unwrap()
        };

        let base = 1_700_000_000;
        let c0 = commit(base, "c0", &[], Some("HEAD"));
        let c1 = commit(base + 60, "c1", &[&c0], Some("HEAD"));
        let c2 = commit(base + 120, "c2", &[&c0], None);
        let c3 = commit(base + 180, "c3", &[&c1], Some("HEAD"));
        let merge = commit(base + 240, "merge", &[&c3, &c2], Some("HEAD"));
        commit(base + 300, "c5", &[&merge], Some("HEAD"));
        dir
    }

    fn messages(rows: &[CommitRow]) -> Vec<&str> {
        rows.iter().map(|r| r.message.as_str()).collect()
    }

    #[test]
    fn test_merge_commits_included_by_default() {
        let dir = repo_with_merge();
        let exporter = CommitExporter::open(dir.path()).unwrap();

        let rows = exporter.export(None).unwrap();

        assert_eq!(rows.len(), 6);
        assert!(messages(&rows).contains(&"merge"));
    }

    #[test]
    fn test_merge_commits_excluded_when_disabled() {
        let dir = repo_with_merge();
        let exporter = CommitExporter::open(dir.path())
            .unwrap()
            .include_merge_commits(false);

        let all = exporter.export(None).unwrap();
        assert_eq!(all.len(), 5);
        assert!(!messages(&all).contains(&"merge"));

        let limited = exporter.export(Some(3)).unwrap();
        assert_eq!(messages(&limited), vec!["c5", "c3", "c2"]);
    }

    #[test]
    fn test_export_empty_repository() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let rows = CommitExporter::open(dir.path()).unwrap().export(None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_open_rejects_non_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommitExporter::open(&dir.path().join("nowhere")).err().unwrap();
        assert!(err.to_string().contains("Failed to open repository"));
    }

    #[test]
    fn test_written_csv_loads_back() {
        let dir = repo_with_history(&["Alice", "Bob"]);
        let rows = CommitExporter::open(dir.path()).unwrap().export(None).unwrap();
        let out = TempDir::new().unwrap();
        let path = out.path().join("commits.csv");

        CommitExporter::write_csv(&rows, &path).unwrap();
        let loaded = RecordLoader::load_commits(&path).unwrap();

        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].author.as_deref(), Some("Bob"));
        assert_eq!(loaded.records[0].sha.as_deref(), Some(rows[0].sha.as_str()));
        assert!(loaded.records[0].date.is_some());
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let out = TempDir::new().unwrap();
        let path = out.path().join("commits.csv");

        CommitExporter::write_csv(&[], &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap().trim(),
            "sha,author,email,date,message"
        );
        assert!(RecordLoader::load_commits(&path).unwrap().records.is_empty());
    }
}

//! Technical-item model: commits, pull requests, code metrics and debt.
//!
//! Produced by version-control adapters. Commits are identified by their
//! full sha, pull requests by their number within the repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Label, SourceType};

/// What happened to a file in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
        }
    }
}

/// One file's change within a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChange {
    pub path: String,
    pub kind: ChangeKind,
    pub additions: u64,
    pub deletions: u64,
    /// Inferred programming language, if the adapter could tell.
    pub language: Option<String>,
}

/// A single commit with its per-file changes and cross-reference fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Full sha. Doubles as the commit's identity for merge and linking.
    pub sha: String,
    pub message: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<CodeChange>,
    /// Business-item keys referenced in the message. Adapters may populate
    /// this; the resolver additionally extracts references itself.
    pub linked_issue_keys: Vec<String>,
    /// Pull-request numbers referenced in the message (`#123` tokens).
    pub linked_pr_ids: Vec<u64>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, author: Author) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author,
            timestamp: Utc::now(),
            changes: Vec::new(),
            linked_issue_keys: Vec::new(),
            linked_pr_ids: Vec::new(),
        }
    }

    /// Abbreviated sha (first 7 characters).
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.split('\n').next().unwrap_or_default()
    }

    /// Everything after the first newline, if non-empty.
    pub fn body(&self) -> Option<&str> {
        self.message
            .split_once('\n')
            .map(|(_, body)| body.trim_start_matches('\n'))
            .filter(|body| !body.is_empty())
    }

    pub fn additions(&self) -> u64 {
        self.changes
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.additions))
    }

    pub fn deletions(&self) -> u64 {
        self.changes
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.deletions))
    }
}

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestStatus {
    Open,
    Merged,
    Closed,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestStatus::Open => "open",
            PullRequestStatus::Merged => "merged",
            PullRequestStatus::Closed => "closed",
        }
    }
}

/// A pull (or merge) request with review metadata and change totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Identity within the repository.
    pub number: u64,
    pub title: String,
    pub description: Option<String>,
    pub author: Author,
    pub status: PullRequestStatus,
    pub source_branch: String,
    pub target_branch: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub reviewers: Vec<Author>,
    pub approvers: Vec<Author>,
    pub review_comment_count: u32,
    pub files_changed: u32,
    pub additions: u64,
    pub deletions: u64,
    pub labels: Vec<Label>,
    pub linked_issue_keys: Vec<String>,
}

impl PullRequest {
    pub fn new(number: u64, title: impl Into<String>, author: Author) -> Self {
        Self {
            number,
            title: title.into(),
            description: None,
            author,
            status: PullRequestStatus::Open,
            source_branch: String::new(),
            target_branch: String::new(),
            created_at: Utc::now(),
            merged_at: None,
            reviewers: Vec::new(),
            approvers: Vec::new(),
            review_comment_count: 0,
            files_changed: 0,
            additions: 0,
            deletions: 0,
            labels: Vec::new(),
            linked_issue_keys: Vec::new(),
        }
    }
}

/// Per-language code statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMetric {
    pub language: String,
    pub file_count: u32,
    pub code_lines: u64,
    pub blank_lines: u64,
    pub comment_lines: u64,
    pub avg_complexity: Option<f64>,
}

/// Severity of a technical-debt item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DebtSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtSeverity::Low => "low",
            DebtSeverity::Medium => "medium",
            DebtSeverity::High => "high",
            DebtSeverity::Critical => "critical",
        }
    }
}

/// A known piece of technical debt, from analysis tooling or triage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDebtItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: DebtSeverity,
    /// Debt class tag: code_smell, bug, vulnerability, ...
    pub kind: String,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub estimated_effort: Option<String>,
}

/// All technical items collected from one source (or merged from several).
///
/// Invariants: no two commits share a sha; no two pull requests share a
/// number. `code_metrics` is keyed by language name, so key uniqueness is
/// structural; an ordered map keeps merged output deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalData {
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
    pub code_metrics: BTreeMap<String, CodeMetric>,
    pub technical_debt: Vec<TechnicalDebtItem>,
    pub source_type: SourceType,
    pub collected_at: DateTime<Utc>,
}

impl TechnicalData {
    pub fn new(source_type: SourceType) -> Self {
        Self {
            commits: Vec::new(),
            pull_requests: Vec::new(),
            code_metrics: BTreeMap::new(),
            technical_debt: Vec::new(),
            source_type,
            collected_at: Utc::now(),
        }
    }

    pub fn merged_pull_requests(&self) -> Vec<&PullRequest> {
        self.pull_requests
            .iter()
            .filter(|pr| pr.status == PullRequestStatus::Merged)
            .collect()
    }

    pub fn commits_by_author(&self, author_name: &str) -> Vec<&Commit> {
        self.commits
            .iter()
            .filter(|c| c.author.name == author_name)
            .collect()
    }

    /// Lines added across all commits, saturating on overflow.
    pub fn total_additions(&self) -> u64 {
        self.commits
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.additions()))
    }

    /// Lines removed across all commits, saturating on overflow.
    pub fn total_deletions(&self) -> u64 {
        self.commits
            .iter()
            .fold(0u64, |total, c| total.saturating_add(c.deletions()))
    }

    pub fn total_pr_additions(&self) -> u64 {
        self.pull_requests
            .iter()
            .fold(0u64, |total, pr| total.saturating_add(pr.additions))
    }

    pub fn total_pr_deletions(&self) -> u64 {
        self.pull_requests
            .iter()
            .fold(0u64, |total, pr| total.saturating_add(pr.deletions))
    }
}

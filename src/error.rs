//! Error and warning types for the collection pipeline.
//!
//! Per-source failures are collected into the run report instead of aborting
//! the pipeline; only the offending source's contribution is lost.

use thiserror::Error;

use crate::model::SourceType;

/// Boxed error returned by adapters. Adapters convert provider-specific
/// failures into this; the core records the message and moves on.
pub type AdapterError = Box<dyn std::error::Error + Send + Sync>;

/// An adapter returned output its declared category does not permit.
///
/// Detected before merge; the source's contribution is dropped entirely so
/// miscategorized data can never leak into the merged aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("ticketing source populated technical data")]
    TicketingWithTechnical,
    #[error("ticketing source returned no functional data")]
    TicketingWithoutFunctional,
    #[error("version-control source populated functional data")]
    VersionControlWithFunctional,
    #[error("version-control source returned no technical data")]
    VersionControlWithoutTechnical,
    #[error("file-based source returned project data instead of documents")]
    FileBasedWithProject,
    #[error("only file-based sources may return raw documents")]
    UnexpectedDocuments,
}

/// Why a source contributed nothing to the merged aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceFailure {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
    #[error("adapter failed: {0}")]
    Adapter(String),
}

/// A per-source failure recorded in the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// Configured source name.
    pub source: String,
    pub source_type: SourceType,
    pub failure: SourceFailure,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.source_type, self.failure)
    }
}

/// Which sequence a dropped item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Epic,
    Feature,
    UserStory,
    Requirement,
    Commit,
    PullRequest,
    CodeMetric,
    TechnicalDebt,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Epic => "epic",
            ItemKind::Feature => "feature",
            ItemKind::UserStory => "user story",
            ItemKind::Requirement => "requirement",
            ItemKind::Commit => "commit",
            ItemKind::PullRequest => "pull request",
            ItemKind::CodeMetric => "code metric",
            ItemKind::TechnicalDebt => "technical debt item",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-fatal issue encountered while merging; the offending item is dropped
/// and the merge continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeWarning {
    #[error("dropped malformed {kind} from {source_type} source: {detail}")]
    MalformedItem {
        kind: ItemKind,
        source_type: SourceType,
        detail: String,
    },
}

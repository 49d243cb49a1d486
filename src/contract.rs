//! # contract: universal interface for data-source adapters
//!
//! This module defines a single trait ([`SourceAdapter`]) and the supporting
//! types every adapter produces, whatever provider it talks to (ticketing
//! API, version-control host, local filesystem, or a mock in tests).
//!
//! ## Interface & Extensibility
//! - Implement the [`SourceAdapter`] trait to create a new adapter.
//! - `collect` is async and returns a boxed error type; adapters convert all
//!   meaningful upstream failures into [`AdapterError`].
//! - The core depends only on this contract, never on a concrete adapter,
//!   and dispatches on the declared [`SourceCategory`], not on runtime type
//!   identity.
//!
//! ## Category rules
//! - `Ticketing` adapters populate `functional_data` and nothing else.
//! - `VersionControl` adapters populate `technical_data` and nothing else.
//! - `FileBased` adapters return raw documents, passed through untouched to
//!   the render context.
//!
//! Output is treated as untrusted: [`validate_output`] enforces the category
//! rules before anything reaches the merge engine.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (feature
//!   `test-export-mocks`).

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};

use crate::config::SourceConfig;
use crate::error::{AdapterError, ContractViolation};
use crate::model::{ProjectData, SourceType};

/// Capability category an adapter declares up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Business-level items from ticketing systems (Jira, Azure DevOps, ...).
    Ticketing,
    /// Code-change items from version-control hosts (GitHub, GitLab, ...).
    VersionControl,
    /// Raw documents from file trees; opaque to the core.
    FileBased,
}

impl SourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::Ticketing => "ticketing",
            SourceCategory::VersionControl => "version_control",
            SourceCategory::FileBased => "file_based",
        }
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque text document from a file-based source, attached verbatim to the
/// final render context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Display name, typically the path relative to the source root.
    pub name: String,
    pub content: String,
}

/// Everything an adapter may hand back from one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutput {
    Project(ProjectData),
    Documents(Vec<RawDocument>),
}

/// Trait implemented by all data-source adapters.
///
/// Adapters are independent and side-effect-free with respect to each other,
/// so the pipeline may invoke any number of them concurrently.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Declared capability category; checked against the actual output.
    fn category(&self) -> SourceCategory;

    /// Provider tag stamped onto collected data.
    fn source_type(&self) -> SourceType;

    /// Human-readable adapter name for logs and reports.
    fn display_name(&self) -> String;

    /// Collect and normalize this source's data.
    ///
    /// The config's `settings` map is interpreted entirely by the adapter.
    async fn collect(&self, config: &SourceConfig) -> Result<SourceOutput, AdapterError>;
}

/// Check an adapter's output against its declared category.
///
/// # Errors
///
/// Returns the specific [`ContractViolation`] when the output populates an
/// aggregate the category forbids, or omits the one it requires.
pub fn validate_output(
    category: SourceCategory,
    output: &SourceOutput,
) -> Result<(), ContractViolation> {
    match (category, output) {
        (SourceCategory::FileBased, SourceOutput::Documents(_)) => Ok(()),
        (SourceCategory::FileBased, SourceOutput::Project(_)) => {
            Err(ContractViolation::FileBasedWithProject)
        }
        (_, SourceOutput::Documents(_)) => Err(ContractViolation::UnexpectedDocuments),
        (SourceCategory::Ticketing, SourceOutput::Project(data)) => {
            if data.technical_data.is_some() {
                Err(ContractViolation::TicketingWithTechnical)
            } else if data.functional_data.is_none() {
                Err(ContractViolation::TicketingWithoutFunctional)
            } else {
                Ok(())
            }
        }
        (SourceCategory::VersionControl, SourceOutput::Project(data)) => {
            if data.functional_data.is_some() {
                Err(ContractViolation::VersionControlWithFunctional)
            } else if data.technical_data.is_none() {
                Err(ContractViolation::VersionControlWithoutTechnical)
            } else {
                Ok(())
            }
        }
    }
}

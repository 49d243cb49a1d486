//! Normalized data model shared by all source adapters.
//!
//! Adapters translate provider-native payloads into these types; everything
//! downstream (merge, cross-reference resolution, queries, rendering) sees
//! only this model. Business items live in [`functional`], implementation
//! artifacts in [`technical`]; this module holds the types common to both
//! plus the top-level [`ProjectData`] aggregate.

pub mod functional;
pub mod technical;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use functional::FunctionalData;
use technical::TechnicalData;

/// Provider tag attached to collected data.
///
/// `Multi` marks an aggregate merged from more than one distinct provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    GitHub,
    Jira,
    AzureDevOps,
    LocalFiles,
    Custom,
    Multi,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::GitHub => "github",
            SourceType::Jira => "jira",
            SourceType::AzureDevOps => "azure_devops",
            SourceType::LocalFiles => "local_files",
            SourceType::Custom => "custom",
            SourceType::Multi => "multi",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Author of an item (commit, ticket, review, release).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            username: None,
        }
    }
}

/// Label or tag attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Repository metadata carried alongside the aggregates.
///
/// `full_name` is the canonical identifier (e.g. `owner/repo`); `name` is the
/// short display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub url: Option<String>,
    pub default_branch: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            url: None,
            default_branch: None,
        }
    }

    /// A repository record with neither name nor identifier carries no
    /// information and loses the first-non-empty merge rule.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.full_name.is_empty()
    }
}

/// A published (or draft) release of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag: String,
    pub name: String,
    pub description: Option<String>,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_prerelease: bool,
    pub is_draft: bool,
    pub url: Option<String>,
}

impl Release {
    pub fn new(tag: impl Into<String>, name: impl Into<String>, author: Author) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            description: None,
            author,
            created_at: Utc::now(),
            published_at: None,
            is_prerelease: false,
            is_draft: false,
            url: None,
        }
    }
}

/// Unified per-source (or merged) project data.
///
/// Ticketing adapters populate `functional_data`, version-control adapters
/// populate `technical_data`; an absent aggregate means "nothing collected
/// for this category", which is distinct from a present-but-empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub functional_data: Option<FunctionalData>,
    pub technical_data: Option<TechnicalData>,
    pub repository: Repository,
    pub releases: Vec<Release>,
    pub collected_at: DateTime<Utc>,
    pub source_type: SourceType,
}

impl ProjectData {
    pub fn new(repository: Repository, source_type: SourceType) -> Self {
        Self {
            functional_data: None,
            technical_data: None,
            repository,
            releases: Vec::new(),
            collected_at: Utc::now(),
            source_type,
        }
    }

    pub fn has_functional_data(&self) -> bool {
        self.functional_data.is_some()
    }

    pub fn has_technical_data(&self) -> bool {
        self.technical_data.is_some()
    }

    /// Documentation categories available in this aggregate.
    pub fn documentation_types(&self) -> Vec<&'static str> {
        let mut types = Vec::new();
        if self.has_functional_data() {
            types.push("functional");
        }
        if self.has_technical_data() {
            types.push("technical");
        }
        types
    }

    /// Latest published, non-draft release by publication date.
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases
            .iter()
            .filter(|r| !r.is_draft)
            .filter(|r| r.published_at.is_some())
            .max_by_key(|r| r.published_at)
    }
}

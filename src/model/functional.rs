//! Business-item model: epics, features, user stories and requirements.
//!
//! Produced by ticketing adapters. Items form a containment hierarchy by id
//! reference: stories point at features and epics, features point at epics.
//! Requirements stand alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, Label, SourceType};

/// Normalized workflow status. Adapters map provider vocabularies onto this
/// closed set; provider-native statuses never reach the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Closed,
    Blocked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Closed => "closed",
            Status::Blocked => "blocked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Closed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized priority, mapped adapter-locally like [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// High-level business initiative grouping features and stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    /// Globally-unique adapter-assigned identifier, used for internal links.
    pub id: String,
    /// Human-facing key (e.g. `PROJ-123`), used for cross-references.
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub author: Author,
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub acceptance_criteria: Vec<String>,
}

impl Epic {
    pub fn new(id: impl Into<String>, key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            title: title.into(),
            description: None,
            status: Status::Open,
            priority: Priority::Medium,
            author: Author::default(),
            labels: Vec::new(),
            created_at: Utc::now(),
            acceptance_criteria: Vec::new(),
        }
    }
}

/// Product feature, optionally belonging to an epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    /// Parent epic by id. A dangling reference is kept as-is and resolves to
    /// an empty lookup, never an error.
    pub epic_id: Option<String>,
    pub epic_key: Option<String>,
    pub author: Author,
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub acceptance_criteria: Vec<String>,
}

impl Feature {
    pub fn new(id: impl Into<String>, key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            title: title.into(),
            description: None,
            status: Status::Open,
            priority: Priority::Medium,
            epic_id: None,
            epic_key: None,
            author: Author::default(),
            labels: Vec::new(),
            created_at: Utc::now(),
            acceptance_criteria: Vec::new(),
        }
    }
}

/// User story, optionally belonging to a feature and/or an epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: String,
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub epic_id: Option<String>,
    pub feature_id: Option<String>,
    pub story_points: Option<u32>,
    pub sprint: Option<String>,
    pub author: Author,
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub acceptance_criteria: Vec<String>,
}

impl UserStory {
    pub fn new(id: impl Into<String>, key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            title: title.into(),
            description: None,
            status: Status::Open,
            priority: Priority::Medium,
            epic_id: None,
            feature_id: None,
            story_points: None,
            sprint: None,
            author: Author::default(),
            labels: Vec::new(),
            created_at: Utc::now(),
            acceptance_criteria: Vec::new(),
        }
    }
}

/// Formal requirement. Standalone: not part of the epic/feature hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub key: String,
    pub title: String,
    pub description: String,
    /// Requirement class: functional, non-functional, constraint, ...
    pub kind: String,
    pub status: Status,
    pub priority: Priority,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub verification_method: Option<String>,
}

impl Requirement {
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            title: title.into(),
            description: description.into(),
            kind: "functional".to_string(),
            status: Status::Open,
            priority: Priority::Medium,
            author: Author::default(),
            created_at: Utc::now(),
            verification_method: None,
        }
    }
}

/// All business items collected from one source (or merged from several).
///
/// Invariant: no two items in the same sequence share an `id`. The merge
/// engine enforces this; adapters are expected to uphold it per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalData {
    pub epics: Vec<Epic>,
    pub features: Vec<Feature>,
    pub user_stories: Vec<UserStory>,
    pub requirements: Vec<Requirement>,
    pub project_name: String,
    pub project_key: Option<String>,
    pub source_type: SourceType,
    pub collected_at: DateTime<Utc>,
}

impl FunctionalData {
    pub fn new(project_name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            epics: Vec::new(),
            features: Vec::new(),
            user_stories: Vec::new(),
            requirements: Vec::new(),
            project_name: project_name.into(),
            project_key: None,
            source_type,
            collected_at: Utc::now(),
        }
    }

    /// Epics still in flight: open or in progress.
    pub fn open_epics(&self) -> Vec<&Epic> {
        self.epics
            .iter()
            .filter(|e| matches!(e.status, Status::Open | Status::InProgress))
            .collect()
    }

    pub fn epics_with_status(&self, status: Status) -> Vec<&Epic> {
        self.epics.iter().filter(|e| e.status == status).collect()
    }

    pub fn features_with_status(&self, status: Status) -> Vec<&Feature> {
        self.features.iter().filter(|f| f.status == status).collect()
    }

    pub fn stories_with_status(&self, status: Status) -> Vec<&UserStory> {
        self.user_stories
            .iter()
            .filter(|s| s.status == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(Status::Closed.is_terminal());
        assert!(!Status::Blocked.is_terminal());
        assert!(Status::Open.is_active());
        assert!(Status::InProgress.is_active());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            r#""in_progress""#
        );
        assert_eq!(
            serde_json::from_str::<Priority>(r#""critical""#).unwrap(),
            Priority::Critical
        );
    }

    #[test]
    fn open_epics_include_in_progress() {
        let mut data = FunctionalData::new("widget", SourceType::Jira);
        let mut open = Epic::new("e1", "PROJ-1", "Checkout");
        open.status = Status::Open;
        let mut in_progress = Epic::new("e2", "PROJ-2", "Payments");
        in_progress.status = Status::InProgress;
        let mut closed = Epic::new("e3", "PROJ-3", "Search");
        closed.status = Status::Closed;
        let mut blocked = Epic::new("e4", "PROJ-4", "Profile");
        blocked.status = Status::Blocked;
        data.epics = vec![open, in_progress, closed, blocked];

        let open_ids: Vec<&str> = data.open_epics().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(open_ids, vec!["e1", "e2"]);
    }

    #[test]
    fn status_filters_preserve_sequence_order() {
        let mut data = FunctionalData::new("widget", SourceType::Jira);
        for (id, status) in [
            ("s1", Status::Closed),
            ("s2", Status::Open),
            ("s3", Status::Closed),
        ] {
            let mut story = UserStory::new(id, format!("PROJ-{id}"), id);
            story.status = status;
            data.user_stories.push(story);
        }

        let closed: Vec<&str> = data
            .stories_with_status(Status::Closed)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(closed, vec!["s1", "s3"]);
    }
}

//! Read-only query surface over a resolved aggregate.
//!
//! Everything here is a pure function of the resolved state: repeated calls
//! return identical results, which keeps document generation repeatable. The
//! rendering stage reads through these accessors (plus direct read access to
//! the collections) and never mutates.

use crate::model::functional::{Feature, UserStory};
use crate::model::technical::{Commit, PullRequest};
use crate::model::ProjectData;
use crate::resolve::LinkIndex;

/// A merged aggregate with its link index attached.
///
/// Produced by [`crate::resolve::resolve`]; scoped to one generation run.
#[derive(Debug)]
pub struct ResolvedProject {
    data: ProjectData,
    links: LinkIndex,
}

impl ResolvedProject {
    pub(crate) fn new(data: ProjectData, links: LinkIndex) -> Self {
        Self { data, links }
    }

    /// Direct read access to the merged aggregate.
    pub fn data(&self) -> &ProjectData {
        &self.data
    }

    /// Direct read access to the link index.
    pub fn links(&self) -> &LinkIndex {
        &self.links
    }

    pub fn has_functional_data(&self) -> bool {
        self.data.has_functional_data()
    }

    pub fn has_technical_data(&self) -> bool {
        self.data.has_technical_data()
    }

    /// Features whose `epic_id` is `epic_id`, in original sequence order.
    pub fn features_under_epic(&self, epic_id: &str) -> Vec<&Feature> {
        let Some(functional) = self.data.functional_data.as_ref() else {
            return Vec::new();
        };
        self.links
            .feature_positions(epic_id)
            .iter()
            .filter_map(|&position| functional.features.get(position))
            .collect()
    }

    /// Stories whose `epic_id` is `epic_id`, in original sequence order.
    pub fn stories_under_epic(&self, epic_id: &str) -> Vec<&UserStory> {
        let Some(functional) = self.data.functional_data.as_ref() else {
            return Vec::new();
        };
        self.links
            .story_positions_by_epic(epic_id)
            .iter()
            .filter_map(|&position| functional.user_stories.get(position))
            .collect()
    }

    /// Stories whose `feature_id` is `feature_id`, in original sequence order.
    pub fn stories_under_feature(&self, feature_id: &str) -> Vec<&UserStory> {
        let Some(functional) = self.data.functional_data.as_ref() else {
            return Vec::new();
        };
        self.links
            .story_positions_by_feature(feature_id)
            .iter()
            .filter_map(|&position| functional.user_stories.get(position))
            .collect()
    }

    /// Commits referencing the given business-item key.
    pub fn commits_for_key(&self, key: &str) -> Vec<&Commit> {
        let Some(technical) = self.data.technical_data.as_ref() else {
            return Vec::new();
        };
        self.links
            .commit_positions(key)
            .iter()
            .filter_map(|&position| technical.commits.get(position))
            .collect()
    }

    /// Pull requests referencing the given business-item key.
    pub fn pull_requests_for_key(&self, key: &str) -> Vec<&PullRequest> {
        let Some(technical) = self.data.technical_data.as_ref() else {
            return Vec::new();
        };
        self.links
            .pr_positions(key)
            .iter()
            .filter_map(|&position| technical.pull_requests.get(position))
            .collect()
    }

    /// Business-item keys the given commit references.
    pub fn keys_for_commit(&self, sha: &str) -> &[String] {
        self.links.keys_for_commit(sha)
    }

    /// Business-item keys the given pull request references.
    pub fn keys_for_pull_request(&self, number: u64) -> &[String] {
        self.links.keys_for_pull_request(number)
    }
}

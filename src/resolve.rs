//! Cross-reference resolver: links business and technical items by key.
//!
//! Runs once over the merged aggregate and builds a derived [`LinkIndex`];
//! items themselves are never mutated. References are weak and best-effort:
//! a key with no matching business item stays in the index as an unresolved
//! entry and resolves to an empty lookup, never an error (the item may live
//! in a source not configured for this run).

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::model::ProjectData;
use crate::normalize::ReferencePattern;
use crate::query::ResolvedProject;

/// Resolver configuration, passed explicitly so resolution is a pure
/// function of (aggregate, configuration).
#[derive(Debug, Clone, Default)]
pub struct ResolveConfig {
    pub reference_pattern: ReferencePattern,
}

/// Derived link tables over the merged aggregate.
///
/// Positions index into the aggregate's sequences, in original order, so
/// grouped lookups are O(1) after this one O(n) build. Built and owned by
/// [`resolve`]; consumers only read.
#[derive(Debug, Default)]
pub struct LinkIndex {
    commit_positions_by_key: HashMap<String, Vec<usize>>,
    pr_positions_by_key: HashMap<String, Vec<usize>>,
    keys_by_commit: HashMap<String, Vec<String>>,
    keys_by_pr: HashMap<u64, Vec<String>>,
    feature_positions_by_epic: HashMap<String, Vec<usize>>,
    story_positions_by_epic: HashMap<String, Vec<usize>>,
    story_positions_by_feature: HashMap<String, Vec<usize>>,
    unresolved_keys: Vec<String>,
}

impl LinkIndex {
    pub(crate) fn commit_positions(&self, key: &str) -> &[usize] {
        self.commit_positions_by_key
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn pr_positions(&self, key: &str) -> &[usize] {
        self.pr_positions_by_key
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn feature_positions(&self, epic_id: &str) -> &[usize] {
        self.feature_positions_by_epic
            .get(epic_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn story_positions_by_epic(&self, epic_id: &str) -> &[usize] {
        self.story_positions_by_epic
            .get(epic_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn story_positions_by_feature(&self, feature_id: &str) -> &[usize] {
        self.story_positions_by_feature
            .get(feature_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Business-item keys this commit references, in first-seen order.
    pub fn keys_for_commit(&self, sha: &str) -> &[String] {
        self.keys_by_commit
            .get(sha)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Business-item keys this pull request references, in first-seen order.
    pub fn keys_for_pull_request(&self, number: u64) -> &[String] {
        self.keys_by_pr
            .get(&number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Referenced keys with no matching business item, sorted.
    pub fn unresolved_keys(&self) -> &[String] {
        &self.unresolved_keys
    }
}

/// Resolve cross-references over a merged aggregate.
pub fn resolve(data: ProjectData, config: &ResolveConfig) -> ResolvedProject {
    let mut index = LinkIndex::default();
    let pattern = &config.reference_pattern;

    let mut business_keys: HashSet<String> = HashSet::new();
    if let Some(functional) = data.functional_data.as_ref() {
        business_keys.extend(functional.epics.iter().map(|e| e.key.clone()));
        business_keys.extend(functional.features.iter().map(|f| f.key.clone()));
        business_keys.extend(functional.user_stories.iter().map(|s| s.key.clone()));
        business_keys.extend(functional.requirements.iter().map(|r| r.key.clone()));

        for (position, feature) in functional.features.iter().enumerate() {
            if let Some(epic_id) = feature.epic_id.as_ref() {
                index
                    .feature_positions_by_epic
                    .entry(epic_id.clone())
                    .or_default()
                    .push(position);
            }
        }
        for (position, story) in functional.user_stories.iter().enumerate() {
            if let Some(epic_id) = story.epic_id.as_ref() {
                index
                    .story_positions_by_epic
                    .entry(epic_id.clone())
                    .or_default()
                    .push(position);
            }
            if let Some(feature_id) = story.feature_id.as_ref() {
                index
                    .story_positions_by_feature
                    .entry(feature_id.clone())
                    .or_default()
                    .push(position);
            }
        }
    }

    let mut unresolved: BTreeSet<String> = BTreeSet::new();

    if let Some(technical) = data.technical_data.as_ref() {
        for (position, commit) in technical.commits.iter().enumerate() {
            let keys = referenced_keys(
                &commit.linked_issue_keys,
                [commit.message.as_str()],
                pattern,
            );
            for key in &keys {
                if !business_keys.contains(key) {
                    unresolved.insert(key.clone());
                }
                index
                    .commit_positions_by_key
                    .entry(key.clone())
                    .or_default()
                    .push(position);
            }
            index.keys_by_commit.insert(commit.sha.clone(), keys);
        }

        for (position, pr) in technical.pull_requests.iter().enumerate() {
            let keys = referenced_keys(
                &pr.linked_issue_keys,
                [pr.title.as_str(), pr.description.as_deref().unwrap_or_default()],
                pattern,
            );
            for key in &keys {
                if !business_keys.contains(key) {
                    unresolved.insert(key.clone());
                }
                index
                    .pr_positions_by_key
                    .entry(key.clone())
                    .or_default()
                    .push(position);
            }
            index.keys_by_pr.insert(pr.number, keys);
        }
    }

    index.unresolved_keys = unresolved.into_iter().collect();

    debug!(
        linked_keys = index.commit_positions_by_key.len() + index.pr_positions_by_key.len(),
        unresolved = index.unresolved_keys.len(),
        epics_with_children =
            index.feature_positions_by_epic.len() + index.story_positions_by_epic.len(),
        "[RESOLVE] Link index built"
    );

    ResolvedProject::new(data, index)
}

/// Union of adapter-populated keys and pattern matches over the given texts,
/// first-seen order, deduplicated.
fn referenced_keys<'a>(
    declared: &[String],
    texts: impl IntoIterator<Item = &'a str>,
    pattern: &ReferencePattern,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for key in declared {
        if seen.insert(key.clone()) {
            keys.push(key.clone());
        }
    }
    for text in texts {
        for key in pattern.extract(text) {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::functional::{Epic, Feature, FunctionalData, UserStory};
    use crate::model::technical::{Commit, TechnicalData};
    use crate::model::{Author, ProjectData, Repository, SourceType};

    fn resolved_fixture() -> ResolvedProject {
        let mut functional = FunctionalData::new("widget", SourceType::Jira);
        functional.epics.push(Epic::new("E1", "PROJ-1", "Checkout"));
        let mut feature = Feature::new("F1", "PROJ-2", "Cart");
        feature.epic_id = Some("E1".to_string());
        functional.features.push(feature);
        let mut story = UserStory::new("U1", "PROJ-3", "Add to cart");
        story.epic_id = Some("E1".to_string());
        story.feature_id = Some("F1".to_string());
        functional.user_stories.push(story);

        let mut technical = TechnicalData::new(SourceType::GitHub);
        technical.commits.push(Commit::new(
            "abc123d",
            "feat: cart total, fixes PROJ-3",
            Author::named("dev"),
        ));
        let mut declared = Commit::new("def456a", "chore: cleanup", Author::named("dev"));
        declared.linked_issue_keys.push("PROJ-1".to_string());
        technical.commits.push(declared);
        technical.commits.push(Commit::new(
            "0123abc",
            "fix: dangling ref PROJ-999",
            Author::named("dev"),
        ));

        let mut data = ProjectData::new(Repository::new("widget", "acme/widget"), SourceType::Multi);
        data.functional_data = Some(functional);
        data.technical_data = Some(technical);
        resolve(data, &ResolveConfig::default())
    }

    #[test]
    fn hierarchy_grouping_by_direct_reference() {
        let project = resolved_fixture();
        let features: Vec<&str> = project
            .features_under_epic("E1")
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(features, vec!["F1"]);

        let stories: Vec<&str> = project
            .stories_under_epic("E1")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(stories, vec!["U1"]);

        let by_feature: Vec<&str> = project
            .stories_under_feature("F1")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(by_feature, vec!["U1"]);
    }

    #[test]
    fn unknown_parent_is_an_empty_lookup() {
        let project = resolved_fixture();
        assert!(project.features_under_epic("E404").is_empty());
        assert!(project.stories_under_feature("F404").is_empty());
    }

    #[test]
    fn message_references_and_declared_keys_both_link() {
        let project = resolved_fixture();

        let from_message: Vec<&str> = project
            .commits_for_key("PROJ-3")
            .iter()
            .map(|c| c.sha.as_str())
            .collect();
        assert_eq!(from_message, vec!["abc123d"]);

        let from_declared: Vec<&str> = project
            .commits_for_key("PROJ-1")
            .iter()
            .map(|c| c.sha.as_str())
            .collect();
        assert_eq!(from_declared, vec!["def456a"]);

        assert_eq!(project.keys_for_commit("abc123d"), ["PROJ-3"]);
    }

    #[test]
    fn dangling_reference_is_retained_not_fatal() {
        let project = resolved_fixture();
        assert_eq!(project.links().unresolved_keys(), ["PROJ-999"]);
        // The dangling key still resolves to the commits that mention it.
        assert_eq!(project.commits_for_key("PROJ-999").len(), 1);
        // And an unknown key not referenced anywhere is simply empty.
        assert!(project.commits_for_key("PROJ-500").is_empty());
    }
}

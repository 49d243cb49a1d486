//! Merge engine: combines per-source project data into one aggregate.
//!
//! Merge rules:
//! - business items: concatenate in input order, dedup by `id`, last writer
//!   wins, with the earlier occurrence's position kept
//! - commits: same rule keyed by sha; pull requests: same rule keyed by number
//! - `key` collisions alone never merge two items
//! - code metrics: last writer wins per language key
//! - technical debt: concatenated, never deduped
//! - repository metadata and functional project name/key: first non-empty wins
//! - releases: last writer wins per tag, position stable
//!
//! An empty partition produces an absent aggregate, not an empty container.
//! Malformed items (missing identity) are dropped with a recorded warning
//! before any rule applies. Merging is a pure function of the ordered inputs;
//! the same inputs always produce the identical aggregate.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{ItemKind, MergeWarning};
use crate::model::functional::FunctionalData;
use crate::model::technical::TechnicalData;
use crate::model::{ProjectData, Repository, SourceType};

/// Result of one merge pass: the combined aggregate plus every warning
/// recorded while sanitizing the inputs.
#[derive(Debug)]
pub struct MergeOutcome {
    pub data: ProjectData,
    pub warnings: Vec<MergeWarning>,
}

/// Merge per-source project data, in configuration order, into one aggregate.
pub fn merge(inputs: Vec<ProjectData>) -> MergeOutcome {
    let mut warnings = Vec::new();

    let mut functional_inputs = Vec::new();
    let mut technical_inputs = Vec::new();
    let mut repositories = Vec::new();
    let mut releases = Vec::new();
    let mut provider_tags = Vec::new();
    let mut latest_collection: Option<DateTime<Utc>> = None;

    for mut input in inputs {
        sanitize(&mut input, &mut warnings);
        provider_tags.push(input.source_type);
        latest_collection = latest_collection.max(Some(input.collected_at));
        repositories.push(input.repository);
        releases.extend(input.releases);
        if let Some(functional) = input.functional_data {
            functional_inputs.push(functional);
        }
        if let Some(technical) = input.technical_data {
            technical_inputs.push(technical);
        }
    }

    let functional_count = functional_inputs.len();
    let technical_count = technical_inputs.len();

    let data = ProjectData {
        functional_data: merge_functional(functional_inputs),
        technical_data: merge_technical(technical_inputs),
        repository: pick_repository(repositories),
        releases: dedup_last_wins(releases, |r| r.tag.clone()),
        collected_at: latest_collection.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        // Zero collected sources leave no provider to inherit; tag like an
        // empty local collection.
        source_type: merged_source_type(provider_tags.iter().copied())
            .unwrap_or(SourceType::LocalFiles),
    };

    debug!(
        functional_sources = functional_count,
        technical_sources = technical_count,
        warnings = warnings.len(),
        "[MERGE] Merge pass complete"
    );

    MergeOutcome { data, warnings }
}

fn merge_functional(inputs: Vec<FunctionalData>) -> Option<FunctionalData> {
    if inputs.is_empty() {
        return None;
    }

    let source_type =
        merged_source_type(inputs.iter().map(|f| f.source_type)).unwrap_or(SourceType::Multi);
    let collected_at = inputs
        .iter()
        .map(|f| f.collected_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let project_name = inputs
        .iter()
        .map(|f| f.project_name.as_str())
        .find(|name| !name.is_empty())
        .unwrap_or_default()
        .to_string();
    let project_key = inputs
        .iter()
        .find_map(|f| f.project_key.as_ref().filter(|k| !k.is_empty()).cloned());

    let mut epics = Vec::new();
    let mut features = Vec::new();
    let mut user_stories = Vec::new();
    let mut requirements = Vec::new();
    for input in inputs {
        epics.extend(input.epics);
        features.extend(input.features);
        user_stories.extend(input.user_stories);
        requirements.extend(input.requirements);
    }

    Some(FunctionalData {
        epics: dedup_last_wins(epics, |e| e.id.clone()),
        features: dedup_last_wins(features, |f| f.id.clone()),
        user_stories: dedup_last_wins(user_stories, |s| s.id.clone()),
        requirements: dedup_last_wins(requirements, |r| r.id.clone()),
        project_name,
        project_key,
        source_type,
        collected_at,
    })
}

fn merge_technical(inputs: Vec<TechnicalData>) -> Option<TechnicalData> {
    if inputs.is_empty() {
        return None;
    }

    let source_type =
        merged_source_type(inputs.iter().map(|t| t.source_type)).unwrap_or(SourceType::Multi);
    let collected_at = inputs
        .iter()
        .map(|t| t.collected_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let mut commits = Vec::new();
    let mut pull_requests = Vec::new();
    let mut code_metrics = std::collections::BTreeMap::new();
    let mut technical_debt = Vec::new();
    for input in inputs {
        commits.extend(input.commits);
        pull_requests.extend(input.pull_requests);
        // Later sources overwrite earlier entries per language key.
        code_metrics.extend(input.code_metrics);
        technical_debt.extend(input.technical_debt);
    }

    Some(TechnicalData {
        commits: dedup_last_wins(commits, |c| c.sha.clone()),
        pull_requests: dedup_last_wins(pull_requests, |pr| pr.number),
        code_metrics,
        technical_debt,
        source_type,
        collected_at,
    })
}

/// Deduplicate by key, keeping the last occurrence's value at the first
/// occurrence's position.
fn dedup_last_wins<T, K>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T>
where
    K: Eq + Hash,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut deduped: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match positions.entry(key(&item)) {
            Entry::Occupied(occupied) => deduped[*occupied.get()] = item,
            Entry::Vacant(vacant) => {
                vacant.insert(deduped.len());
                deduped.push(item);
            }
        }
    }
    deduped
}

fn pick_repository(candidates: Vec<Repository>) -> Repository {
    let mut picked = Repository::default();
    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }
        if picked.is_empty() {
            picked = candidate;
        } else {
            info!(
                ignored = %candidate.full_name,
                kept = %picked.full_name,
                "[MERGE] Ignoring additional repository metadata"
            );
        }
    }
    picked
}

/// `None` for zero tags, the single tag when all inputs agree on one
/// provider, `Multi` otherwise.
fn merged_source_type(tags: impl Iterator<Item = SourceType>) -> Option<SourceType> {
    let mut merged = None;
    for tag in tags {
        merged = match merged {
            None => Some(tag),
            Some(current) if current == tag => Some(current),
            Some(_) => return Some(SourceType::Multi),
        };
    }
    merged
}

/// Drop items whose identity is missing, recording one warning each.
fn sanitize(data: &mut ProjectData, warnings: &mut Vec<MergeWarning>) {
    let source_type = data.source_type;

    if let Some(functional) = data.functional_data.as_mut() {
        drop_malformed(
            &mut functional.epics,
            ItemKind::Epic,
            source_type,
            warnings,
            |e| !e.id.is_empty(),
            |e| format!("empty id (title {:?})", e.title),
        );
        drop_malformed(
            &mut functional.features,
            ItemKind::Feature,
            source_type,
            warnings,
            |f| !f.id.is_empty(),
            |f| format!("empty id (title {:?})", f.title),
        );
        drop_malformed(
            &mut functional.user_stories,
            ItemKind::UserStory,
            source_type,
            warnings,
            |s| !s.id.is_empty(),
            |s| format!("empty id (title {:?})", s.title),
        );
        drop_malformed(
            &mut functional.requirements,
            ItemKind::Requirement,
            source_type,
            warnings,
            |r| !r.id.is_empty(),
            |r| format!("empty id (title {:?})", r.title),
        );
    }

    if let Some(technical) = data.technical_data.as_mut() {
        drop_malformed(
            &mut technical.commits,
            ItemKind::Commit,
            source_type,
            warnings,
            |c| !c.sha.is_empty(),
            |c| format!("empty sha (subject {:?})", c.subject()),
        );
        drop_malformed(
            &mut technical.pull_requests,
            ItemKind::PullRequest,
            source_type,
            warnings,
            |pr| pr.number != 0,
            |pr| format!("number is zero (title {:?})", pr.title),
        );
        drop_malformed(
            &mut technical.technical_debt,
            ItemKind::TechnicalDebt,
            source_type,
            warnings,
            |d| !d.id.is_empty(),
            |d| format!("empty id (title {:?})", d.title),
        );
        if technical.code_metrics.remove("").is_some() {
            let warning = MergeWarning::MalformedItem {
                kind: ItemKind::CodeMetric,
                source_type,
                detail: "empty language key".to_string(),
            };
            warn!(warning = %warning, "[MERGE] Dropping malformed item");
            warnings.push(warning);
        }
    }
}

fn drop_malformed<T>(
    items: &mut Vec<T>,
    kind: ItemKind,
    source_type: SourceType,
    warnings: &mut Vec<MergeWarning>,
    valid: impl Fn(&T) -> bool,
    describe: impl Fn(&T) -> String,
) {
    items.retain(|item| {
        if valid(item) {
            return true;
        }
        let warning = MergeWarning::MalformedItem {
            kind,
            source_type,
            detail: describe(item),
        };
        warn!(warning = %warning, "[MERGE] Dropping malformed item");
        warnings.push(warning);
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::functional::Epic;
    use crate::model::technical::{CodeMetric, Commit, DebtSeverity, TechnicalDebtItem};
    use crate::model::{Author, Release};

    fn ticketing_input(source_type: SourceType, epics: Vec<Epic>) -> ProjectData {
        let mut functional = FunctionalData::new("widget", source_type);
        functional.epics = epics;
        let mut data = ProjectData::new(Repository::default(), source_type);
        data.functional_data = Some(functional);
        data
    }

    fn vcs_input(source_type: SourceType, commits: Vec<Commit>) -> ProjectData {
        let mut technical = TechnicalData::new(source_type);
        technical.commits = commits;
        let mut data = ProjectData::new(Repository::default(), source_type);
        data.technical_data = Some(technical);
        data
    }

    #[test]
    fn last_writer_wins_keeps_earlier_position() {
        let mut first = Epic::new("E1", "PROJ-1", "Old title");
        first.status = crate::model::functional::Status::Open;
        let second = Epic::new("E2", "PROJ-2", "Untouched");
        let replacement = Epic::new("E1", "PROJ-1", "New title");

        let outcome = merge(vec![
            ticketing_input(SourceType::Jira, vec![first, second]),
            ticketing_input(SourceType::Jira, vec![replacement]),
        ]);

        let functional = outcome.data.functional_data.unwrap();
        let titles: Vec<&str> = functional.epics.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["New title", "Untouched"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn key_collision_alone_does_not_merge() {
        let one = Epic::new("E1", "PROJ-1", "From project A");
        let other = Epic::new("E2", "PROJ-1", "From project B");

        let outcome = merge(vec![
            ticketing_input(SourceType::Jira, vec![one]),
            ticketing_input(SourceType::Jira, vec![other]),
        ]);

        assert_eq!(outcome.data.functional_data.unwrap().epics.len(), 2);
    }

    #[test]
    fn absent_versus_empty_partitions() {
        let outcome = merge(vec![ticketing_input(SourceType::Jira, Vec::new())]);
        let functional = outcome.data.functional_data.as_ref().unwrap();
        assert!(functional.epics.is_empty());
        assert!(outcome.data.technical_data.is_none());

        let nothing = merge(Vec::new());
        assert!(nothing.data.functional_data.is_none());
        assert!(nothing.data.technical_data.is_none());
        assert_eq!(nothing.data.source_type, SourceType::LocalFiles);
    }

    #[test]
    fn commits_dedup_by_sha() {
        let a1 = Commit::new("abc123d", "first version", Author::named("dev"));
        let a2 = Commit::new("abc123d", "second version", Author::named("dev"));
        let b = Commit::new("def456a", "other", Author::named("dev"));

        let outcome = merge(vec![
            vcs_input(SourceType::GitHub, vec![a1, b]),
            vcs_input(SourceType::GitHub, vec![a2]),
        ]);

        let technical = outcome.data.technical_data.unwrap();
        let messages: Vec<&str> = technical
            .commits
            .iter()
            .map(|c| c.message.as_str())
            .collect();
        assert_eq!(messages, vec!["second version", "other"]);
    }

    #[test]
    fn code_metrics_last_writer_wins_and_debt_concatenates() {
        let mut first = TechnicalData::new(SourceType::GitHub);
        first.code_metrics.insert(
            "Rust".to_string(),
            CodeMetric {
                language: "Rust".to_string(),
                file_count: 10,
                code_lines: 1_000,
                blank_lines: 100,
                comment_lines: 50,
                avg_complexity: Some(3.2),
            },
        );
        first.technical_debt.push(TechnicalDebtItem {
            id: "debt-1".to_string(),
            title: "Tangled module".to_string(),
            description: "Needs splitting".to_string(),
            severity: DebtSeverity::Medium,
            kind: "code_smell".to_string(),
            path: None,
            line: None,
            estimated_effort: None,
        });

        let mut second = TechnicalData::new(SourceType::GitHub);
        second.code_metrics.insert(
            "Rust".to_string(),
            CodeMetric {
                language: "Rust".to_string(),
                file_count: 12,
                code_lines: 1_200,
                blank_lines: 120,
                comment_lines: 60,
                avg_complexity: Some(3.0),
            },
        );
        second.technical_debt.push(TechnicalDebtItem {
            id: "debt-1".to_string(),
            title: "Tangled module".to_string(),
            description: "Still needs splitting".to_string(),
            severity: DebtSeverity::Medium,
            kind: "code_smell".to_string(),
            path: None,
            line: None,
            estimated_effort: None,
        });

        let mut input_one = ProjectData::new(Repository::default(), SourceType::GitHub);
        input_one.technical_data = Some(first);
        let mut input_two = ProjectData::new(Repository::default(), SourceType::GitHub);
        input_two.technical_data = Some(second);

        let technical = merge(vec![input_one, input_two])
            .data
            .technical_data
            .unwrap();
        assert_eq!(technical.code_metrics["Rust"].file_count, 12);
        assert_eq!(technical.technical_debt.len(), 2);
    }

    #[test]
    fn repository_first_non_empty_wins() {
        let mut first = ticketing_input(SourceType::Jira, Vec::new());
        first.repository = Repository::default();
        let mut second = vcs_input(SourceType::GitHub, Vec::new());
        second.repository = Repository::new("widget", "acme/widget");
        let mut third = vcs_input(SourceType::GitHub, Vec::new());
        third.repository = Repository::new("other", "acme/other");

        let outcome = merge(vec![first, second, third]);
        assert_eq!(outcome.data.repository.full_name, "acme/widget");
    }

    #[test]
    fn source_type_marks_multi_provider_runs() {
        let single = merge(vec![ticketing_input(SourceType::Jira, Vec::new())]);
        assert_eq!(single.data.source_type, SourceType::Jira);

        let multi = merge(vec![
            ticketing_input(SourceType::Jira, Vec::new()),
            vcs_input(SourceType::GitHub, Vec::new()),
        ]);
        assert_eq!(multi.data.source_type, SourceType::Multi);
    }

    #[test]
    fn malformed_items_dropped_with_warning() {
        let good = Epic::new("E1", "PROJ-1", "Valid");
        let bad = Epic::new("", "PROJ-2", "No id");
        let mut bad_commit = Commit::new("", "orphan", Author::named("dev"));
        bad_commit.linked_issue_keys.push("PROJ-1".to_string());

        let outcome = merge(vec![
            ticketing_input(SourceType::Jira, vec![good, bad]),
            vcs_input(SourceType::GitHub, vec![bad_commit]),
        ]);

        assert_eq!(outcome.data.functional_data.as_ref().unwrap().epics.len(), 1);
        assert!(outcome
            .data
            .technical_data
            .as_ref()
            .unwrap()
            .commits
            .is_empty());
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn releases_dedup_by_tag_last_wins() {
        let author = Author::named("rel-bot");
        let mut first = ticketing_input(SourceType::Jira, Vec::new());
        first.releases = vec![
            Release::new("v1.0.0", "First cut", author.clone()),
            Release::new("v1.1.0", "Minor", author.clone()),
        ];
        let mut second = vcs_input(SourceType::GitHub, Vec::new());
        second.releases = vec![Release::new("v1.0.0", "First cut, corrected", author)];

        let outcome = merge(vec![first, second]);
        let names: Vec<&str> = outcome
            .data
            .releases
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["First cut, corrected", "Minor"]);
    }
}

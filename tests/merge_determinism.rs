use docloom_core::merge::merge;
use docloom_core::model::functional::{Epic, FunctionalData, UserStory};
use docloom_core::model::technical::{CodeMetric, Commit, PullRequest, TechnicalData};
use docloom_core::model::{Author, ProjectData, Repository, SourceType};

fn fixture_inputs() -> Vec<ProjectData> {
    let mut functional_one = FunctionalData::new("widget", SourceType::Jira);
    functional_one.project_key = Some("PROJ".to_string());
    let mut epic = Epic::new("E1", "PROJ-1", "Checkout");
    epic.description = Some("End-to-end purchase flow".to_string());
    functional_one.epics.push(epic);
    let mut story = UserStory::new("U1", "PROJ-5", "Pay by card");
    story.epic_id = Some("E1".to_string());
    story.story_points = Some(5);
    functional_one.user_stories.push(story);

    let mut functional_two = FunctionalData::new("widget", SourceType::AzureDevOps);
    functional_two
        .epics
        .push(Epic::new("E1", "PROJ-1", "Checkout, revised"));
    functional_two.epics.push(Epic::new("E2", "PROJ-2", "Search"));

    let mut technical = TechnicalData::new(SourceType::GitHub);
    technical.commits.push(Commit::new(
        "abc123def",
        "feat: card payments PROJ-5",
        Author::named("dev"),
    ));
    technical
        .pull_requests
        .push(PullRequest::new(7, "Card payments", Author::named("dev")));
    technical.code_metrics.insert(
        "Rust".to_string(),
        CodeMetric {
            language: "Rust".to_string(),
            file_count: 42,
            code_lines: 9_000,
            blank_lines: 900,
            comment_lines: 450,
            avg_complexity: Some(2.7),
        },
    );

    let mut input_one = ProjectData::new(Repository::default(), SourceType::Jira);
    input_one.functional_data = Some(functional_one);
    let mut input_two = ProjectData::new(Repository::default(), SourceType::AzureDevOps);
    input_two.functional_data = Some(functional_two);
    let mut input_three =
        ProjectData::new(Repository::new("widget", "acme/widget"), SourceType::GitHub);
    input_three.technical_data = Some(technical);

    vec![input_one, input_two, input_three]
}

#[test]
fn merging_twice_is_byte_identical() {
    let inputs = fixture_inputs();
    let first = merge(inputs.clone());
    let second = merge(inputs);

    let first_json = serde_json::to_string(&first.data).unwrap();
    let second_json = serde_json::to_string(&second.data).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn merged_aggregate_upholds_identity_invariants() {
    let outcome = merge(fixture_inputs());
    let functional = outcome.data.functional_data.as_ref().unwrap();

    let mut ids: Vec<&str> = functional.epics.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2"]);
    ids.dedup();
    assert_eq!(ids.len(), functional.epics.len());

    // Replacement kept the earlier source's position but the later title.
    assert_eq!(functional.epics[0].title, "Checkout, revised");

    // Functional inputs came from two providers, technical from one.
    assert_eq!(functional.source_type, SourceType::Multi);
    let technical = outcome.data.technical_data.as_ref().unwrap();
    assert_eq!(technical.source_type, SourceType::GitHub);
    assert_eq!(outcome.data.source_type, SourceType::Multi);
}

#[test]
fn merged_functional_metadata_first_non_empty() {
    let outcome = merge(fixture_inputs());
    let functional = outcome.data.functional_data.as_ref().unwrap();
    assert_eq!(functional.project_name, "widget");
    assert_eq!(functional.project_key.as_deref(), Some("PROJ"));
}

//! Integration tests for compiling and executing queries.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{MockNotion, checkbox, page, relation, rich_text, title};
use norm_lib::error::{MappingError, RemoteError};
use norm_lib::parser::parse;
use norm_lib::query::{QueryBuilder, SortDirection};
use norm_lib::value::PropertyValue;
use serde::Deserialize;
use serde_json::json;

const SCHEMA: &str = r#"
model Task @notionDatabase("db1") {
  name      String    @title
  done      Boolean   @checkbox
  createdAt DateTime  @map("Created At")
  project   String    @relation("Project") @map("Project")
  subtasks  Task[]    @map("Subtasks")
}

model Project @notionDatabase("db2") {
  name String @title
}
"#;

fn task_query(mock: MockNotion) -> (Arc<MockNotion>, QueryBuilder<MockNotion>) {
    let mock = Arc::new(mock);
    let schema = parse(SCHEMA).unwrap();
    let query = schema.binding("Task").unwrap().query(mock.clone());
    (mock, query)
}

#[test]
fn single_filter_is_not_wrapped() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query.filter("done", "equals", true).compile();

    assert_eq!(
        compiled,
        json!({
            "database_id": "db1",
            "filter": { "property": "done", "checkbox": { "equals": true } }
        })
    );
}

#[test]
fn no_filters_omit_the_filter_key() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query.compile();

    assert_eq!(compiled, json!({ "database_id": "db1" }));
}

#[test]
fn filters_combine_with_and_in_order() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query
        .filter("name", "contains", "docs")
        .filter("done", "equals", false)
        .filter("createdAt", "on_or_after", "2024-01-01")
        .compile();

    assert_eq!(
        compiled["filter"],
        json!({ "and": [
            { "property": "name", "title": { "contains": "docs" } },
            { "property": "done", "checkbox": { "equals": false } },
            { "property": "Created At", "date": { "on_or_after": "2024-01-01" } }
        ]})
    );
}

#[test]
fn operator_names_accept_both_spellings() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query
        .filter("name", "startsWith", "a")
        .filter("name", "ends_with", "z")
        .filter("name", "greater_than", "m")
        .compile();

    assert_eq!(
        compiled["filter"],
        json!({ "and": [
            { "property": "name", "title": { "starts_with": "a" } },
            { "property": "name", "title": { "ends_with": "z" } },
            { "property": "name", "title": { "equals": "m" } }
        ]})
    );
}

#[test]
fn relation_properties_ignore_the_operator() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query.filter("project", "starts_with", "page-1").compile();

    assert_eq!(
        compiled["filter"],
        json!({ "property": "Project", "relation": { "contains": "page-1" } })
    );
}

#[test]
fn created_at_sorts_by_system_timestamp() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query
        .order_by("createdAt", SortDirection::Descending)
        .order_by("name", SortDirection::Ascending)
        .limit(10)
        .after("cursor-1")
        .compile();

    assert_eq!(
        compiled,
        json!({
            "database_id": "db1",
            "sorts": [
                { "timestamp": "created_time", "direction": "descending" },
                { "property": "name", "direction": "ascending" }
            ],
            "page_size": 10,
            "start_cursor": "cursor-1"
        })
    );
}

#[test]
fn relation_filter_uses_outer_property_and_first_condition() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query
        .filter_relation("project", |sub| sub.filter("id", "equals", "page-9"))
        .unwrap()
        .compile();

    assert_eq!(
        compiled["filter"],
        json!({ "property": "Project", "relation": { "contains": "page-9" } })
    );
}

#[tracing_test::traced_test]
#[test]
fn extra_relation_conditions_are_dropped_with_warning() {
    let (_, query) = task_query(MockNotion::new());

    let compiled = query
        .filter_relation("project", |sub| {
            sub.filter("id", "equals", "page-1")
                .filter("id", "equals", "page-2")
        })
        .unwrap()
        .compile();

    assert_eq!(compiled["filter"]["relation"]["contains"], json!("page-1"));
    assert!(logs_contain("dropping the rest"));
}

#[test]
fn relation_filter_without_target_fails_before_network() {
    let (mock, query) = task_query(MockNotion::new());

    let err = query
        .filter_relation("owner", |sub| sub.filter("id", "equals", "u1"))
        .err()
        .unwrap();

    assert_eq!(
        err,
        MappingError::UnknownRelation {
            model: "Task".to_string(),
            property: "owner".to_string(),
        }
    );
    assert_eq!(mock.total_calls(), 0);
}

#[test]
fn empty_relation_filter_fails_before_network() {
    let (mock, query) = task_query(MockNotion::new());

    let err = query.filter_relation("project", |sub| sub).err().unwrap();

    assert!(matches!(err, MappingError::EmptyRelationFilter { .. }));
    assert!(err.to_string().contains("at least one condition"));
    assert_eq!(mock.total_calls(), 0);
}

#[tokio::test]
async fn execute_decodes_records_in_order() {
    let mock = MockNotion::new().with_results(vec![
        page("t1", json!({ "name": title("Write docs"), "done": checkbox(true) })),
        page("t2", json!({ "name": title("Ship"), "done": checkbox(false) })),
    ]);
    let (mock, query) = task_query(mock);

    let records = query.filter("done", "equals", true).execute().await.unwrap();

    assert_eq!(mock.query_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.queries()[0]["database_id"], json!("db1"));

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["t1", "t2"]);
    assert_eq!(records[0].get("name").and_then(PropertyValue::as_text), Some("Write docs"));
    assert_eq!(records[0].get("done"), Some(&PropertyValue::Checkbox(true)));
    assert_eq!(records[0].created_time, "2024-05-01T10:00:00.000Z");
}

#[tokio::test]
async fn includes_resolve_plural_relations() {
    let mock = MockNotion::new()
        .with_results(vec![
            page("t1", json!({ "name": title("Parent"), "Subtasks": relation(&["s1", "s2"]) })),
            page("t2", json!({ "name": title("Leaf"), "Subtasks": relation(&[]) })),
        ])
        .with_page(page("s1", json!({ "name": title("First") })))
        .with_page(page("s2", json!({ "name": title("Second") })));
    let (mock, query) = task_query(mock);

    let records = query.include("subtasks").execute().await.unwrap();

    match records[0].get("Subtasks") {
        Some(PropertyValue::Records(related)) => {
            let names: Vec<_> = related
                .iter()
                .map(|r| r.get("name").and_then(PropertyValue::as_text).unwrap_or_default())
                .collect();
            assert_eq!(names, ["First", "Second"]);
        }
        other => panic!("expected resolved records, got {other:?}"),
    }
    assert_eq!(records[1].get("Subtasks"), Some(&PropertyValue::Records(vec![])));
    assert_eq!(mock.page_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn includes_keep_singular_relations_singular() {
    let mock = MockNotion::new()
        .with_results(vec![page("t1", json!({ "Project": rich_text("p1") }))])
        .with_page(page("p1", json!({ "name": title("Launch") })));
    let (_, query) = task_query(mock);

    let records = query.include("project").execute().await.unwrap();

    match records[0].get("Project") {
        Some(PropertyValue::Record(project)) => {
            assert_eq!(project.id, "p1");
            assert_eq!(project.get("name").and_then(PropertyValue::as_text), Some("Launch"));
        }
        other => panic!("expected a resolved record, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_related_page_fails_the_query() {
    let mock = MockNotion::new()
        .with_results(vec![page("t1", json!({ "Subtasks": relation(&["gone"]) }))]);
    let (_, query) = task_query(mock);

    let err = query.include("subtasks").execute().await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
#[tracing_test::traced_test]
async fn rejected_queries_are_logged_and_returned() {
    let mock = MockNotion::new().rejecting_queries(
        "validation_error",
        "body.filter.rich_text should be defined",
    );
    let (_, query) = task_query(mock);

    let err = query.filter("name", "equals", "x").execute().await.unwrap_err();

    assert!(matches!(err, RemoteError::Validation { ref code, .. } if code == "validation_error"));
    assert!(logs_contain("Notion rejected the compiled query"));
    assert!(logs_contain("body.filter.rich_text should be defined"));
}

#[tokio::test]
async fn execute_page_reports_paging_state() {
    let mock = MockNotion::new()
        .with_results(vec![page("t1", json!({}))])
        .with_next_cursor("next-1");
    let (_, query) = task_query(mock);

    let page = query.limit(1).execute_page().await.unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.next_cursor.as_deref(), Some("next-1"));
    assert!(page.has_more);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Task {
    id: String,
    name: String,
    done: bool,
    #[serde(rename = "Created At")]
    created_at: Option<String>,
}

#[tokio::test]
async fn execute_as_deserializes_into_caller_types() {
    let mock = MockNotion::new().with_results(vec![page(
        "t1",
        json!({
            "name": title("Write docs"),
            "done": checkbox(true),
            "Created At": { "type": "date", "date": null }
        }),
    )]);
    let (_, query) = task_query(mock);

    let tasks: Vec<Task> = query.execute_as().await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t1");
    assert_eq!(tasks[0].name, "Write docs");
    assert!(tasks[0].done);
    assert_eq!(tasks[0].created_at, None);
}

#[test]
fn ad_hoc_builders_infer_types_from_names() {
    let query = QueryBuilder::new(Arc::new(MockNotion::new()), "db9", "Ad hoc")
        .with_properties(HashMap::from([("due".to_string(), "Due Date".to_string())]))
        .filter("due", "equals", "2024-01-01")
        .filter("Status", "equals", "Doing")
        .filter("isArchived", "equals", false);

    assert_eq!(
        query.compile()["filter"]["and"],
        json!([
            { "property": "Due Date", "date": { "equals": "2024-01-01" } },
            { "property": "Status", "select": { "equals": "Doing" } },
            { "property": "isArchived", "checkbox": { "equals": false } }
        ])
    );
}

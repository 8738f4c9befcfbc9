//! Search-focused integration tests: operator coverage, sorting,
//! pagination edge cases, and streaming, end to end through the
//! repository and the in-memory store.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Map, Value, json};

use tickethub_model::schema;
use tickethub_persistence::error::ErrorClass;
use tickethub_persistence::query::QueryParams;
use tickethub_persistence::repository::Repository;
use tickethub_persistence::store::MemoryStore;
use tickethub_persistence::tenant::TenantId;

fn body(value: Value) -> Map<String, Value> {
    value.as_object().expect("object literal").clone()
}

fn query(q: &str) -> QueryParams {
    QueryParams::parse(q)
}

async fn seeded() -> (Repository<MemoryStore>, TenantId) {
    let repo = Repository::new(Arc::new(MemoryStore::new()), &schema::TROUBLE_TICKET);
    let tenant = TenantId::new("search");

    for ticket in [
        json!({"name": "Printer jam", "severity": "Minor", "weight": 1,
               "labels": ["hardware"]}),
        json!({"name": "Network outage", "severity": "Critical", "weight": 5,
               "labels": [], "escalated": true}),
        json!({"name": "password reset", "severity": "Minor", "weight": 2}),
    ] {
        repo.create(&tenant, body(ticket)).await.unwrap();
    }

    (repo, tenant)
}

#[tokio::test]
async fn equality_with_and_without_suffix() {
    let (repo, tenant) = seeded().await;

    let bare = repo.list(&tenant, &query("severity=Minor")).await.unwrap();
    let explicit = repo
        .list(&tenant, &query("severity%5B%3D%3D%5D=Minor"))
        .await
        .unwrap();

    assert_eq!(bare.total_count, 2);
    assert_eq!(explicit.total_count, 2);
}

#[tokio::test]
async fn not_equal_and_ranges() {
    let (repo, tenant) = seeded().await;

    let page = repo.list(&tenant, &query("severity%5Bne%5D=Minor")).await.unwrap();
    assert_eq!(page.total_count, 1);

    let page = repo.list(&tenant, &query("weight%5B%3E%5D=1")).await.unwrap();
    assert_eq!(page.total_count, 2);

    let page = repo
        .list(&tenant, &query("weight%5Bgte%5D=1&weight%5Blte%5D=2"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn regex_and_negation() {
    let (repo, tenant) = seeded().await;

    // Case-insensitive by contract: ^p matches "Printer jam" and
    // "password reset".
    let page = repo.list(&tenant, &query("name%5B%3D~%5D=%5Ep")).await.unwrap();
    assert_eq!(page.total_count, 2);

    let page = repo.list(&tenant, &query("name%5B%21~%5D=%5Ep")).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0]["name"], json!("Network outage"));
}

#[tokio::test]
async fn membership_operators() {
    let (repo, tenant) = seeded().await;

    let page = repo
        .list(&tenant, &query("severity%5Bin%5D=Critical,Major"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);

    let page = repo
        .list(&tenant, &query("severity%5Bnin%5D=Critical,Major"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn nature_operators() {
    let (repo, tenant) = seeded().await;

    let page = repo
        .list(&tenant, &query("escalated%5Bis%5D=exists"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);

    let page = repo
        .list(&tenant, &query("labels%5Bis%5D=empty"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);

    let page = repo
        .list(&tenant, &query("labels%5Bis%5D=array"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let err = repo
        .list(&tenant, &query("labels%5Bis%5D=wobbly"))
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);
    assert!(err.to_string().contains("wobbly"));
}

#[tokio::test]
async fn sort_precedence_and_directions() {
    let (repo, tenant) = seeded().await;

    let page = repo
        .list(&tenant, &query("sort=severity,-weight"))
        .await
        .unwrap();
    let names: Vec<_> = page
        .items
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    // Critical before Minor; within Minor, heaviest first.
    assert_eq!(
        names,
        vec!["Network outage", "password reset", "Printer jam"]
    );
}

#[tokio::test]
async fn date_range_on_creation_timestamp() {
    let (repo, tenant) = seeded().await;

    let page = repo
        .list(&tenant, &query("creationDate%5B%3E%5D=2000-01-01"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);

    let page = repo
        .list(&tenant, &query("creationDate%5B%3C%5D=2000-01-01"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn limit_and_offset_validation() {
    let (repo, tenant) = seeded().await;

    let err = repo.list(&tenant, &query("limit=101")).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);

    let err = repo.list(&tenant, &query("limit=ten")).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Client);

    let page = repo.list(&tenant, &query("limit=100")).await.unwrap();
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn offset_beyond_end_is_empty_but_counted() {
    let (repo, tenant) = seeded().await;

    let page = repo.list(&tenant, &query("offset=50")).await.unwrap();
    assert_eq!(page.result_count(), 0);
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn projection_applies_to_stream_and_list() {
    let (repo, tenant) = seeded().await;

    let page = repo
        .list(&tenant, &query("fields=name,severity"))
        .await
        .unwrap();
    for item in &page.items {
        assert_eq!(item.len(), 2);
        assert!(item.contains_key("name"));
        assert!(item.contains_key("severity"));
    }

    let stream = repo
        .stream(&tenant, &query("fields=name"))
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 3);
    for item in items {
        let item = item.unwrap();
        assert_eq!(item.len(), 1);
        assert!(item.contains_key("name"));
    }
}

#[tokio::test]
async fn stream_is_sorted_and_filtered() {
    let (repo, tenant) = seeded().await;

    let stream = repo
        .stream(&tenant, &query("severity=Minor&sort=-weight"))
        .await
        .unwrap();
    let items: Vec<_> = stream.map(Result::unwrap).collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], json!("password reset"));
    assert_eq!(items[1]["name"], json!("Printer jam"));
}

#[tokio::test]
async fn stream_consumer_can_disconnect_early() {
    let (repo, tenant) = seeded().await;

    let mut stream = repo.stream(&tenant, &query("")).await.unwrap();
    assert!(stream.next().await.is_some());
    drop(stream);

    // A fresh request starts a fresh query.
    let again = repo.stream(&tenant, &query("")).await.unwrap();
    assert_eq!(again.count().await, 3);
}

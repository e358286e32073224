use super::*;
use crate::types::ImportanceTier;

#[tokio::test]
async fn add_memories_assigns_sequential_ids() {
    let store = InMemoryMemoryStore::new();
    let items = vec![
        MemoryInput::new("summary one", vec!["rust".to_string()], ImportanceTier::High),
        MemoryInput::new("summary two", vec![], ImportanceTier::Low),
    ];
    let ids = store.add_memories(items, 7, "proj-a").await.expect("add");
    assert_eq!(ids, vec!["mem_7_0".to_string(), "mem_7_1".to_string()]);
}

#[tokio::test]
async fn add_memories_continues_index_across_calls() {
    let store = InMemoryMemoryStore::new();
    store
        .add_memories(
            vec![MemoryInput::new("first", vec![], ImportanceTier::Medium)],
            3,
            "proj-a",
        )
        .await
        .expect("add");
    let ids = store
        .add_memories(
            vec![MemoryInput::new("second", vec![], ImportanceTier::Medium)],
            3,
            "proj-a",
        )
        .await
        .expect("add");
    assert_eq!(ids, vec!["mem_3_1".to_string()]);
}

#[tokio::test]
async fn query_restricts_to_matching_project() {
    let store = InMemoryMemoryStore::new();
    store
        .add_memories(
            vec![MemoryInput::new(
                "refactored the parser",
                vec![],
                ImportanceTier::Medium,
            )],
            1,
            "proj-a",
        )
        .await
        .expect("add");
    store
        .add_memories(
            vec![MemoryInput::new(
                "refactored the parser",
                vec![],
                ImportanceTier::Medium,
            )],
            1,
            "proj-b",
        )
        .await
        .expect("add");

    let hits = store
        .query("parser", 10, Some("proj-a"))
        .await
        .expect("query");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.project, "proj-a");
}

#[tokio::test]
async fn query_orders_by_ascending_distance() {
    let store = InMemoryMemoryStore::new();
    store
        .add_memories(
            vec![
                MemoryInput::new("completely unrelated text", vec![], ImportanceTier::Low),
                MemoryInput::new("fixed the buffer cache bug", vec![], ImportanceTier::Low),
            ],
            1,
            "proj-a",
        )
        .await
        .expect("add");

    let hits = store
        .query("buffer cache bug", 10, None)
        .await
        .expect("query");
    assert_eq!(hits[0].content, "fixed the buffer cache bug");
    assert!(hits[0].distance <= hits[1].distance);
}

#[tokio::test]
async fn noop_store_assigns_ids_but_returns_no_hits() {
    let store = NoopMemoryStore::new();
    let ids = store
        .add_memories(
            vec![MemoryInput::new("anything", vec![], ImportanceTier::Low)],
            5,
            "proj-a",
        )
        .await
        .expect("add");
    assert_eq!(ids, vec!["mem_5_0".to_string()]);

    let hits = store.query("anything", 10, None).await.expect("query");
    assert!(hits.is_empty());
}

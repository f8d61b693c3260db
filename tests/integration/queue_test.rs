// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::create_test_db;
use modscout::domain::models::task::EnqueueOutcome;
use modscout::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use modscout::queue::work_queue::{SqliteWorkQueue, WorkQueue};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn test_enqueue_is_idempotent_per_url() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    let first = queue
        .enqueue("https://github.com/minetest-mods/mesecons", "seed:test", 0, None)
        .await
        .unwrap();
    let second = queue
        .enqueue("https://github.com/minetest-mods/mesecons", "forum:123", 5, None)
        .await
        .unwrap();
    // Same repository spelled with trailing .git is the same queue entry
    let third = queue
        .enqueue(
            "https://github.com/minetest-mods/mesecons.git",
            "seed:test",
            0,
            None,
        )
        .await
        .unwrap();

    assert_eq!(first, EnqueueOutcome::Inserted);
    assert_eq!(second, EnqueueOutcome::AlreadyPresent);
    assert_eq!(third, EnqueueOutcome::AlreadyPresent);
    assert_eq!(queue.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_claim_order_is_priority_then_age() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    queue
        .enqueue("https://example.org/a/first", "seed:test", 1, None)
        .await
        .unwrap();
    queue
        .enqueue("https://example.org/a/second", "seed:test", 5, None)
        .await
        .unwrap();
    queue
        .enqueue("https://example.org/a/third", "seed:test", 1, None)
        .await
        .unwrap();

    let tasks = queue.claim_batch(10).await.unwrap();
    let urls: Vec<&str> = tasks.iter().map(|t| t.url.as_str()).collect();

    // Highest priority first, then insertion order within equal priority
    assert_eq!(
        urls,
        vec![
            "https://example.org/a/second",
            "https://example.org/a/first",
            "https://example.org/a/third",
        ]
    );
}

#[tokio::test]
async fn test_claimed_tasks_are_not_claimed_twice() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    for i in 0..4 {
        queue
            .enqueue(&format!("https://example.org/o/repo{}", i), "seed:test", 0, None)
            .await
            .unwrap();
    }

    let first = queue.claim_batch(2).await.unwrap();
    let second = queue.claim_batch(10).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    let first_ids: HashSet<i64> = first.iter().map(|t| t.id).collect();
    assert!(second.iter().all(|t| !first_ids.contains(&t.id)));
}

#[tokio::test]
async fn test_concurrent_claimers_never_share_a_task() {
    let db = create_test_db().await;
    let queue = Arc::new(SqliteWorkQueue::new(db.task_repo.clone()));

    for i in 0..20 {
        queue
            .enqueue(&format!("https://example.org/o/repo{}", i), "seed:test", 0, None)
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            queue.claim_batch(5).await.unwrap()
        }));
    }

    let mut seen = HashSet::new();
    let mut total = 0;
    for handle in handles {
        for task in handle.await.unwrap() {
            assert!(seen.insert(task.id), "task {} claimed twice", task.id);
            total += 1;
        }
    }
    assert_eq!(total, 20);
}

#[tokio::test]
async fn test_mark_processed_is_idempotent_and_final() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    queue
        .enqueue("https://example.org/o/repo", "seed:test", 0, None)
        .await
        .unwrap();
    let task = queue.claim_batch(1).await.unwrap().remove(0);

    queue.mark_processed(task.id, None).await.unwrap();
    queue
        .mark_processed(task.id, Some("late duplicate"))
        .await
        .unwrap();

    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert_eq!(queue.processed_count().await.unwrap(), 1);
    assert!(queue.claim_batch(10).await.unwrap().is_empty());

    // The first terminal state survives the late duplicate
    let error: Option<String> = sqlx::query_scalar("SELECT error FROM work_queue WHERE id = ?")
        .bind(task.id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(error, None);
}

#[tokio::test]
async fn test_mark_processed_unknown_task_is_not_found() {
    let db = create_test_db().await;
    let result = db.task_repo.mark_processed(9999, None).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_released_task_becomes_claimable_again() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    queue
        .enqueue("https://example.org/o/repo", "seed:test", 0, None)
        .await
        .unwrap();
    let task = queue.claim_batch(1).await.unwrap().remove(0);
    assert!(queue.claim_batch(1).await.unwrap().is_empty());

    queue.release(task.id).await.unwrap();
    let reclaimed = queue.claim_batch(1).await.unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].id, task.id);
}

#[tokio::test]
async fn test_reset_claims_recovers_stale_claims() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    queue
        .enqueue("https://example.org/o/one", "seed:test", 0, None)
        .await
        .unwrap();
    queue
        .enqueue("https://example.org/o/two", "seed:test", 0, None)
        .await
        .unwrap();
    let claimed = queue.claim_batch(2).await.unwrap();
    queue.mark_processed(claimed[0].id, None).await.unwrap();

    // Simulates a restart after a crash mid-batch
    let recovered = db.task_repo.reset_claims().await.unwrap();
    assert_eq!(recovered, 1);
    assert_eq!(queue.claim_batch(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_metadata_round_trips_through_the_queue() {
    let db = create_test_db().await;
    let queue = SqliteWorkQueue::new(db.task_repo.clone());

    let metadata = serde_json::json!({"branch": "stable-5", "thread": 12345});
    queue
        .enqueue(
            "https://example.org/o/repo",
            "forum:12345",
            0,
            Some(&metadata),
        )
        .await
        .unwrap();

    let task = queue.claim_batch(1).await.unwrap().remove(0);
    assert_eq!(task.source, "forum:12345");
    assert_eq!(task.metadata, Some(metadata));
}

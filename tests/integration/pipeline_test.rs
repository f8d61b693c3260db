// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{create_test_db, create_test_http, TestDb};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use modscout::domain::repositories::non_match_repository::NonMatchRepository;
use modscout::hosting::http::ProviderHttp;
use modscout::hosting::probe_cache::HostProbeCache;
use modscout::hosting::resolver::HostResolver;
use modscout::infrastructure::repositories::host_cache_repo_impl::HostCacheRepositoryImpl;
use modscout::infrastructure::repositories::non_match_repo_impl::NonMatchRepositoryImpl;
use modscout::infrastructure::repositories::record_repo_impl::RecordRepositoryImpl;
use modscout::queue::work_queue::{SqliteWorkQueue, WorkQueue};
use modscout::utils::retry_policy::RetryPolicy;
use modscout::workers::crawl_worker::{BatchReport, CrawlWorker};
use sqlx::Row;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestPipeline {
    db: TestDb,
    worker: CrawlWorker<SqliteWorkQueue<modscout::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl>>,
    queue: Arc<SqliteWorkQueue<modscout::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl>>,
    non_matches: Arc<NonMatchRepositoryImpl>,
}

async fn create_pipeline() -> TestPipeline {
    let db = create_test_db().await;
    let http: Arc<ProviderHttp> = create_test_http();
    let queue = Arc::new(SqliteWorkQueue::new(db.task_repo.clone()));
    let host_cache = Arc::new(HostProbeCache::new(Arc::new(HostCacheRepositoryImpl::new(
        db.pool.clone(),
    ))));
    let resolver = Arc::new(HostResolver::new(http.clone(), host_cache));
    let non_matches = Arc::new(NonMatchRepositoryImpl::new(db.pool.clone()));
    let records = Arc::new(RecordRepositoryImpl::new(db.pool.clone()));

    let worker = CrawlWorker::new(
        queue.clone(),
        resolver,
        http,
        non_matches.clone(),
        records,
        RetryPolicy::bounded(1),
        10,
        0,
    );
    TestPipeline {
        db,
        worker,
        queue,
        non_matches,
    }
}

/// 在mock服务器上布置一个自托管Gitea实例的指纹
async fn mount_gitea_fingerprint(server: &MockServer) {
    // The GitLab probe must miss before the homepage probe runs;
    // unmatched paths already answer 404, so only the homepage needs a mock
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><footer>Powered by Gitea</footer></html>"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_gitea_mod_repo_is_classified_and_recorded() {
    let server = MockServer::start().await;
    mount_gitea_fingerprint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/wuzzy/xdecor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"default_branch": "libre"})),
        )
        .mount(&server)
        .await;

    let conf = "name = xdecor\ntitle = X-Decor-libre\nauthor = Wuzzy\ndepends = default";
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/wuzzy/xdecor/contents/mod.conf"))
        .and(query_param("ref", "libre"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "encoding": "base64",
            "content": STANDARD.encode(conf),
        })))
        .mount(&server)
        .await;

    let pipeline = create_pipeline().await;
    let url = format!("{}/wuzzy/xdecor", server.uri());
    pipeline
        .queue
        .enqueue(&url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            classified: 1,
            ..BatchReport::default()
        }
    );

    let row = sqlx::query("SELECT name, title, author, package_type, depends FROM results WHERE url = ?")
        .bind(&url)
        .fetch_one(&pipeline.db.pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("name"), "xdecor");
    assert_eq!(row.get::<String, _>("title"), "X-Decor-libre");
    assert_eq!(row.get::<Option<String>, _>("author").as_deref(), Some("Wuzzy"));
    assert_eq!(row.get::<String, _>("package_type"), "mod");
    assert_eq!(row.get::<String, _>("depends"), r#"["default"]"#);

    assert_eq!(pipeline.queue.pending_count().await.unwrap(), 0);
    assert_eq!(pipeline.queue.processed_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_repo_without_manifest_is_recorded_as_non_match() {
    // No fingerprints at all: the host degrades to generic-git and
    // every raw path candidate answers 404
    let server = MockServer::start().await;

    let pipeline = create_pipeline().await;
    let url = format!("{}/someone/dotfiles", server.uri());
    pipeline
        .queue
        .enqueue(&url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            unmatched: 1,
            ..BatchReport::default()
        }
    );
    assert!(pipeline.non_matches.contains(&url).await.unwrap());

    let error: Option<String> = sqlx::query_scalar("SELECT error FROM work_queue WHERE url = ?")
        .bind(&url)
        .fetch_one(&pipeline.db.pool)
        .await
        .unwrap();
    assert_eq!(error.as_deref(), Some("no recognized package manifest"));
}

#[tokio::test]
async fn test_known_non_match_is_settled_without_fetching() {
    // No mocks mounted: any request would fail the test through a
    // transport error surfacing in the report
    let pipeline = create_pipeline().await;
    let url = "https://github.com/someone/dotfiles";

    pipeline.non_matches.insert(url, "checked last run").await.unwrap();
    pipeline
        .queue
        .enqueue(url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            unmatched: 1,
            ..BatchReport::default()
        }
    );
    assert_eq!(pipeline.queue.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rate_limited_task_is_released_back_to_pending() {
    let server = MockServer::start().await;
    mount_gitea_fingerprint(&server).await;

    // Quota exhausted on the API surface
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/wuzzy/xdecor"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let pipeline = create_pipeline().await;
    let url = format!("{}/wuzzy/xdecor", server.uri());
    pipeline
        .queue
        .enqueue(&url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            released: 1,
            ..BatchReport::default()
        }
    );

    // The task survives for the next run instead of being burned
    assert_eq!(pipeline.queue.pending_count().await.unwrap(), 1);
    let reclaimed = pipeline.queue.claim_batch(1).await.unwrap();
    assert_eq!(reclaimed[0].url, url);
}

#[tokio::test]
async fn test_run_exits_when_only_paused_provider_tasks_remain() {
    let server = MockServer::start().await;
    mount_gitea_fingerprint(&server).await;

    // Quota stays exhausted for the whole run
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/wuzzy/xdecor"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let pipeline = create_pipeline().await;
    let url = format!("{}/wuzzy/xdecor", server.uri());
    pipeline
        .queue
        .enqueue(&url, "seed:test", 0, None)
        .await
        .unwrap();

    // Without a stop condition the released task would be re-claimed
    // and re-released forever; run() must come back on its own
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        pipeline.worker.run(shutdown_rx),
    )
    .await
    .expect("worker must exit when every pending task sits behind a paused provider");

    assert_eq!(pipeline.queue.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unrecognized_url_fails_without_non_match_record() {
    let pipeline = create_pipeline().await;
    let url = "https://example.org/not-a-repo-shape/a/b/c";
    pipeline
        .queue
        .enqueue(url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            failed: 1,
            ..BatchReport::default()
        }
    );
    // Unresolvable is not the same as confirmed-not-a-package
    assert!(!pipeline.non_matches.contains(url).await.unwrap());
}

#[tokio::test]
async fn test_unsupported_host_is_marked_without_adapter() {
    let pipeline = create_pipeline().await;
    let url = "https://bitbucket.org/someone/somerepo";
    pipeline
        .queue
        .enqueue(url, "seed:test", 0, None)
        .await
        .unwrap();

    let report = pipeline.worker.process_batch().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            claimed: 1,
            unmatched: 1,
            ..BatchReport::default()
        }
    );

    let error: Option<String> = sqlx::query_scalar("SELECT error FROM work_queue WHERE url = ?")
        .bind(url)
        .fetch_one(&pipeline.db.pool)
        .await
        .unwrap();
    assert_eq!(error.as_deref(), Some("unsupported host type: bitbucket"));
}

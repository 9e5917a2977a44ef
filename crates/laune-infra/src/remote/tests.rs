use std::sync::Arc;

use laune_core::domain::{EXPIRY_WINDOW_MS, Mood, NewPost, Post, PostId, filter_visible};
use laune_core::ports::{Clock, KeyValueStore, ManualClock, SharedDocumentStore};
use laune_core::{DomainError, ErrorKind};
use laune_shared::SharedDocument;

use super::{InMemoryDocumentStore, RemoteStoreAdapter, SyncMode};
use crate::kv::InMemoryKeyValueStore;
use crate::local_cache::{LOCAL_CACHE_KEY, LocalPostCache};

const NOW: i64 = 1_700_000_000_000;
const HOUR: i64 = 60 * 60 * 1000;

struct Harness {
    clock: Arc<ManualClock>,
    kv: Arc<InMemoryKeyValueStore>,
    local: LocalPostCache,
}

impl Harness {
    fn new() -> Self {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        Self {
            clock: Arc::new(ManualClock::new(NOW)),
            local: LocalPostCache::new(kv.clone()),
            kv,
        }
    }

    fn adapter(&self, remote: Option<Arc<InMemoryDocumentStore>>) -> RemoteStoreAdapter {
        let remote = remote.map(|r| r as Arc<dyn SharedDocumentStore>);
        RemoteStoreAdapter::new(remote, self.local.clone(), self.clock.clone())
    }
}

fn post(id: &str, created_at: i64) -> Post {
    Post::new(
        PostId::from(id),
        NewPost::new(35.68, 139.76, Mood::Happy, "nozomi", "hello"),
        created_at,
    )
}

fn document(posts: Vec<Post>) -> String {
    SharedDocument::new(posts).encode_pretty().unwrap()
}

async fn remote_posts(store: &InMemoryDocumentStore) -> Vec<Post> {
    let text = store.content().await.expect("document written");
    SharedDocument::decode(&text).unwrap().posts
}

fn new_post(comment: &str) -> NewPost {
    NewPost::new(1.0, 2.0, Mood::Smile, "kai", comment)
}

#[tokio::test]
async fn test_local_only_fetch_returns_filtered_local_cache() {
    let h = Harness::new();
    h.local
        .save(&[post("old", NOW - 25 * HOUR), post("fresh", NOW - HOUR)])
        .await;

    let adapter = h.adapter(None);
    assert_eq!(adapter.mode(), SyncMode::LocalOnly);

    let fetched = adapter.fetch().await;
    assert!(fetched.is_clean());
    assert_eq!(fetched.value, vec![post("fresh", NOW - HOUR)]);
}

#[cfg(feature = "gist")]
#[tokio::test]
async fn test_config_without_gist_id_is_local_only() {
    let h = Harness::new();
    let config = crate::gist::GistConfig {
        token: Some("t".into()),
        // Unroutable: any request would fail the test with a degradation
        api_url: "http://127.0.0.1:9/gists".into(),
        ..Default::default()
    };

    let adapter = RemoteStoreAdapter::from_config(&config, h.local.clone(), h.clock.clone());
    assert_eq!(adapter.mode(), SyncMode::LocalOnly);

    assert!(adapter.save(vec![post("a", NOW)]).await.is_clean());
    let fetched = adapter.fetch().await;
    assert!(fetched.is_clean());
    assert_eq!(fetched.value, vec![post("a", NOW)]);
}

#[tokio::test]
async fn test_fetch_reads_remote_document() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![
        post("a", NOW - 2 * HOUR),
        post("b", NOW - HOUR),
    ])));
    h.local.save(&[post("stale-local", NOW)]).await;

    let fetched = h.adapter(Some(remote.clone())).fetch().await;
    assert!(fetched.is_clean());
    assert_eq!(
        fetched.value,
        vec![post("a", NOW - 2 * HOUR), post("b", NOW - HOUR)]
    );
    assert_eq!(remote.writes(), 0);
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_local_cache() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::new());
    remote.fail_reads(true);
    h.local.save(&[post("mine", NOW - HOUR)]).await;

    let adapter = h.adapter(Some(remote.clone()));
    let fetched = adapter.fetch().await;

    assert_eq!(fetched.value, vec![post("mine", NOW - HOUR)]);
    assert_eq!(fetched.degraded.unwrap().kind, ErrorKind::FetchFailed);
}

#[tokio::test]
async fn test_add_post_after_failed_read_keeps_shared_document() {
    let h = Harness::new();
    let others = vec![post("other-1", NOW - HOUR), post("other-2", NOW - HOUR)];
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(others.clone())));
    remote.fail_reads(true);
    h.local.save(&[post("mine", NOW - HOUR)]).await;

    let added = h
        .adapter(Some(remote.clone()))
        .add_post(new_post("offline"))
        .await
        .unwrap();

    assert_eq!(added.degraded.unwrap().kind, ErrorKind::FetchFailed);
    assert_eq!(remote.writes(), 0);
    assert_eq!(remote_posts(&remote).await, others);
    assert_eq!(
        h.local.load().await,
        vec![post("mine", NOW - HOUR), added.value]
    );
}

#[tokio::test]
async fn test_add_post_keeps_valid_entries_next_to_bad_ones() {
    let h = Harness::new();
    let valid = post("valid", NOW - HOUR);
    let text = format!(
        r#"{{"posts": [{}, {{"id":"x","lat":0,"lng":0,"mood":"angry","nickname":"n","comment":"c","timestamp":{NOW}}}]}}"#,
        serde_json::to_string(&valid).unwrap()
    );
    let remote = Arc::new(InMemoryDocumentStore::with_content(text));

    let added = h
        .adapter(Some(remote.clone()))
        .add_post(new_post("hi"))
        .await
        .unwrap();

    assert!(added.is_clean());
    assert_eq!(remote_posts(&remote).await, vec![valid, added.value]);
}

#[tokio::test]
async fn test_unparsable_document_falls_back_to_local_cache() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content("<html>rate limited</html>"));
    h.local.save(&[post("mine", NOW)]).await;

    let fetched = h.adapter(Some(remote)).fetch().await;
    assert_eq!(fetched.value, vec![post("mine", NOW)]);
    assert_eq!(fetched.degraded.unwrap().kind, ErrorKind::FetchFailed);
}

#[tokio::test]
async fn test_document_without_posts_field_is_empty() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(r#"{"version": 1}"#));
    h.local.save(&[post("mine", NOW)]).await;

    let fetched = h.adapter(Some(remote)).fetch().await;
    assert!(fetched.is_clean());
    assert!(fetched.value.is_empty());
}

#[tokio::test]
async fn test_missing_document_reads_local_cache_without_error() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::new());
    h.local.save(&[post("mine", NOW)]).await;

    let fetched = h.adapter(Some(remote)).fetch().await;
    assert!(fetched.is_clean());
    assert_eq!(fetched.value, vec![post("mine", NOW)]);
}

#[tokio::test]
async fn test_fetch_persists_pruning_in_background() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![
        post("expired", NOW - 30 * HOUR),
        post("fresh", NOW - HOUR),
    ])));

    let fetched = h.adapter(Some(remote.clone())).fetch().await;
    assert_eq!(fetched.value, vec![post("fresh", NOW - HOUR)]);

    for _ in 0..100 {
        if remote.writes() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(remote.writes(), 1);
    assert_eq!(remote_posts(&remote).await, vec![post("fresh", NOW - HOUR)]);
}

#[tokio::test]
async fn test_save_filters_and_writes_both_stores() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::new());
    let adapter = h.adapter(Some(remote.clone()));
    assert_eq!(adapter.mode(), SyncMode::ReadWrite);

    let posts = vec![
        post("a", NOW - 2 * HOUR),
        post("expired", NOW - EXPIRY_WINDOW_MS),
        post("b", NOW),
    ];
    assert!(adapter.save(posts.clone()).await.is_clean());

    let expected = filter_visible(posts, h.clock.now_millis());
    assert_eq!(remote_posts(&remote).await, expected);
    assert_eq!(h.local.load().await, expected);
}

#[tokio::test]
async fn test_remote_write_failure_still_updates_local_cache() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::new());
    remote.fail_writes(true);

    let saved = h.adapter(Some(remote.clone())).save(vec![post("a", NOW)]).await;

    assert_eq!(saved.degraded.unwrap().kind, ErrorKind::SaveFailed);
    assert_eq!(remote.content().await, None);
    assert_eq!(h.local.load().await, vec![post("a", NOW)]);
}

#[tokio::test]
async fn test_read_only_mode_never_writes_remote() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![])).read_only());
    let adapter = h.adapter(Some(remote.clone()));
    assert_eq!(adapter.mode(), SyncMode::ReadOnly);

    assert!(adapter.save(vec![post("a", NOW)]).await.is_clean());
    assert_eq!(remote.writes(), 0);
    assert_eq!(h.local.load().await, vec![post("a", NOW)]);
}

#[tokio::test]
async fn test_round_trip_through_local_cache_equals_filtered_input() {
    let h = Harness::new();
    let adapter = h.adapter(None);
    let posts = vec![
        post("1", NOW - 23 * HOUR),
        post("2", NOW - 24 * HOUR - 1),
        post("3", NOW + HOUR),
    ];

    adapter.save(posts.clone()).await;
    assert_eq!(h.local.load().await, filter_visible(posts, NOW));
}

#[tokio::test]
async fn test_add_post_appends_to_remote_document() {
    let h = Harness::new();
    let existing = post("existing", NOW - HOUR);
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![
        existing.clone(),
    ])));
    let adapter = h.adapter(Some(remote.clone()));

    let added = adapter.add_post(new_post("  first  ")).await.unwrap();
    assert!(added.is_clean());
    let added = added.value;
    assert_eq!(added.created_at, NOW);
    assert_eq!(added.comment, "first");
    assert_eq!(added.id.as_str(), NOW.to_string());

    assert_eq!(remote_posts(&remote).await, vec![existing, added.clone()]);
    assert_eq!(h.local.load().await.last(), Some(&added));
}

#[tokio::test]
async fn test_add_post_ids_are_unique_and_increasing() {
    let h = Harness::new();
    let adapter = h.adapter(None);

    let mut previous = i64::MIN;
    for i in 0..5 {
        // Clock stands still for the first three posts
        if i >= 3 {
            h.clock.advance(1);
        }
        let post = adapter.add_post(new_post("x")).await.unwrap().value;
        let id: i64 = post.id.as_str().parse().unwrap();
        assert!(id > previous);
        previous = id;
    }
    assert_eq!(h.local.load().await.len(), 5);
}

#[tokio::test]
async fn test_add_post_rejects_blank_nickname() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::new());
    let adapter = h.adapter(Some(remote.clone()));

    let result = adapter
        .add_post(NewPost::new(0.0, 0.0, Mood::Sad, " ", "c"))
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(remote.reads(), 0);
}

#[tokio::test]
async fn test_add_post_reports_failed_remote_save() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![])));
    remote.fail_writes(true);

    let added = h
        .adapter(Some(remote))
        .add_post(new_post("x"))
        .await
        .unwrap();
    assert_eq!(added.degraded.unwrap().kind, ErrorKind::SaveFailed);
}

#[tokio::test]
async fn test_concurrent_add_posts_lose_an_update() {
    let h = Harness::new();
    let existing = post("existing", NOW - HOUR);
    let remote = Arc::new(
        InMemoryDocumentStore::with_content(document(vec![existing.clone()])).with_read_barrier(2),
    );
    let adapter = h.adapter(Some(remote.clone()));

    // Both calls read the same pre-add snapshot before either saves
    let (first, second) = tokio::join!(
        adapter.add_post(new_post("first")),
        adapter.add_post(new_post("second")),
    );
    let first = first.unwrap().value;
    let second = second.unwrap().value;

    let stored = remote_posts(&remote).await;
    assert_eq!(remote.writes(), 2);
    assert_eq!(stored.len(), 2, "the two appends were not merged");
    assert_eq!(stored[0], existing);

    let survivor = &stored[1];
    assert!(*survivor == first || *survivor == second);
    let lost = if *survivor == first { &second } else { &first };
    assert!(!stored.contains(lost));
}

#[tokio::test]
async fn test_sequential_saves_from_same_snapshot_keep_last_list() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![])));
    let adapter = h.adapter(Some(remote.clone()));

    let snapshot = adapter.fetch().await.value;
    let mut from_a = snapshot.clone();
    from_a.push(post("a", NOW));
    let mut from_b = snapshot;
    from_b.push(post("b", NOW));

    adapter.save(from_a).await;
    adapter.save(from_b.clone()).await;
    assert_eq!(remote_posts(&remote).await, from_b);
}

#[tokio::test]
async fn test_cleanup_prunes_remote_document() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![
        post("fresh", NOW - 23 * HOUR),
        post("old", NOW - 26 * HOUR),
    ])));
    let adapter = h.adapter(Some(remote.clone()));

    let cleaned = adapter.cleanup().await;
    assert_eq!(cleaned.value, 1);
    assert_eq!(remote_posts(&remote).await, vec![post("fresh", NOW - 23 * HOUR)]);

    let again = adapter.cleanup().await;
    assert_eq!(again.value, 0);
    assert_eq!(remote.writes(), 1);
}

#[tokio::test]
async fn test_cleanup_after_failed_read_leaves_remote_alone() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![post(
        "remote-only",
        NOW,
    )])));
    remote.fail_reads(true);
    h.local
        .save(&[post("old", NOW - 30 * HOUR), post("mine", NOW)])
        .await;

    let cleaned = h.adapter(Some(remote.clone())).cleanup().await;
    assert_eq!(cleaned.value, 1);
    assert_eq!(cleaned.degraded.unwrap().kind, ErrorKind::FetchFailed);
    assert_eq!(remote.writes(), 0);
    assert_eq!(h.local.load().await, vec![post("mine", NOW)]);
}

#[tokio::test]
async fn test_clear_local_keeps_remote() {
    let h = Harness::new();
    let remote = Arc::new(InMemoryDocumentStore::with_content(document(vec![post("a", NOW)])));
    let adapter = h.adapter(Some(remote.clone()));
    h.local.save(&[post("a", NOW)]).await;

    adapter.clear_local().await;
    assert_eq!(h.kv.get(LOCAL_CACHE_KEY).await.unwrap(), None);
    assert_eq!(remote_posts(&remote).await, vec![post("a", NOW)]);
}

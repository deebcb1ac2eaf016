//! End-to-end dispatcher scenarios against the in-memory store, with a
//! counting fake in place of the remote API client.

use canopy_cache::{
    CacheDispatcher, CacheProfile, CacheStore, EntityKey, MemoryStore, Operation,
    RequestFingerprint, RequestParams,
};
use canopy_core::{CanopyError, CanopyResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts how often the "remote API" is actually hit.
#[derive(Default)]
struct FakeRemote {
    fetches: AtomicUsize,
    mutations: AtomicUsize,
}

impl FakeRemote {
    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

/// Store whose index reads always fail, to exercise the invalidation
/// safety path.
struct BrokenIndexStore {
    inner: MemoryStore,
}

#[async_trait]
impl CacheStore for BrokenIndexStore {
    async fn get(&self, key: &str) -> CanopyResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CanopyResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn del(&self, keys: &[String]) -> CanopyResult<u64> {
        self.inner.del(keys).await
    }

    async fn smembers(&self, _key: &str) -> CanopyResult<Vec<String>> {
        Err(CanopyError::store("connection reset by peer"))
    }

    async fn sadd(&self, key: &str, member: &str) -> CanopyResult<()> {
        self.inner.sadd(key, member).await
    }
}

fn profile() -> CacheProfile {
    CacheProfile::new("comment", Duration::from_secs(60)).unwrap()
}

fn dispatcher(store: Arc<MemoryStore>) -> CacheDispatcher<MemoryStore> {
    CacheDispatcher::for_user(store, "canopy", "u1", &profile()).unwrap()
}

async fn read(
    dispatcher: &CacheDispatcher<impl CacheStore>,
    remote: &FakeRemote,
    entity: &EntityKey,
    params: &RequestParams,
    value: &str,
) -> CanopyResult<String> {
    dispatcher
        .handle(Operation::Read, entity, params, || async {
            remote.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(value.to_string())
        })
        .await
}

async fn mutate(
    dispatcher: &CacheDispatcher<impl CacheStore>,
    remote: &FakeRemote,
    operation: Operation,
    entity: &EntityKey,
) -> CanopyResult<String> {
    dispatcher
        .handle(operation, entity, &RequestParams::new(json!({})), || async {
            remote.mutations.fetch_add(1, Ordering::SeqCst);
            Ok("mutated".to_string())
        })
        .await
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(Arc::clone(&store));
    let remote = FakeRemote::default();
    let entity = EntityKey::model("1");

    let params = RequestParams::new(json!({"a": 1, "b": 2}));
    let first = read(&dispatcher, &remote, &entity, &params, "payload")
        .await
        .unwrap();
    assert_eq!(first, "payload");

    // Same logical params, different insertion order.
    let reordered = RequestParams::new(json!({"b": 2, "a": 1}));
    let second = read(&dispatcher, &remote, &entity, &reordered, "other")
        .await
        .unwrap();

    assert_eq!(second, "payload");
    assert_eq!(remote.fetch_count(), 1);
}

#[tokio::test]
async fn update_busts_model_entry_and_forces_refetch() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(Arc::clone(&store));
    let remote = FakeRemote::default();
    let entity = EntityKey::model("1");
    let params = RequestParams::new(json!({"a": 1}));

    read(&dispatcher, &remote, &entity, &params, "v1")
        .await
        .unwrap();

    let fp = RequestFingerprint::of(&params);
    let entry_key = format!("canopy:u1-comment-model-1-{}", fp.as_str());
    assert!(store.get(&entry_key).await.unwrap().is_some());

    mutate(&dispatcher, &remote, Operation::Update, &entity)
        .await
        .unwrap();
    assert_eq!(remote.mutation_count(), 1);
    assert!(store.get(&entry_key).await.unwrap().is_none());

    let refetched = read(&dispatcher, &remote, &entity, &params, "v2")
        .await
        .unwrap();
    assert_eq!(refetched, "v2");
    assert_eq!(remote.fetch_count(), 2);
}

#[tokio::test]
async fn users_never_share_cache_entries() {
    let store = Arc::new(MemoryStore::new());
    let u1 = CacheDispatcher::for_user(Arc::clone(&store), "canopy", "u1", &profile()).unwrap();
    let u2 = CacheDispatcher::for_user(Arc::clone(&store), "canopy", "u2", &profile()).unwrap();
    let remote = FakeRemote::default();
    let entity = EntityKey::model("1");
    let params = RequestParams::new(json!({"a": 1}));

    let for_u1 = read(&u1, &remote, &entity, &params, "u1-data").await.unwrap();
    let for_u2 = read(&u2, &remote, &entity, &params, "u2-data").await.unwrap();

    assert_eq!(for_u1, "u1-data");
    assert_eq!(for_u2, "u2-data");
    assert_eq!(remote.fetch_count(), 2);
}

#[tokio::test]
async fn collection_pages_cache_separately_and_bust_together() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(Arc::clone(&store));
    let remote = FakeRemote::default();
    let collection = EntityKey::collection();

    let page1 = RequestParams::new(json!({"page": 1}));
    let page2 = RequestParams::new(json!({"page": 2}));

    read(&dispatcher, &remote, &collection, &page1, "page-1")
        .await
        .unwrap();
    read(&dispatcher, &remote, &collection, &page2, "page-2")
        .await
        .unwrap();
    assert_eq!(remote.fetch_count(), 2);
    assert_eq!(store.entry_count(), 2);

    // A write to any model of the class busts every cached page.
    mutate(&dispatcher, &remote, Operation::Update, &EntityKey::model("9"))
        .await
        .unwrap();
    assert_eq!(store.entry_count(), 0);

    read(&dispatcher, &remote, &collection, &page1, "page-1-new")
        .await
        .unwrap();
    assert_eq!(remote.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_treated_as_absent() {
    let store = Arc::new(MemoryStore::new());
    let profile = CacheProfile::new("comment", Duration::from_secs(1)).unwrap();
    let dispatcher =
        CacheDispatcher::for_user(Arc::clone(&store), "canopy", "u1", &profile).unwrap();
    let remote = FakeRemote::default();
    let entity = EntityKey::model("1");
    let params = RequestParams::new(json!({"a": 1}));

    read(&dispatcher, &remote, &entity, &params, "v1")
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    read(&dispatcher, &remote, &entity, &params, "v2")
        .await
        .unwrap();
    assert_eq!(remote.fetch_count(), 2);
}

#[tokio::test]
async fn create_busts_only_the_collection_index() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(Arc::clone(&store));
    let remote = FakeRemote::default();

    let model = EntityKey::model("1");
    let model_params = RequestParams::new(json!({"a": 1}));
    read(&dispatcher, &remote, &model, &model_params, "model-1")
        .await
        .unwrap();

    let collection = EntityKey::collection();
    let page = RequestParams::new(json!({"page": 1}));
    read(&dispatcher, &remote, &collection, &page, "page-1")
        .await
        .unwrap();

    mutate(&dispatcher, &remote, Operation::Create, &EntityKey::unsaved_model())
        .await
        .unwrap();

    // The model entry survives; the collection entry is gone.
    let fp = RequestFingerprint::of(&model_params);
    let model_key = format!("canopy:u1-comment-model-1-{}", fp.as_str());
    assert!(store.get(&model_key).await.unwrap().is_some());

    read(&dispatcher, &remote, &collection, &page, "page-1-new")
        .await
        .unwrap();
    assert_eq!(remote.fetch_count(), 3);
}

#[tokio::test]
async fn create_proceeds_with_no_prior_cache() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(store);
    let remote = FakeRemote::default();

    let result = mutate(&dispatcher, &remote, Operation::Create, &EntityKey::unsaved_model())
        .await
        .unwrap();
    assert_eq!(result, "mutated");
    assert_eq!(remote.mutation_count(), 1);
}

#[tokio::test]
async fn invalidation_failure_blocks_the_mutation() {
    let store = Arc::new(BrokenIndexStore {
        inner: MemoryStore::new(),
    });
    let dispatcher =
        CacheDispatcher::for_user(Arc::clone(&store), "canopy", "u1", &profile()).unwrap();
    let remote = FakeRemote::default();

    let result = mutate(&dispatcher, &remote, Operation::Update, &EntityKey::model("1")).await;

    assert!(matches!(result.unwrap_err(), CanopyError::Invalidation(_)));
    assert_eq!(remote.mutation_count(), 0);
}

#[tokio::test]
async fn failed_fetch_caches_nothing() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = dispatcher(Arc::clone(&store));
    let entity = EntityKey::model("1");
    let params = RequestParams::new(json!({"a": 1}));

    let result: CanopyResult<String> = dispatcher
        .handle(Operation::Read, &entity, &params, || async {
            Err(CanopyError::fetch(anyhow::anyhow!("remote unavailable")))
        })
        .await;

    assert!(matches!(result.unwrap_err(), CanopyError::Fetch(_)));
    assert_eq!(store.entry_count(), 0);
}

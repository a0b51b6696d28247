//! NameCache::resolve_bulk driven by an in-process lookup client

use async_trait::async_trait;
use eveset_names::{CharacterId, FetchFailed, LookupClient, LookupError, NameCache};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Name(&'static str),
    NotFound,
    Fail,
}

#[derive(Default)]
struct FakeClient {
    replies: HashMap<CharacterId, Reply>,
    calls: Mutex<Vec<CharacterId>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeClient {
    fn with(mut self, id: CharacterId, reply: Reply) -> Self {
        self.replies.insert(id, reply);
        self
    }

    fn calls(&self) -> Vec<CharacterId> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }
}

#[async_trait]
impl LookupClient for FakeClient {
    async fn fetch(&self, id: CharacterId) -> Result<Option<String>, FetchFailed> {
        self.calls.lock().unwrap().push(id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&id) {
            Some(Reply::Name(name)) => Ok(Some(name.to_string())),
            Some(Reply::NotFound) => Ok(None),
            Some(Reply::Fail) | None => Err(FetchFailed {
                id,
                attempts: 3,
                source: LookupError::ServerError { status: 502 },
            }),
        }
    }
}

#[tokio::test]
async fn test_cached_and_fetched_names_merge() {
    let mut cache = NameCache::new();
    cache.record(111, "Alice");
    let client = FakeClient::default().with(222, Reply::Name("Bob"));

    let result = cache.resolve_bulk(&client, &[111, 222]).await;

    let expected = HashMap::from([(111, "Alice".to_string()), (222, "Bob".to_string())]);
    assert_eq!(result.names, expected);
    assert_eq!(client.calls(), vec![222]);
    assert_eq!(result.report.from_cache, 1);
    assert_eq!(result.report.fetched, 1);
}

#[tokio::test]
async fn test_not_found_marks_invalid() {
    let mut cache = NameCache::new();
    let client = FakeClient::default().with(333, Reply::NotFound);

    let result = cache.resolve_bulk(&client, &[333]).await;

    assert!(!result.names.contains_key(&333));
    assert!(cache.is_invalid(333));
    assert_eq!(result.report.not_found, 1);
}

#[tokio::test]
async fn test_known_ids_make_no_calls() {
    let mut cache = NameCache::new();
    cache.record(1, "Known");
    cache.record_invalid(2);
    let client = FakeClient::default();

    let result = cache.resolve_bulk(&client, &[1, 2, 1, 2]).await;

    assert!(client.calls().is_empty());
    assert_eq!(result.report.requested, 2);
    assert_eq!(result.report.from_cache, 1);
    assert_eq!(result.report.known_invalid, 1);
    assert_eq!(result.names.len(), 1);
}

#[tokio::test]
async fn test_duplicates_fetched_once() {
    let mut cache = NameCache::new();
    let client = FakeClient::default().with(10, Reply::Name("Ten"));

    cache.resolve_bulk(&client, &[10, 10, 10]).await;

    assert_eq!(client.calls(), vec![10]);
}

#[tokio::test]
async fn test_failure_is_soft_and_remembered() {
    let mut cache = NameCache::new();
    let client = FakeClient::default()
        .with(40, Reply::Name("Forty"))
        .with(41, Reply::Fail);

    let result = cache.resolve_bulk(&client, &[40, 41]).await;

    assert_eq!(result.names.get(&40).map(String::as_str), Some("Forty"));
    assert_eq!(result.report.failed, 1);
    assert!(cache.is_invalid(41));

    let again = cache.resolve_bulk(&client, &[41]).await;
    assert_eq!(again.report.known_invalid, 1);
    assert_eq!(client.calls(), vec![40, 41]);
}

#[tokio::test]
async fn test_valid_and_invalid_stay_disjoint_after_resolve() {
    let mut cache = NameCache::new();
    let client = FakeClient::default()
        .with(50, Reply::Name("Fifty"))
        .with(51, Reply::NotFound)
        .with(52, Reply::Fail);

    cache.resolve_bulk(&client, &[50, 51, 52]).await;

    for id in cache.names().keys() {
        assert!(!cache.is_invalid(*id));
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let mut cache = NameCache::new().with_max_concurrent(3);
    let mut client = FakeClient {
        delay: Some(Duration::from_millis(20)),
        ..FakeClient::default()
    };
    let ids: Vec<CharacterId> = (1_000..1_012).collect();
    for id in &ids {
        client.replies.insert(*id, Reply::Name("Pilot"));
    }

    let result = cache.resolve_bulk(&client, &ids).await;

    assert_eq!(result.report.fetched, 12);
    let peak = client.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {}", peak);
    assert!(peak > 1, "lookups did not overlap");
}

#[tokio::test]
async fn test_empty_request() {
    let mut cache = NameCache::new();
    cache.record(7, "Seven");
    let client = FakeClient::default();

    let result = cache.resolve_bulk(&client, &[]).await;

    assert_eq!(result.report.requested, 0);
    assert_eq!(result.names.len(), 1);
    assert!(client.calls().is_empty());
}

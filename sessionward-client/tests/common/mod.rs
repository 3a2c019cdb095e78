//! Common test utilities for sessionward-client integration tests
//!
//! Provides a scripted in-process transport, an access-counting store and
//! client construction helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use sessionward_client::{MemoryStore, SessionClient};
use sessionward_core::{
    transport_error, HttpRequest, HttpResponse, HttpTransport, KeyValueStore, SessionWardResult,
    StorageError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Semaphore;

static INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("sessionward_client=debug,info")
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

struct Gate {
    entered: Arc<Semaphore>,
    release: Arc<Semaphore>,
}

/// Transport answering from per-path queues.
///
/// The last queued reply for a path repeats forever. Unscripted paths get a
/// 404. Every request is recorded.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    gates: Mutex<HashMap<String, Gate>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, path: &str, status: u16, body: Value) {
        self.reply_raw(path, status, &body.to_string());
    }

    pub fn reply_raw(&self, path: &str, status: u16, body: &str) {
        self.push(path, Reply::Respond(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.push(path, Reply::Fail(message.to_string()));
    }

    /// Park requests to `path` until `release` gets a permit. `entered`
    /// gains one permit per parked request.
    pub fn hold(&self, path: &str) -> (Arc<Semaphore>, Arc<Semaphore>) {
        let entered = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(
            path.to_string(),
            Gate {
                entered: entered.clone(),
                release: release.clone(),
            },
        );
        (entered, release)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    fn push(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> SessionWardResult<HttpResponse> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get(&path)
            .map(|gate| (gate.entered.clone(), gate.release.clone()));

        if let Some((entered, release)) = gate {
            entered.add_permits(1);
            release
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        match self.next_reply(&path) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(transport_error!(message, "scripted_transport")),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

/// Store wrapper counting every backend access
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    accesses: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}

/// Store whose reads take `delay` to complete
pub struct SlowStore {
    inner: MemoryStore,
    delay: std::time::Duration,
}

impl SlowStore {
    pub fn new(delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            delay,
        })
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }
}

/// Store that reads and writes normally but refuses deletes
#[derive(Default)]
pub struct StickyStore {
    inner: MemoryStore,
}

impl StickyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl KeyValueStore for StickyStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.write(key, value).await
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("delete refused".to_string()))
    }
}

/// Log sink for asserting on emitted events
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn client_with(
    transport: Arc<ScriptedTransport>,
    store: Arc<dyn KeyValueStore>,
) -> SessionClient {
    init_logging();

    SessionClient::builder()
        .transport(transport)
        .store(store)
        .build()
        .expect("client builds with a transport")
}

/// Seed `store` with a raw session entry under the default key
pub async fn seed_session(store: &dyn KeyValueStore, session: Value) {
    store
        .write("session", &session.to_string())
        .await
        .expect("seeding the store");
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

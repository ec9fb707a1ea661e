//! 异步适配器契约测试：操作体不在调用方线程执行，
//! 失败只通过 future 交付。
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use storage_domain::aggregate::AggregateRoot;
use storage_domain::error::{StorageError, StorageResult};
use storage_domain::repository::{
    AggregateRepository, AsyncAggregateRepository, AsyncRepo, MapRepo,
};
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: String,
    body: String,
}

impl Note {
    fn new(id: &str, body: &str) -> Self {
        Self {
            id: id.to_string(),
            body: body.to_string(),
        }
    }
}

impl AggregateRoot for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

/// 每个操作都失败的后端，用于验证错误经由 future 交付
struct FailingRepo;

impl FailingRepo {
    fn broken<T>() -> StorageResult<T> {
        Err(StorageError::Backend {
            reason: "backend unavailable".to_string(),
        })
    }
}

impl AggregateRepository<Note> for FailingRepo {
    fn find(&self, _id: &str) -> StorageResult<Option<Note>> {
        Self::broken()
    }

    fn find_all<C: Extend<Note>>(
        &self,
        _post_load: impl FnMut(&Note),
        _factory: impl FnOnce(usize) -> C,
    ) -> StorageResult<Option<C>> {
        Self::broken()
    }

    fn find_ids(&self) -> StorageResult<HashSet<String>> {
        Self::broken()
    }

    fn exists(&self, _id: &str) -> StorageResult<bool> {
        Self::broken()
    }

    fn save(&self, _aggregate: Note) -> StorageResult<Note> {
        Self::broken()
    }

    fn delete(&self, _id: &str) -> StorageResult<bool> {
        Self::broken()
    }

    fn delete_and_retrieve(&self, _id: &str) -> StorageResult<Option<Note>> {
        Self::broken()
    }

    fn delete_all(&self) -> StorageResult<()> {
        Self::broken()
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = Note> + Send + '_>> {
        Self::broken()
    }

    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        Self::broken()
    }
}

/// `find` 会 panic 的后端，用于验证任务 panic 收敛为 Executor 错误
struct PanickyRepo;

impl AggregateRepository<Note> for PanickyRepo {
    fn find(&self, _id: &str) -> StorageResult<Option<Note>> {
        panic!("boom");
    }

    fn find_all<C: Extend<Note>>(
        &self,
        _post_load: impl FnMut(&Note),
        _factory: impl FnOnce(usize) -> C,
    ) -> StorageResult<Option<C>> {
        Ok(None)
    }

    fn find_ids(&self) -> StorageResult<HashSet<String>> {
        Ok(HashSet::new())
    }

    fn exists(&self, _id: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn save(&self, aggregate: Note) -> StorageResult<Note> {
        Ok(aggregate)
    }

    fn delete(&self, _id: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn delete_and_retrieve(&self, _id: &str) -> StorageResult<Option<Note>> {
        Ok(None)
    }

    fn delete_all(&self) -> StorageResult<()> {
        Ok(())
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = Note> + Send + '_>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        Ok(Box::new(std::iter::empty()))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn operation_body_never_runs_on_caller_thread() {
    let repo = AsyncRepo::new(Handle::current(), Arc::new(MapRepo::new()));
    repo.save_async(Note::new("n-1", "hello")).await.unwrap();

    let caller: ThreadId = thread::current().id();
    let observed: Arc<Mutex<Vec<ThreadId>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&observed);
    let all: Option<Vec<Note>> = repo
        .find_all_async(
            move |_| sink.lock().unwrap().push(thread::current().id()),
            Vec::with_capacity,
        )
        .await
        .unwrap();
    assert_eq!(all.unwrap().len(), 1);

    let sink = Arc::clone(&observed);
    repo.for_each_async(move |_| sink.lock().unwrap().push(thread::current().id()))
        .await
        .unwrap();

    let sink = Arc::clone(&observed);
    repo.for_each_id_async(move |_| sink.lock().unwrap().push(thread::current().id()))
        .await
        .unwrap();

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 3);
    for executor_thread in observed.iter() {
        assert_ne!(*executor_thread, caller);
    }
}

#[tokio::test]
async fn async_twins_mirror_sync_semantics() {
    let repo = AsyncRepo::new(Handle::current(), Arc::new(MapRepo::new()));

    let saved = repo.save_async(Note::new("n-1", "hello")).await.unwrap();
    assert_eq!(saved.body, "hello");

    assert!(repo.exists_async("n-1").await.unwrap());
    assert_eq!(
        repo.find_async("n-1").await.unwrap(),
        Some(Note::new("n-1", "hello"))
    );
    assert_eq!(repo.find_ids_async().await.unwrap().len(), 1);

    let removed = repo.delete_and_retrieve_async("n-1").await.unwrap();
    assert_eq!(removed, Some(Note::new("n-1", "hello")));
    assert!(!repo.delete_async("n-1").await.unwrap());

    repo.save_async(Note::new("n-2", "x")).await.unwrap();
    repo.delete_all_async().await.unwrap();
    assert!(repo.find_ids_async().await.unwrap().is_empty());
}

#[tokio::test]
async fn backend_failure_is_delivered_through_the_future() {
    let repo = AsyncRepo::new(Handle::current(), Arc::new(FailingRepo));

    // 调用点不抛错，错误在 await 时到达
    let pending = repo.find_async("n-1");
    match pending.await {
        Err(StorageError::Backend { reason }) => assert_eq!(reason, "backend unavailable"),
        other => panic!("unexpected {other:?}"),
    }

    match repo.save_async(Note::new("n-1", "x")).await {
        Err(StorageError::Backend { .. }) => {}
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn task_panic_surfaces_as_executor_error() {
    let repo = AsyncRepo::new(Handle::current(), Arc::new(PanickyRepo));
    match repo.find_async("n-1").await {
        Err(StorageError::Executor { .. }) => {}
        other => panic!("unexpected {other:?}"),
    }
}

//! 异步适配器
//!
//! 将任意同步仓储的操作包装为提交给注入执行器的任务并返回 future。
//! 约定：
//! - 操作体从不在调用方线程上执行（每次调用恰好提交一个任务）；
//! - 被包装操作的失败通过 future 的错误通道交付，绝不在调用点同步抛出；
//! - 执行器由调用方在构造时传入，核心不持有任何全局线程池，
//!   并发上限与线程归属完全由调用方决定。
//!
//! 任务一经提交即运行至结束：核心不接线取消，也不强加超时。
//!
use crate::aggregate::AggregateRoot;
use crate::error::{StorageError, StorageResult};
use crate::repository::AggregateRepository;
use async_trait::async_trait;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::Handle;

/// 把一个同步操作提交到执行器并等待结果。
/// 任务 panic 或被运行时丢弃时收敛为 `StorageError::Executor`。
pub(crate) async fn run_on<T, F>(executor: &Handle, task: F) -> StorageResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    match executor.spawn_blocking(task).await {
        Ok(result) => result,
        Err(source) => Err(StorageError::Executor {
            reason: source.to_string(),
        }),
    }
}

/// 同步仓储协议的异步孪生（非泛型操作子集）。
///
/// `AsyncRepo` 与 `WithCacheRepo` 均实现本协议；带闭包参数的枚举类
/// 操作（`find_all_async` 等）因泛型签名以各自的固有方法提供。
#[async_trait]
pub trait AsyncAggregateRepository<A>: Send + Sync
where
    A: AggregateRoot + 'static,
{
    /// `find` 的异步孪生
    async fn find_async(&self, id: &str) -> StorageResult<Option<A>>;

    /// `find_ids` 的异步孪生
    async fn find_ids_async(&self) -> StorageResult<HashSet<String>>;

    /// `exists` 的异步孪生
    async fn exists_async(&self, id: &str) -> StorageResult<bool>;

    /// `save` 的异步孪生
    async fn save_async(&self, aggregate: A) -> StorageResult<A>;

    /// `delete` 的异步孪生
    async fn delete_async(&self, id: &str) -> StorageResult<bool>;

    /// `delete_and_retrieve` 的异步孪生
    async fn delete_and_retrieve_async(&self, id: &str) -> StorageResult<Option<A>>;

    /// `delete_all` 的异步孪生
    async fn delete_all_async(&self) -> StorageResult<()>;
}

/// 任意同步仓储的异步包装。
///
/// 以 `Arc` 共享被包装仓储，执行器由调用方注入；同一实例可廉价克隆
/// 给多个任务使用。
pub struct AsyncRepo<A, R> {
    executor: Handle,
    repository: Arc<R>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, R> Clone for AsyncRepo<A, R> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            repository: Arc::clone(&self.repository),
            _aggregate: PhantomData,
        }
    }
}

impl<A, R> AsyncRepo<A, R>
where
    A: AggregateRoot + 'static,
    R: AggregateRepository<A> + 'static,
{
    /// 以注入的执行器包装一个同步仓储
    pub fn new(executor: Handle, repository: Arc<R>) -> Self {
        Self {
            executor,
            repository,
            _aggregate: PhantomData,
        }
    }

    /// 注入的执行器
    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    /// 被包装的同步仓储
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// `find_all` 的异步孪生；`post_load` 与 `factory` 均在执行器线程上调用
    pub async fn find_all_async<C, P, F>(
        &self,
        post_load: P,
        factory: F,
    ) -> StorageResult<Option<C>>
    where
        C: Extend<A> + Send + 'static,
        P: FnMut(&A) + Send + 'static,
        F: FnOnce(usize) -> C + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || {
            repository.find_all(post_load, factory)
        })
        .await
    }

    /// `for_each` 的异步孪生
    pub async fn for_each_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(A) + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || repository.for_each(action)).await
    }

    /// `for_each_id` 的异步孪生
    pub async fn for_each_id_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(String) + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || repository.for_each_id(action)).await
    }
}

#[async_trait]
impl<A, R> AsyncAggregateRepository<A> for AsyncRepo<A, R>
where
    A: AggregateRoot + 'static,
    R: AggregateRepository<A> + 'static,
{
    async fn find_async(&self, id: &str) -> StorageResult<Option<A>> {
        let repository = Arc::clone(&self.repository);
        let id = id.to_owned();
        run_on(&self.executor, move || repository.find(&id)).await
    }

    async fn find_ids_async(&self) -> StorageResult<HashSet<String>> {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || repository.find_ids()).await
    }

    async fn exists_async(&self, id: &str) -> StorageResult<bool> {
        let repository = Arc::clone(&self.repository);
        let id = id.to_owned();
        run_on(&self.executor, move || repository.exists(&id)).await
    }

    async fn save_async(&self, aggregate: A) -> StorageResult<A> {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || repository.save(aggregate)).await
    }

    async fn delete_async(&self, id: &str) -> StorageResult<bool> {
        let repository = Arc::clone(&self.repository);
        let id = id.to_owned();
        run_on(&self.executor, move || repository.delete(&id)).await
    }

    async fn delete_and_retrieve_async(&self, id: &str) -> StorageResult<Option<A>> {
        let repository = Arc::clone(&self.repository);
        let id = id.to_owned();
        run_on(&self.executor, move || repository.delete_and_retrieve(&id)).await
    }

    async fn delete_all_async(&self) -> StorageResult<()> {
        let repository = Arc::clone(&self.repository);
        run_on(&self.executor, move || repository.delete_all()).await
    }
}

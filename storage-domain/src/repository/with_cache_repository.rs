//! 双层组合仓储
//!
//! 在持久层（storage，权威数据源）之前叠加一层易失缓存（cache），
//! 以一个对象暴露两层的全部操作：
//! - 无后缀操作只作用于持久层——持久性是默认行为，绝不静默落入缓存；
//! - `..._in_cache` 只作用于缓存层；
//! - `..._in_both` / `..._in_any` / `..._and_save_to_cache` 为显式的
//!   双层策略（读穿透、写穿透、回填）。
//!
//! 组合器对两层只持非拥有引用（`Arc`），其创建、关闭与淘汰策略由
//! 调用方管理；两层之间不做任何自动同步，缓存随时可能过期或残缺，
//! 只能通过这里暴露的显式操作收敛。
//!
//! 注意 `delete_in_both`/`exists_in_both` 的 `&&` 短路语义：缓存侧
//! 返回 `false` 时持久层一侧根本不会被执行。该行为被原样保留并由
//! 测试钉死，而不是当作缺陷修掉。
//!
use crate::aggregate::AggregateRoot;
use crate::error::StorageResult;
use crate::repository::{AggregateRepository, AsyncAggregateRepository, run_on};
use async_trait::async_trait;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::Handle;

/// 缓存层 + 持久层的双层组合仓储
pub struct WithCacheRepo<A, C, S> {
    executor: Handle,
    cache: Arc<C>,
    storage: Arc<S>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, C, S> Clone for WithCacheRepo<A, C, S> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            cache: Arc::clone(&self.cache),
            storage: Arc::clone(&self.storage),
            _aggregate: PhantomData,
        }
    }
}

impl<A, C, S> WithCacheRepo<A, C, S>
where
    A: AggregateRoot,
    C: AggregateRepository<A>,
    S: AggregateRepository<A>,
{
    /// 组合缓存仓储与持久仓储；执行器用于全部异步孪生操作
    pub fn new(executor: Handle, cache: Arc<C>, storage: Arc<S>) -> Self {
        Self {
            executor,
            cache,
            storage,
            _aggregate: PhantomData,
        }
    }

    /// 缓存层仓储
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// 持久层仓储
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// 注入的执行器
    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    // ---- 缓存层操作 ----

    /// 只在缓存层查找
    pub fn find_in_cache(&self, id: &str) -> StorageResult<Option<A>> {
        self.cache.find(id)
    }

    /// 只在缓存层枚举；语义同 `find_all`
    pub fn find_all_in_cache<Col: Extend<A>>(
        &self,
        post_load: impl FnMut(&A),
        factory: impl FnOnce(usize) -> Col,
    ) -> StorageResult<Option<Col>> {
        self.cache.find_all(post_load, factory)
    }

    /// 缓存层全部 id
    pub fn find_ids_in_cache(&self) -> StorageResult<HashSet<String>> {
        self.cache.find_ids()
    }

    /// 指定 id 是否存在于缓存层
    pub fn exists_in_cache(&self, id: &str) -> StorageResult<bool> {
        self.cache.exists(id)
    }

    /// 只写缓存层
    pub fn save_in_cache(&self, aggregate: A) -> StorageResult<A> {
        self.cache.save(aggregate)
    }

    /// 只删缓存层
    pub fn delete_in_cache(&self, id: &str) -> StorageResult<bool> {
        self.cache.delete(id)
    }

    /// 只删缓存层并返回被删除的聚合
    pub fn delete_and_retrieve_in_cache(&self, id: &str) -> StorageResult<Option<A>> {
        self.cache.delete_and_retrieve(id)
    }

    /// 清空缓存层；持久层不受影响（清两层需分别调用）
    pub fn delete_all_in_cache(&self) -> StorageResult<()> {
        self.cache.delete_all()
    }

    /// 缓存层聚合迭代器
    pub fn iter_in_cache(&self) -> StorageResult<Box<dyn Iterator<Item = A> + Send + '_>> {
        self.cache.iter()
    }

    /// 缓存层 id 迭代器
    pub fn iter_ids_in_cache(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        self.cache.iter_ids()
    }

    /// 对缓存层每个聚合执行一次 `action`
    pub fn for_each_in_cache(&self, action: impl FnMut(A)) -> StorageResult<()> {
        self.cache.for_each(action)
    }

    /// 对缓存层每个 id 执行一次 `action`
    pub fn for_each_id_in_cache(&self, action: impl FnMut(String)) -> StorageResult<()> {
        self.cache.for_each_id(action)
    }

    // ---- 双层策略操作 ----

    /// 读穿透（无副作用）：缓存命中即返回；未命中时查持久层，
    /// 但不回填缓存
    pub fn find_in_both(&self, id: &str) -> StorageResult<Option<A>> {
        if let Some(cached) = self.cache.find(id)? {
            return Ok(Some(cached));
        }
        self.storage.find(id)
    }

    /// 持久层命中时回填缓存后返回；未命中不缓存（不做负缓存）
    pub fn find_and_save_to_cache(&self, id: &str) -> StorageResult<Option<A>> {
        match self.storage.find(id)? {
            None => Ok(None),
            Some(found) => Ok(Some(self.cache.save(found)?)),
        }
    }

    /// 读穿透 + 回填：缓存命中即返回；未命中时查持久层，
    /// 命中则回填缓存，未命中不缓存
    pub fn find_in_both_and_save_to_cache(&self, id: &str) -> StorageResult<Option<A>> {
        if let Some(cached) = self.cache.find(id)? {
            return Ok(Some(cached));
        }
        match self.storage.find(id)? {
            None => Ok(None),
            Some(found) => Ok(Some(self.cache.save(found)?)),
        }
    }

    /// 写穿透：先写缓存再写持久层，原样返回。持久层写入失败而缓存
    /// 已写成功时，两层就此分歧，错误原样上抛、不做回滚
    pub fn save_in_both(&self, aggregate: A) -> StorageResult<A> {
        let aggregate = self.cache.save(aggregate)?;
        self.storage.save(aggregate)
    }

    /// 批量落盘：遍历缓存层全部条目，逐个先执行 `pre_save` 再写入
    /// 持久层。非原子：中途失败时已写入的前缀保持已写入。
    /// `pre_save` 的修改只体现在持久层收到的值上，缓存保留原值
    pub fn save_all(&self, mut pre_save: impl FnMut(&mut A)) -> StorageResult<()> {
        for mut aggregate in self.cache.iter()? {
            pre_save(&mut aggregate);
            self.storage.save(aggregate)?;
        }
        Ok(())
    }

    /// 任一层存在即为 `true`；缓存命中时持久层不再被查询
    pub fn exists_in_any(&self, id: &str) -> StorageResult<bool> {
        Ok(self.cache.exists(id)? || self.storage.exists(id)?)
    }

    /// 两层同时存在才为 `true`；缓存缺失即短路，持久层不再被查询
    pub fn exists_in_both(&self, id: &str) -> StorageResult<bool> {
        Ok(self.cache.exists(id)? && self.storage.exists(id)?)
    }

    /// 两层删除的 `&&` 组合；缓存侧删除返回 `false` 时短路，
    /// 持久层的删除不会被执行（可能留下仅存于持久层的条目）
    pub fn delete_in_both(&self, id: &str) -> StorageResult<bool> {
        Ok(self.cache.delete(id)? && self.storage.delete(id)?)
    }
}

impl<A, C, S> AggregateRepository<A> for WithCacheRepo<A, C, S>
where
    A: AggregateRoot,
    C: AggregateRepository<A>,
    S: AggregateRepository<A>,
{
    fn find(&self, id: &str) -> StorageResult<Option<A>> {
        self.storage.find(id)
    }

    fn find_all<Col: Extend<A>>(
        &self,
        post_load: impl FnMut(&A),
        factory: impl FnOnce(usize) -> Col,
    ) -> StorageResult<Option<Col>> {
        self.storage.find_all(post_load, factory)
    }

    fn find_ids(&self) -> StorageResult<HashSet<String>> {
        self.storage.find_ids()
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id)
    }

    fn save(&self, aggregate: A) -> StorageResult<A> {
        self.storage.save(aggregate)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        self.storage.delete(id)
    }

    fn delete_and_retrieve(&self, id: &str) -> StorageResult<Option<A>> {
        self.storage.delete_and_retrieve(id)
    }

    fn delete_all(&self) -> StorageResult<()> {
        self.storage.delete_all()
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = A> + Send + '_>> {
        self.storage.iter()
    }

    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        self.storage.iter_ids()
    }
}

#[async_trait]
impl<A, C, S> AsyncAggregateRepository<A> for WithCacheRepo<A, C, S>
where
    A: AggregateRoot + 'static,
    C: AggregateRepository<A> + 'static,
    S: AggregateRepository<A> + 'static,
{
    async fn find_async(&self, id: &str) -> StorageResult<Option<A>> {
        let storage = Arc::clone(&self.storage);
        let id = id.to_owned();
        run_on(&self.executor, move || storage.find(&id)).await
    }

    async fn find_ids_async(&self) -> StorageResult<HashSet<String>> {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.find_ids()).await
    }

    async fn exists_async(&self, id: &str) -> StorageResult<bool> {
        let storage = Arc::clone(&self.storage);
        let id = id.to_owned();
        run_on(&self.executor, move || storage.exists(&id)).await
    }

    async fn save_async(&self, aggregate: A) -> StorageResult<A> {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.save(aggregate)).await
    }

    async fn delete_async(&self, id: &str) -> StorageResult<bool> {
        let storage = Arc::clone(&self.storage);
        let id = id.to_owned();
        run_on(&self.executor, move || storage.delete(&id)).await
    }

    async fn delete_and_retrieve_async(&self, id: &str) -> StorageResult<Option<A>> {
        let storage = Arc::clone(&self.storage);
        let id = id.to_owned();
        run_on(&self.executor, move || storage.delete_and_retrieve(&id)).await
    }

    async fn delete_all_async(&self) -> StorageResult<()> {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.delete_all()).await
    }
}

/// 全部同步操作的异步孪生：每个调用恰好向执行器提交一个任务，
/// 失败通过 future 交付。
impl<A, C, S> WithCacheRepo<A, C, S>
where
    A: AggregateRoot + 'static,
    C: AggregateRepository<A> + 'static,
    S: AggregateRepository<A> + 'static,
{
    /// `find_all` 的异步孪生（作用于持久层）
    pub async fn find_all_async<Col, P, F>(
        &self,
        post_load: P,
        factory: F,
    ) -> StorageResult<Option<Col>>
    where
        Col: Extend<A> + Send + 'static,
        P: FnMut(&A) + Send + 'static,
        F: FnOnce(usize) -> Col + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.find_all(post_load, factory)).await
    }

    /// `find_in_cache` 的异步孪生
    pub async fn find_in_cache_async(&self, id: &str) -> StorageResult<Option<A>> {
        let cache = Arc::clone(&self.cache);
        let id = id.to_owned();
        run_on(&self.executor, move || cache.find(&id)).await
    }

    /// `find_all_in_cache` 的异步孪生
    pub async fn find_all_in_cache_async<Col, P, F>(
        &self,
        post_load: P,
        factory: F,
    ) -> StorageResult<Option<Col>>
    where
        Col: Extend<A> + Send + 'static,
        P: FnMut(&A) + Send + 'static,
        F: FnOnce(usize) -> Col + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.find_all(post_load, factory)).await
    }

    /// `find_ids_in_cache` 的异步孪生
    pub async fn find_ids_in_cache_async(&self) -> StorageResult<HashSet<String>> {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.find_ids()).await
    }

    /// `exists_in_cache` 的异步孪生
    pub async fn exists_in_cache_async(&self, id: &str) -> StorageResult<bool> {
        let cache = Arc::clone(&self.cache);
        let id = id.to_owned();
        run_on(&self.executor, move || cache.exists(&id)).await
    }

    /// `save_in_cache` 的异步孪生
    pub async fn save_in_cache_async(&self, aggregate: A) -> StorageResult<A> {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.save(aggregate)).await
    }

    /// `delete_in_cache` 的异步孪生
    pub async fn delete_in_cache_async(&self, id: &str) -> StorageResult<bool> {
        let cache = Arc::clone(&self.cache);
        let id = id.to_owned();
        run_on(&self.executor, move || cache.delete(&id)).await
    }

    /// `delete_and_retrieve_in_cache` 的异步孪生
    pub async fn delete_and_retrieve_in_cache_async(&self, id: &str) -> StorageResult<Option<A>> {
        let cache = Arc::clone(&self.cache);
        let id = id.to_owned();
        run_on(&self.executor, move || cache.delete_and_retrieve(&id)).await
    }

    /// `delete_all_in_cache` 的异步孪生
    pub async fn delete_all_in_cache_async(&self) -> StorageResult<()> {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.delete_all()).await
    }

    /// `for_each_in_cache` 的异步孪生
    pub async fn for_each_in_cache_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(A) + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.for_each(action)).await
    }

    /// `for_each_id_in_cache` 的异步孪生
    pub async fn for_each_id_in_cache_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(String) + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        run_on(&self.executor, move || cache.for_each_id(action)).await
    }

    /// `find_in_both` 的异步孪生
    pub async fn find_in_both_async(&self, id: &str) -> StorageResult<Option<A>> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || repository.find_in_both(&id)).await
    }

    /// `find_and_save_to_cache` 的异步孪生
    pub async fn find_and_save_to_cache_async(&self, id: &str) -> StorageResult<Option<A>> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || {
            repository.find_and_save_to_cache(&id)
        })
        .await
    }

    /// `find_in_both_and_save_to_cache` 的异步孪生
    pub async fn find_in_both_and_save_to_cache_async(
        &self,
        id: &str,
    ) -> StorageResult<Option<A>> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || {
            repository.find_in_both_and_save_to_cache(&id)
        })
        .await
    }

    /// `save_in_both` 的异步孪生
    pub async fn save_in_both_async(&self, aggregate: A) -> StorageResult<A> {
        let repository = self.clone();
        run_on(&self.executor, move || repository.save_in_both(aggregate)).await
    }

    /// `save_all` 的异步孪生
    pub async fn save_all_async<F>(&self, pre_save: F) -> StorageResult<()>
    where
        F: FnMut(&mut A) + Send + 'static,
    {
        let repository = self.clone();
        run_on(&self.executor, move || repository.save_all(pre_save)).await
    }

    /// `exists_in_any` 的异步孪生
    pub async fn exists_in_any_async(&self, id: &str) -> StorageResult<bool> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || repository.exists_in_any(&id)).await
    }

    /// `exists_in_both` 的异步孪生
    pub async fn exists_in_both_async(&self, id: &str) -> StorageResult<bool> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || repository.exists_in_both(&id)).await
    }

    /// `delete_in_both` 的异步孪生（短路语义与同步版一致）
    pub async fn delete_in_both_async(&self, id: &str) -> StorageResult<bool> {
        let repository = self.clone();
        let id = id.to_owned();
        run_on(&self.executor, move || repository.delete_in_both(&id)).await
    }

    /// `for_each` 的异步孪生（作用于持久层）
    pub async fn for_each_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(A) + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.for_each(action)).await
    }

    /// `for_each_id` 的异步孪生（作用于持久层）
    pub async fn for_each_id_async<F>(&self, action: F) -> StorageResult<()>
    where
        F: FnMut(String) + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        run_on(&self.executor, move || storage.for_each_id(action)).await
    }
}

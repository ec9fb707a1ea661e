//! 仓储构建器
//!
//! 后端 crate 的统一构建入口：后端只需描述如何产出自己的同步仓储，
//! 异步包装与缓存层叠加由提供的默认方法完成。
//!
use crate::aggregate::AggregateRoot;
use crate::error::StorageResult;
use crate::repository::{AggregateRepository, AsyncRepo, WithCacheRepo};
use std::sync::Arc;
use tokio::runtime::Handle;

/// 仓储构建协议。
///
/// 实现方只需给出 `build`；`build_async` 与 `build_with_cache`
/// 在其上叠加异步包装或缓存层。
pub trait RepositoryBuilder<A>
where
    A: AggregateRoot + 'static,
{
    /// 构建产物（同步仓储）
    type Output: AggregateRepository<A> + 'static;

    /// 构建同步仓储；执行器供需要预热异步资源的后端使用
    fn build(self, executor: Handle) -> StorageResult<Self::Output>;

    /// 构建并以异步适配器包装
    fn build_async(self, executor: Handle) -> StorageResult<AsyncRepo<A, Self::Output>>
    where
        Self: Sized,
    {
        let storage = self.build(executor.clone())?;
        Ok(AsyncRepo::new(executor, Arc::new(storage)))
    }

    /// 构建并作为持久层与给定缓存仓储组合成双层仓储
    fn build_with_cache<C>(
        self,
        executor: Handle,
        cache: Arc<C>,
    ) -> StorageResult<WithCacheRepo<A, C, Self::Output>>
    where
        Self: Sized,
        C: AggregateRepository<A> + 'static,
    {
        let storage = self.build(executor.clone())?;
        Ok(WithCacheRepo::new(executor, cache, Arc::new(storage)))
    }
}

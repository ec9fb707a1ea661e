//! 同步仓储协议
//!
//! 所有仓储实现的基础：以 id 为唯一键对聚合进行 CRUD 与枚举。
//! 缺失是正常返回值而非错误；迭代不保证任何顺序。
//!
use crate::aggregate::AggregateRoot;
use crate::error::StorageResult;
use std::collections::HashSet;
use std::sync::Arc;

/// 聚合仓储协议。
///
/// 约定：
/// - `find_all` 在仓储为空时返回 `Ok(None)` 而非空集合（“空即缺失”），
///   调用方必须区分这两种情况；
/// - `save` 按 `aggregate.id()` 整体覆盖旧值，并原样返回传入实例，
///   便于链式调用；
/// - `iter`/`iter_ids` 返回单遍惰性序列，能否重复获取由后端决定
///   （映射类后端可随时取新迭代器，流式文件后端需自行说明）。
pub trait AggregateRepository<A: AggregateRoot>: Send + Sync {
    /// 按 id 查找聚合，不存在时返回 `Ok(None)`
    fn find(&self, id: &str) -> StorageResult<Option<A>>;

    /// 枚举全部聚合：每个条目加载后、放入结果前调用一次 `post_load`；
    /// `factory` 以条目数为容量提示构造结果集合；仓储为空时返回 `Ok(None)`
    fn find_all<C: Extend<A>>(
        &self,
        post_load: impl FnMut(&A),
        factory: impl FnOnce(usize) -> C,
    ) -> StorageResult<Option<C>>;

    /// 全部 id，不保证顺序
    fn find_ids(&self) -> StorageResult<HashSet<String>>;

    /// 指定 id 是否存在
    fn exists(&self, id: &str) -> StorageResult<bool>;

    /// 保存（upsert）聚合并原样返回
    fn save(&self, aggregate: A) -> StorageResult<A>;

    /// 删除指定 id；存在且已删除时返回 `true`
    fn delete(&self, id: &str) -> StorageResult<bool>;

    /// 删除指定 id 并返回被删除的聚合
    fn delete_and_retrieve(&self, id: &str) -> StorageResult<Option<A>>;

    /// 删除全部条目
    fn delete_all(&self) -> StorageResult<()>;

    /// 聚合的惰性迭代器（单遍）
    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = A> + Send + '_>>;

    /// id 的惰性迭代器（单遍）
    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>>;

    /// 对每个聚合执行一次 `action`
    fn for_each(&self, mut action: impl FnMut(A)) -> StorageResult<()> {
        for aggregate in self.iter()? {
            action(aggregate);
        }
        Ok(())
    }

    /// 对每个 id 执行一次 `action`
    fn for_each_id(&self, mut action: impl FnMut(String)) -> StorageResult<()> {
        for id in self.iter_ids()? {
            action(id);
        }
        Ok(())
    }
}

impl<A, T> AggregateRepository<A> for Arc<T>
where
    A: AggregateRoot,
    T: AggregateRepository<A> + ?Sized,
{
    fn find(&self, id: &str) -> StorageResult<Option<A>> {
        (**self).find(id)
    }

    fn find_all<C: Extend<A>>(
        &self,
        post_load: impl FnMut(&A),
        factory: impl FnOnce(usize) -> C,
    ) -> StorageResult<Option<C>> {
        (**self).find_all(post_load, factory)
    }

    fn find_ids(&self) -> StorageResult<HashSet<String>> {
        (**self).find_ids()
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        (**self).exists(id)
    }

    fn save(&self, aggregate: A) -> StorageResult<A> {
        (**self).save(aggregate)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        (**self).delete(id)
    }

    fn delete_and_retrieve(&self, id: &str) -> StorageResult<Option<A>> {
        (**self).delete_and_retrieve(id)
    }

    fn delete_all(&self) -> StorageResult<()> {
        (**self).delete_all()
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = A> + Send + '_>> {
        (**self).iter()
    }

    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        (**self).iter_ids()
    }
}

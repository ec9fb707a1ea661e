//! 内存映射仓储
//!
//! 以 `RwLock<HashMap>` 为底层存储的 `AggregateRepository` 实现，
//! 常与 `WithCacheRepo` 搭配充当缓存层，也可单独用于测试与原型。
//! 迭代基于取值瞬间的快照，可随时重复获取新迭代器。
//!
use crate::aggregate::AggregateRoot;
use crate::error::{StorageError, StorageResult};
use crate::repository::AggregateRepository;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 内存映射仓储
pub struct MapRepo<A> {
    entries: RwLock<HashMap<String, A>>,
}

impl<A> MapRepo<A> {
    /// 创建空仓储
    pub fn new() -> Self {
        Self::from_map(HashMap::new())
    }

    /// 以调用方提供的映射作为初始存储
    pub fn from_map(entries: HashMap<String, A>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn read_guard(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, A>>> {
        self.entries.read().map_err(|_| StorageError::Backend {
            reason: "map repository lock poisoned".to_string(),
        })
    }

    fn write_guard(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, A>>> {
        self.entries.write().map_err(|_| StorageError::Backend {
            reason: "map repository lock poisoned".to_string(),
        })
    }
}

impl<A> Default for MapRepo<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> AggregateRepository<A> for MapRepo<A>
where
    A: AggregateRoot + Clone,
{
    fn find(&self, id: &str) -> StorageResult<Option<A>> {
        Ok(self.read_guard()?.get(id).cloned())
    }

    fn find_all<C: Extend<A>>(
        &self,
        mut post_load: impl FnMut(&A),
        factory: impl FnOnce(usize) -> C,
    ) -> StorageResult<Option<C>> {
        let entries = self.read_guard()?;
        if entries.is_empty() {
            return Ok(None);
        }
        let mut collection = factory(entries.len());
        for aggregate in entries.values() {
            post_load(aggregate);
            collection.extend(std::iter::once(aggregate.clone()));
        }
        Ok(Some(collection))
    }

    fn find_ids(&self) -> StorageResult<HashSet<String>> {
        Ok(self.read_guard()?.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.read_guard()?.contains_key(id))
    }

    fn save(&self, aggregate: A) -> StorageResult<A> {
        self.write_guard()?
            .insert(aggregate.id().to_owned(), aggregate.clone());
        Ok(aggregate)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        Ok(self.write_guard()?.remove(id).is_some())
    }

    fn delete_and_retrieve(&self, id: &str) -> StorageResult<Option<A>> {
        Ok(self.write_guard()?.remove(id))
    }

    fn delete_all(&self) -> StorageResult<()> {
        self.write_guard()?.clear();
        Ok(())
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = A> + Send + '_>> {
        let snapshot: Vec<A> = self.read_guard()?.values().cloned().collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn iter_ids(&self) -> StorageResult<Box<dyn Iterator<Item = String> + Send + '_>> {
        let snapshot: Vec<String> = self.read_guard()?.keys().cloned().collect();
        Ok(Box::new(snapshot.into_iter()))
    }
}

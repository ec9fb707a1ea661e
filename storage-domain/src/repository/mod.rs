//! 仓储协议与组合实现（repository）
//!
//! 定义同步仓储协议及其通用组合，支持：
//! - 以 id 为键的 CRUD、枚举与惰性迭代（`AggregateRepository`）；
//! - 基于注入执行器的异步包装（`AsyncRepo`/`AsyncAggregateRepository`）；
//! - 缓存层 + 持久层的双层组合（`WithCacheRepo`）；
//! - 面向后端 crate 的统一构建入口（`RepositoryBuilder`）。
//!
//! 该模块聚焦协议与装配逻辑，线程安全完全委托给各实现的底层存储。
//!
mod aggregate_repository;
mod async_repository;
mod builder;
mod map_repository;
mod with_cache_repository;

pub use aggregate_repository::AggregateRepository;
pub use async_repository::{AsyncAggregateRepository, AsyncRepo};
pub use builder::RepositoryBuilder;
pub use map_repository::MapRepo;
pub use with_cache_repository::WithCacheRepo;

pub(crate) use async_repository::run_on;

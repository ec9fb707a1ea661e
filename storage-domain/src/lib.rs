//! 聚合存储领域层基础库（storage-domain）
//!
//! 提供与存储后端解耦的聚合仓储抽象，用于在应用中实现：
//! - 聚合标识契约（`aggregate`）：以字符串 id 为唯一标识的聚合根；
//! - 同步仓储协议（`repository`）：CRUD、枚举与惰性迭代；
//! - 异步适配器：将任意同步仓储的操作提交到调用方注入的执行器；
//! - 双层组合仓储：在持久层之前叠加一层易失缓存，并以显式后缀区分
//!   一致性策略（cache/both/any）。
//!
//! 本 crate 只定义协议与组合逻辑，不内置任何线程管理或重试策略；
//! 具体存储后端（按 id 落盘的 JSON/YAML 文件、文档数据库等）由上层
//! 提供实现并注入。
//!
//! 典型用法：
//! 1. 为领域类型实现 `AggregateRoot`；
//! 2. 选择或实现一个 `AggregateRepository` 后端（内存场景可直接使用
//!    `MapRepo`）；
//! 3. 需要异步时以 `AsyncRepo` 包装，执行器由调用方传入；
//! 4. 需要缓存时以 `WithCacheRepo` 组合缓存仓储与持久仓储，并按策略
//!    选用带后缀的操作。
//!
pub mod aggregate;
pub mod error;
pub mod repository;

//! 持久化协议（persist）
//!
//! - 事务边界（`TransactionManager`）：在 [`TxContext`] 中传递进行中的事务句柄，
//!   嵌套调用复用外层事务，只有最外层负责提交/回滚；
//! - 仓储接口（`Repository`/`ReadRepository`）与查询过滤器（`Filter`）；
//! - 内存实现（[`memory`]），用于测试与原型。
//!
//! 具体存储后端由上层实现 [`TransactionEngine`] 与仓储接口后注入。
//!
pub mod memory;
mod repository;
mod transaction;

pub use repository::{DEFAULT_LIMIT, DEFAULT_SORT, Filter, ReadRepository, Repository, SortOrder};
pub use transaction::{TransactionEngine, TransactionManager, TxContext, TxState};

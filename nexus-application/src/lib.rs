//! 应用层（nexus-application）
//!
//! 位于领域内核之上的薄层：调用上下文、应用错误与响应信封、输入校验、
//! 用例与提交后事件分发、内核配置与 tracing 初始化。
//!
pub mod config;
pub mod context;
pub mod error;
pub mod response;
pub mod telemetry;
pub mod use_case;
pub mod validation;

pub use context::{AppContext, BusinessContext};
pub use error::{AppError, AppResult};
pub use response::{ApiResponse, ErrorStatus};
pub use use_case::{AggregatePersister, EventDispatcher, EventHandler, InMemoryEventDispatcher, UseCase};

//! 领域事件（Domain Event）
//!
//! 事件记录（`DomainEvent`）在构造时自动打上事件标识与发生时间，调用方无法指定这两项；
//! 类型化的事件载荷实现 `EventPayload`（通常由 `#[domain_event]` 生成），
//! 为每个变体提供稳定的事件类型名。

mod event;
mod payload;

pub use event::DomainEvent;
pub use payload::EventPayload;

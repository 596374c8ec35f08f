use serde::Serialize;

/// 领域事件载荷需要满足的能力边界
///
/// 事件类型名需保持稳定（形如 `UserEvent.Activated` 或自定义的 `user.activated`），
/// 订阅方与存储都以它区分事件。
pub trait EventPayload: Serialize + Send + Sync {
    fn event_type(&self) -> &'static str;
}

use super::EventPayload;
use crate::error::DomainResult;
use crate::identity::{EntityId, IdentityService};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// 不可变的领域事件记录，相等性只比较事件标识
///
/// 新事件只能经由 [`DomainEvent::new`]/[`DomainEvent::from_payload`] 创建，
/// 由标识服务分配 `event_id` 并记录当前时间。
/// `Deserialize` 仅用于从存储或消息中重建已发生的事件，会原样保留其中的
/// `event_id` 与 `occurred_at`，不要用它构造新事件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    event_id: EntityId,
    event_type: String,
    aggregate_id: EntityId,
    occurred_at: DateTime<Utc>,
    payload: Value,
}

impl DomainEvent {
    pub fn new(
        ids: &IdentityService,
        event_type: impl Into<String>,
        aggregate_id: EntityId,
        payload: Value,
    ) -> Self {
        Self {
            event_id: ids.generate(),
            event_type: event_type.into(),
            aggregate_id,
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// 由类型化载荷构造，事件类型取自载荷
    pub fn from_payload<P>(
        ids: &IdentityService,
        aggregate_id: EntityId,
        payload: &P,
    ) -> DomainResult<Self>
    where
        P: EventPayload,
    {
        let value = serde_json::to_value(payload)?;
        Ok(Self::new(ids, payload.event_type(), aggregate_id, value))
    }

    pub fn event_id(&self) -> &EntityId {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn aggregate_id(&self) -> &EntityId {
        &self.aggregate_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 将载荷解码为具体类型
    pub fn payload_as<T>(&self) -> DomainResult<T>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

impl PartialEq for DomainEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event_id == other.event_id
    }
}

impl Eq for DomainEvent {}

impl Hash for DomainEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.event_id.hash(state);
    }
}

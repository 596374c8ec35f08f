//! 聚合根（Aggregate Root）
//!
//! 聚合根是实体加上单调递增的版本号与一个只追加的事件缓冲区。
//! 行为方法通过 [`AggregateRoot::record_event`]/[`AggregateRoot::raise`] 记录事件；
//! 持久化聚合的用例通过 [`AggregateRoot::drain_events`] 取走并清空缓冲区，
//! 同一批事件不会被两个消费方同时看到。
//!
//! 事件缓冲区不参与序列化：从存储重建的聚合总是从空缓冲区开始，
//! 在排空之前丢弃聚合实例会丢失尚未发布的事件。
//!
use crate::domain_event::{DomainEvent, EventPayload};
use crate::entity::{BaseEntity, Entity};
use crate::error::DomainResult;
use crate::identity::{EntityId, IdentityService};
use crate::value_object::Version;
use serde::{Deserialize, Serialize};

/// 聚合根公共状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateBase {
    #[serde(flatten)]
    entity: BaseEntity,
    #[serde(default)]
    version: Version,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl AggregateBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: EntityId) -> Self {
        Self::restore(BaseEntity::with_id(id), Version::new())
    }

    /// 从存储重建（事件缓冲区为空）
    pub fn restore(entity: BaseEntity, version: Version) -> Self {
        Self {
            entity,
            version,
            events: Vec::new(),
        }
    }

    pub fn entity(&self) -> &BaseEntity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut BaseEntity {
        &mut self.entity
    }

    pub fn version(&self) -> Version {
        self.version
    }

    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
        self.version = self.version.next();
        self.entity.touch();
    }

    fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn pending(&self) -> &[DomainEvent] {
        &self.events
    }
}

/// 聚合根接口
///
/// 通常由 `#[aggregate_root(type = "...")]` 生成实现。
pub trait AggregateRoot: Entity {
    /// 聚合类型名（用于存储分区与类型校验）
    const TYPE: &'static str;

    fn aggregate_base(&self) -> &AggregateBase;

    fn aggregate_base_mut(&mut self) -> &mut AggregateBase;

    fn version(&self) -> Version {
        self.aggregate_base().version()
    }

    /// 追加事件（保持调用顺序），并推进版本、刷新修改时间
    fn record_event(&mut self, event: DomainEvent) {
        self.aggregate_base_mut().record(event);
    }

    /// 由类型化载荷构造事件并记录；聚合尚无标识时先分配
    fn raise<P>(&mut self, ids: &IdentityService, payload: &P) -> DomainResult<()>
    where
        P: EventPayload,
        Self: Sized,
    {
        let aggregate_id = self.ensure_id(ids);
        let event = DomainEvent::from_payload(ids, aggregate_id, payload)?;
        self.record_event(event);
        Ok(())
    }

    /// 查看尚未排空的事件
    fn pending_events(&self) -> &[DomainEvent] {
        self.aggregate_base().pending()
    }

    /// 取走全部事件并清空缓冲区
    fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.aggregate_base_mut().drain()
    }

    fn has_pending_events(&self) -> bool {
        !self.pending_events().is_empty()
    }
}

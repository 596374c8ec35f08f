//! 实体（Entity）基础抽象
//!
//! 实体以标识区分，标识在首次访问时惰性分配（幂等）。创建时间只设置一次，
//! 修改时间在每次变更时刷新；软删除通过 `deleted_at` 记录。
//! 这些字段只能经由实体自身的初始化路径（`new`/`with_id`/`restore`）写入。
//!
use crate::identity::{EntityId, IdentityService};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 实体公共状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntityId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<DateTime<Utc>>,
}

impl BaseEntity {
    /// 尚未分配标识的新实体
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Self::new()
        }
    }

    /// 从存储重建
    pub fn restore(
        id: EntityId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    /// 返回标识，缺失时通过标识服务分配；重复调用返回同一个值
    pub fn ensure_id(&mut self, ids: &IdentityService) -> &EntityId {
        self.id.get_or_insert_with(|| ids.generate())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// 刷新修改时间
    pub fn touch(&mut self) {
        let now = Utc::now();
        // 时钟回拨时保持单调
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    pub fn mark_deleted(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
            self.touch();
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Default for BaseEntity {
    fn default() -> Self {
        Self::new()
    }
}

/// 具备唯一标识与生命周期时间戳的实体抽象
pub trait Entity: Send + Sync {
    fn base_entity(&self) -> &BaseEntity;

    fn base_entity_mut(&mut self) -> &mut BaseEntity;

    /// 已分配的标识（尚未分配时为 `None`）
    fn id(&self) -> Option<&EntityId> {
        self.base_entity().id()
    }

    fn ensure_id(&mut self, ids: &IdentityService) -> EntityId {
        self.base_entity_mut().ensure_id(ids).clone()
    }

    fn touch(&mut self) {
        self.base_entity_mut().touch();
    }

    /// 标识相同即视为同一实体（未分配标识的实体与任何实体都不相同）
    fn same_identity_as(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdStrategy;
    use chrono::TimeZone;

    struct Customer {
        base: BaseEntity,
    }

    impl Entity for Customer {
        fn base_entity(&self) -> &BaseEntity {
            &self.base
        }

        fn base_entity_mut(&mut self) -> &mut BaseEntity {
            &mut self.base
        }
    }

    #[test]
    fn identity_is_assigned_lazily_and_idempotently() {
        let ids = IdentityService::new(IdStrategy::UuidV4);
        let mut customer = Customer {
            base: BaseEntity::new(),
        };
        assert!(customer.id().is_none());

        let first = customer.ensure_id(&ids);
        let second = customer.ensure_id(&ids);
        assert_eq!(first, second);
        assert_eq!(customer.id(), Some(&first));
    }

    #[test]
    fn supplied_identity_is_kept() {
        let ids = IdentityService::default();
        let mut customer = Customer {
            base: BaseEntity::with_id(EntityId::new("c-1")),
        };
        assert_eq!(customer.ensure_id(&ids).as_str(), "c-1");
    }

    #[test]
    fn touch_and_soft_delete() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut base = BaseEntity::restore(EntityId::new("e-1"), created, created, None);

        base.touch();
        assert_eq!(base.created_at(), created);
        assert!(base.updated_at() > created);

        assert!(!base.is_deleted());
        base.mark_deleted();
        let deleted_at = base.deleted_at().unwrap();
        base.mark_deleted();
        assert_eq!(base.deleted_at(), Some(deleted_at));
        assert!(base.is_deleted());
    }

    #[test]
    fn identity_comparison() {
        let a = Customer {
            base: BaseEntity::with_id(EntityId::new("x")),
        };
        let b = Customer {
            base: BaseEntity::with_id(EntityId::new("x")),
        };
        let anonymous = Customer {
            base: BaseEntity::new(),
        };
        assert!(a.same_identity_as(&b));
        assert!(!a.same_identity_as(&anonymous));
        assert!(!anonymous.same_identity_as(&anonymous));
    }

    #[test]
    fn serde_omits_missing_id_and_deletion() {
        let json = serde_json::to_value(BaseEntity::new()).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("deleted_at").is_none());
        assert!(json.get("created_at").is_some());
    }
}

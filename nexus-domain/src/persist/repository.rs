//! 仓储协议
//!
//! 内核只定义接口，不实现查询执行。所有方法都接收 [`TxContext`]，
//! 实现通过 `ctx.transaction_or(...)` 取得句柄，因此在事务边界内的调用自动加入环境事务。
//!
use crate::aggregate_root::AggregateRoot;
use crate::error::{DomainError, DomainResult};
use crate::identity::EntityId;
use crate::persist::TxContext;
use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_SORT: &str = "created_at";

/// 聚合仓储
#[async_trait]
pub trait Repository<A>: Send + Sync
where
    A: AggregateRoot,
{
    /// 事务句柄类型（与 `TransactionEngine::Tx` 一致）
    type Tx: Send + Sync;

    async fn save(&self, ctx: &TxContext<Self::Tx>, aggregate: &A) -> DomainResult<()>;

    async fn find_by_id(&self, ctx: &TxContext<Self::Tx>, id: &EntityId)
    -> DomainResult<Option<A>>;

    async fn delete(&self, ctx: &TxContext<Self::Tx>, id: &EntityId) -> DomainResult<()>;

    async fn exists(&self, ctx: &TxContext<Self::Tx>, id: &EntityId) -> DomainResult<bool>;
}

#[async_trait]
impl<A, T> Repository<A> for Arc<T>
where
    A: AggregateRoot + Sync + 'static,
    T: Repository<A> + ?Sized,
{
    type Tx = T::Tx;

    async fn save(&self, ctx: &TxContext<Self::Tx>, aggregate: &A) -> DomainResult<()> {
        (**self).save(ctx, aggregate).await
    }

    async fn find_by_id(
        &self,
        ctx: &TxContext<Self::Tx>,
        id: &EntityId,
    ) -> DomainResult<Option<A>> {
        (**self).find_by_id(ctx, id).await
    }

    async fn delete(&self, ctx: &TxContext<Self::Tx>, id: &EntityId) -> DomainResult<()> {
        (**self).delete(ctx, id).await
    }

    async fn exists(&self, ctx: &TxContext<Self::Tx>, id: &EntityId) -> DomainResult<bool> {
        (**self).exists(ctx, id).await
    }
}

/// 读侧仓储（分页、排序、等值过滤）
#[async_trait]
pub trait ReadRepository<T>: Send + Sync
where
    T: Send,
{
    type Tx: Send + Sync;

    async fn find_by_id(&self, ctx: &TxContext<Self::Tx>, id: &EntityId)
    -> DomainResult<Option<T>>;

    async fn find_all(&self, ctx: &TxContext<Self::Tx>, filter: &Filter) -> DomainResult<Vec<T>>;

    /// 满足过滤条件的总数（忽略分页）
    async fn count(&self, ctx: &TxContext<Self::Tx>, filter: &Filter) -> DomainResult<u64>;

    async fn exists(&self, ctx: &TxContext<Self::Tx>, id: &EntityId) -> DomainResult<bool>;
}

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::validation(format!(
                "invalid sort order: {other}"
            ))),
        }
    }
}

/// 通用查询过滤器
///
/// 默认：`limit = 10`、`offset = 0`、按 `created_at` 降序、无等值条件。
///
/// ```
/// use nexus_domain::persist::{Filter, SortOrder};
/// use serde_json::json;
///
/// let filter = Filter::builder()
///     .limit(20)
///     .sort("email")
///     .order(SortOrder::Asc)
///     .build()
///     .where_eq("active", json!(true));
///
/// assert_eq!(filter.offset, 0);
/// assert_eq!(filter.conditions["active"], json!(true));
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct Filter {
    #[builder(default = DEFAULT_LIMIT)]
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[builder(default)]
    #[serde(default)]
    pub offset: usize,
    #[builder(into, default = DEFAULT_SORT.to_string())]
    #[serde(default = "default_sort")]
    pub sort: String,
    #[builder(default)]
    #[serde(default)]
    pub order: SortOrder,
    /// 字段名 -> 期望值
    #[builder(default)]
    #[serde(default, rename = "where")]
    pub conditions: BTreeMap<String, Value>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加等值条件
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.insert(field.into(), value);
        self
    }

    /// 将每页条数限制在 `max` 以内
    pub fn clamp_limit(mut self, max: usize) -> Self {
        self.limit = self.limit.min(max);
        self
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_conventions() {
        let f = Filter::default();
        assert_eq!(f.limit, 10);
        assert_eq!(f.offset, 0);
        assert_eq!(f.sort, "created_at");
        assert_eq!(f.order, SortOrder::Desc);
        assert!(f.conditions.is_empty());
        assert_eq!(Filter::new(), f);
    }

    #[test]
    fn serde_uses_where_key_and_defaults() {
        let f: Filter = serde_json::from_value(json!({"where": {"state": "SP"}})).unwrap();
        assert_eq!(f.limit, DEFAULT_LIMIT);
        assert_eq!(f.sort, DEFAULT_SORT);
        assert_eq!(f.conditions["state"], json!("SP"));

        let json = serde_json::to_value(Filter::default().where_eq("a", json!(1))).unwrap();
        assert_eq!(json["order"], "desc");
        assert_eq!(json["where"]["a"], 1);
    }

    #[test]
    fn sort_order_parsing() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!(" desc ".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn clamp_limit_caps_page_size() {
        let f = Filter::builder().limit(500).build().clamp_limit(100);
        assert_eq!(f.limit, 100);
        assert_eq!(Filter::default().clamp_limit(100).limit, 10);
    }
}

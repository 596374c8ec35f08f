//! 内存持久化引擎
//!
//! 聚合以 JSON 行的形式按（聚合类型，标识）存放在 [`InMemoryStore`] 中。
//! [`MemorySession`] 是引擎的事务句柄：非事务会话直接写入存储；
//! 事务会话先暂存写入（事务内可读到自己的写入），提交时在同一把写锁下一次性应用，
//! 回滚或被丢弃时全部作废。
//!
//! 写入带乐观并发检查：保存时对照聚合的加载版本，提交时在写锁下再次对照暂存时看到的已提交版本。
//!
use crate::aggregate_root::AggregateRoot;
use crate::domain_event::DomainEvent;
use crate::error::{DomainError, DomainResult};
use crate::identity::EntityId;
use crate::persist::{Filter, ReadRepository, Repository, SortOrder, TransactionEngine, TxContext};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

type RowKey = (String, String);

/// 存储中的一行：聚合类型、标识、版本与 JSON 状态
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    aggregate_type: String,
    aggregate_id: String,
    version: usize,
    payload: Value,
    last_event_id: Option<String>,
}

impl StoredRow {
    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn version(&self) -> usize {
        self.version
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 从聚合实例创建（要求聚合已有标识）
    pub fn from_aggregate<A>(aggregate: &A) -> DomainResult<Self>
    where
        A: AggregateRoot + Serialize,
    {
        let id = aggregate.id().ok_or_else(|| {
            DomainError::invalid_state(format!("{} has no identity; assign one before saving", A::TYPE))
        })?;
        Ok(Self {
            aggregate_type: A::TYPE.to_string(),
            aggregate_id: id.to_string(),
            version: aggregate.version().value(),
            payload: serde_json::to_value(aggregate)?,
            last_event_id: aggregate
                .pending_events()
                .last()
                .map(|e| e.event_id().to_string()),
        })
    }

    /// 反序列化为聚合实例
    pub fn to_aggregate<A>(&self) -> DomainResult<A>
    where
        A: AggregateRoot + DeserializeOwned,
    {
        if A::TYPE != self.aggregate_type {
            return Err(DomainError::TypeMismatch {
                expected: A::TYPE.to_string(),
                found: self.aggregate_type.clone(),
            });
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    fn key(&self) -> RowKey {
        (self.aggregate_type.clone(), self.aggregate_id.clone())
    }

    fn is_soft_deleted(&self) -> bool {
        self.payload
            .get("deleted_at")
            .is_some_and(|v| !v.is_null())
    }
}

/// 已提交数据
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: RwLock<BTreeMap<RowKey, StoredRow>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: &RowKey) -> Option<StoredRow> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.get(key).cloned()
    }

    fn rows_of(&self, aggregate_type: &str) -> BTreeMap<RowKey, StoredRow> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.iter()
            .filter(|((ty, _), _)| ty == aggregate_type)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// 在同一把写锁下校验并应用；任一行的已提交版本与 `seen` 不一致则整体放弃
    fn apply(
        &self,
        writes: BTreeMap<RowKey, Staged>,
        seen: &BTreeMap<RowKey, Option<usize>>,
    ) -> DomainResult<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        for (key, seen) in seen {
            let current = rows.get(key).map(|row| row.version);
            match (*seen, current) {
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(DomainError::VersionConflict { expected, actual });
                }
                (None, Some(_)) => {
                    return Err(DomainError::conflict(format!(
                        "{} {} was created concurrently",
                        key.0, key.1
                    )));
                }
                (Some(_), None) => {
                    return Err(DomainError::conflict(format!(
                        "{} {} was deleted concurrently",
                        key.0, key.1
                    )));
                }
                _ => {}
            }
        }
        for (key, write) in writes {
            match write {
                Staged::Put(row) => {
                    rows.insert(key, row);
                }
                Staged::Delete => {
                    rows.remove(&key);
                }
            }
        }
        Ok(())
    }

    /// 已提交的行数
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
enum Staged {
    Put(StoredRow),
    Delete,
}

#[derive(Debug, Default)]
struct Staging {
    writes: BTreeMap<RowKey, Staged>,
    /// 每个键首次暂存时看到的已提交版本
    seen: BTreeMap<RowKey, Option<usize>>,
}

/// 引擎会话（事务句柄）
#[derive(Debug)]
pub struct MemorySession {
    store: Arc<InMemoryStore>,
    staged: Option<Mutex<Staging>>,
}

impl MemorySession {
    /// 直接写入存储的非事务会话
    pub fn autocommit(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            staged: None,
        }
    }

    fn transactional(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            staged: Some(Mutex::new(Staging::default())),
        }
    }

    pub fn is_transactional(&self) -> bool {
        self.staged.is_some()
    }

    /// 事务内暂存的写入数
    pub fn pending_writes(&self) -> usize {
        self.staged
            .as_ref()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).writes.len())
            .unwrap_or(0)
    }

    fn get(&self, key: &RowKey) -> Option<StoredRow> {
        if let Some(staged) = &self.staged {
            let staged = staged.lock().unwrap_or_else(PoisonError::into_inner);
            match staged.writes.get(key) {
                Some(Staged::Put(row)) => return Some(row.clone()),
                Some(Staged::Delete) => return None,
                None => {}
            }
        }
        self.store.get(key)
    }

    fn rows_of(&self, aggregate_type: &str) -> Vec<StoredRow> {
        let mut rows = self.store.rows_of(aggregate_type);
        if let Some(staged) = &self.staged {
            let staged = staged.lock().unwrap_or_else(PoisonError::into_inner);
            for (key, write) in staged
                .writes
                .iter()
                .filter(|((ty, _), _)| ty == aggregate_type)
            {
                match write {
                    Staged::Put(row) => {
                        rows.insert(key.clone(), row.clone());
                    }
                    Staged::Delete => {
                        rows.remove(key);
                    }
                }
            }
        }
        rows.into_values().collect()
    }

    /// `seen` 为调用方经由本会话读到的版本
    fn write(&self, key: RowKey, write: Staged, seen: Option<usize>) -> DomainResult<()> {
        match &self.staged {
            Some(staged) => {
                let mut staged = staged.lock().unwrap_or_else(PoisonError::into_inner);
                staged.seen.entry(key.clone()).or_insert(seen);
                staged.writes.insert(key, write);
                Ok(())
            }
            None => self.store.apply(
                BTreeMap::from([(key.clone(), write)]),
                &BTreeMap::from([(key, seen)]),
            ),
        }
    }

    fn take_staged(&self) -> Staging {
        self.staged
            .as_ref()
            .map(|s| std::mem::take(&mut *s.lock().unwrap_or_else(PoisonError::into_inner)))
            .unwrap_or_default()
    }
}

/// 内存事务引擎
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    store: Arc<InMemoryStore>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl InMemoryEngine {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            commits: AtomicUsize::new(0),
            rollbacks: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    /// 非事务会话（读路径或事务之外的写入）
    pub fn session(&self) -> MemorySession {
        MemorySession::autocommit(self.store.clone())
    }

    pub fn commits(&self) -> usize {
        self.commits.load(AtomicOrdering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl TransactionEngine for InMemoryEngine {
    type Tx = MemorySession;

    async fn begin(&self) -> DomainResult<MemorySession> {
        Ok(MemorySession::transactional(self.store.clone()))
    }

    async fn commit(&self, tx: &MemorySession) -> DomainResult<()> {
        if !tx.is_transactional() {
            return Err(DomainError::transaction(
                "cannot commit an autocommit session",
            ));
        }
        let Staging { writes, seen } = tx.take_staged();
        debug!(writes = writes.len(), "applying staged writes");
        self.store.apply(writes, &seen)?;
        self.commits.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn rollback(&self, tx: &MemorySession) -> DomainResult<()> {
        let discarded = tx.take_staged();
        debug!(writes = discarded.writes.len(), "discarding staged writes");
        self.rollbacks.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}

/// 基于内存引擎的聚合仓储
///
/// 软删除（`deleted_at` 非空）的聚合对读操作不可见；`delete` 为物理删除。
///
/// 保存要求已存储版本等于聚合的加载版本（当前版本减去待发布事件数），
/// 因此从同一版本加载的两个副本只有先保存的一个成功。
/// 同一实例在排空事件之前重复保存仍被接受。
pub struct InMemoryRepository<A> {
    fallback: MemorySession,
    _marker: PhantomData<fn() -> A>,
}

impl<A> InMemoryRepository<A> {
    pub fn new(engine: &InMemoryEngine) -> Self {
        Self {
            fallback: engine.session(),
            _marker: PhantomData,
        }
    }

    fn key(id: &EntityId) -> RowKey
    where
        A: AggregateRoot,
    {
        (A::TYPE.to_string(), id.to_string())
    }

    fn visible_row(&self, ctx: &TxContext<MemorySession>, id: &EntityId) -> Option<StoredRow>
    where
        A: AggregateRoot,
    {
        ctx.transaction_or(&self.fallback)
            .get(&Self::key(id))
            .filter(|row| !row.is_soft_deleted())
    }

    fn matching_rows(&self, ctx: &TxContext<MemorySession>, filter: &Filter) -> Vec<StoredRow>
    where
        A: AggregateRoot,
    {
        ctx.transaction_or(&self.fallback)
            .rows_of(A::TYPE)
            .into_iter()
            .filter(|row| !row.is_soft_deleted())
            .filter(|row| {
                filter
                    .conditions
                    .iter()
                    .all(|(field, expected)| row.payload.get(field) == Some(expected))
            })
            .collect()
    }
}

#[async_trait]
impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Serialize + DeserializeOwned + 'static,
{
    type Tx = MemorySession;

    async fn save(&self, ctx: &TxContext<MemorySession>, aggregate: &A) -> DomainResult<()> {
        let row = StoredRow::from_aggregate(aggregate)?;
        let session = ctx.transaction_or(&self.fallback);

        let existing = session.get(&row.key());
        if let Some(existing) = &existing {
            check_version(existing, &row, aggregate.pending_events())?;
        }

        let key = row.key();
        session.write(key, Staged::Put(row), existing.map(|r| r.version))
    }

    async fn find_by_id(
        &self,
        ctx: &TxContext<MemorySession>,
        id: &EntityId,
    ) -> DomainResult<Option<A>> {
        self.visible_row(ctx, id)
            .map(|row| row.to_aggregate())
            .transpose()
    }

    async fn delete(&self, ctx: &TxContext<MemorySession>, id: &EntityId) -> DomainResult<()> {
        let session = ctx.transaction_or(&self.fallback);
        let key = Self::key(id);
        let Some(existing) = session.get(&key) else {
            return Err(DomainError::not_found(format!("{} {id}", A::TYPE)));
        };
        session.write(key, Staged::Delete, Some(existing.version))
    }

    async fn exists(&self, ctx: &TxContext<MemorySession>, id: &EntityId) -> DomainResult<bool> {
        Ok(self.visible_row(ctx, id).is_some())
    }
}

#[async_trait]
impl<A> ReadRepository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Serialize + DeserializeOwned + 'static,
{
    type Tx = MemorySession;

    async fn find_by_id(
        &self,
        ctx: &TxContext<MemorySession>,
        id: &EntityId,
    ) -> DomainResult<Option<A>> {
        Repository::find_by_id(self, ctx, id).await
    }

    async fn find_all(&self, ctx: &TxContext<MemorySession>, filter: &Filter) -> DomainResult<Vec<A>> {
        let mut rows = self.matching_rows(ctx, filter);

        rows.sort_by(|a, b| {
            let ord = compare_json(a.payload.get(&filter.sort), b.payload.get(&filter.sort))
                .then_with(|| a.aggregate_id.cmp(&b.aggregate_id));
            match filter.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        rows.into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .map(|row| row.to_aggregate())
            .collect()
    }

    async fn count(&self, ctx: &TxContext<MemorySession>, filter: &Filter) -> DomainResult<u64> {
        Ok(self.matching_rows(ctx, filter).len() as u64)
    }

    async fn exists(&self, ctx: &TxContext<MemorySession>, id: &EntityId) -> DomainResult<bool> {
        Repository::exists(self, ctx, id).await
    }
}

fn check_version(
    existing: &StoredRow,
    incoming: &StoredRow,
    pending: &[DomainEvent],
) -> DomainResult<()> {
    let loaded = incoming.version.saturating_sub(pending.len());
    if existing.version == loaded {
        return Ok(());
    }

    // 已存储行是本实例先前的保存：其最后事件仍在本实例的缓冲区中
    if existing.version > loaded
        && existing.version <= incoming.version
        && let Some(last) = &existing.last_event_id
        && pending
            .get(existing.version - loaded - 1)
            .is_some_and(|e| e.event_id().as_str() == last)
    {
        return Ok(());
    }

    Err(DomainError::VersionConflict {
        expected: loaded,
        actual: existing.version,
    })
}

/// JSON 值排序：缺失/null 最小；同为时间戳字符串时按时间比较
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

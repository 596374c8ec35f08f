//! 用例与事件分发
//!
//! [`AggregatePersister`] 串起一次写用例的尾部：在事务边界内保存聚合，
//! 提交成功后才排空事件缓冲区并交给 [`EventDispatcher`]。
//! 失败（包括提交失败）时事件留在缓冲区，不会被分发。
//!
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use dashmap::DashMap;
use nexus_domain::aggregate_root::AggregateRoot;
use nexus_domain::domain_event::DomainEvent;
use nexus_domain::persist::{Repository, TransactionEngine, TransactionManager, TxContext};
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

/// 应用用例
#[async_trait]
pub trait UseCase: Send + Sync {
    type Input: Send;
    type Output: Send;

    async fn execute(&self, ctx: &AppContext, input: Self::Input) -> AppResult<Self::Output>;
}

/// 领域事件处理器
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, ctx: &AppContext, event: &DomainEvent) -> AppResult<()>;
}

/// 事件分发器
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// 按顺序分发一批已提交的事件
    async fn dispatch(&self, ctx: &AppContext, events: Vec<DomainEvent>) -> AppResult<()>;
}

#[async_trait]
impl<T> EventDispatcher for Arc<T>
where
    T: EventDispatcher + ?Sized,
{
    async fn dispatch(&self, ctx: &AppContext, events: Vec<DomainEvent>) -> AppResult<()> {
        (**self).dispatch(ctx, events).await
    }
}

const ANY_EVENT: &str = "*";

/// 基于内存的事件分发器
/// - 以事件类型标签注册处理器，`subscribe_all` 订阅全部事件
/// - 同一事件的处理器按注册顺序串行执行；单个处理器失败不影响其余处理器
pub struct InMemoryEventDispatcher {
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl Default for InMemoryEventDispatcher {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers.entry(event_type.into()).or_default().push(handler);
    }

    pub fn subscribe_all(&self, handler: Arc<dyn EventHandler>) {
        self.subscribe(ANY_EVENT, handler);
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map(|h| h.len()).unwrap_or(0)
    }

    // 先复制出处理器列表，避免跨 await 持有分片锁
    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        [event_type, ANY_EVENT]
            .iter()
            .filter_map(|key| self.handlers.get(*key).map(|h| h.clone()))
            .flatten()
            .collect()
    }
}

#[async_trait]
impl EventDispatcher for InMemoryEventDispatcher {
    async fn dispatch(&self, ctx: &AppContext, events: Vec<DomainEvent>) -> AppResult<()> {
        let mut failures = Vec::new();

        for event in &events {
            let handlers = self.handlers_for(event.event_type());
            if handlers.is_empty() {
                debug!(event_type = event.event_type(), "no handler subscribed");
            }
            for handler in handlers {
                if let Err(err) = handler.handle(ctx, event).await {
                    warn!(
                        handler = handler.name(),
                        event_id = %event.event_id(),
                        error = %err,
                        "event handler failed"
                    );
                    failures.push(format!("{}: {err}", handler.name()));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Infra(format!(
                "{} event handler(s) failed: {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }
}

/// 聚合持久化 + 提交后分发
pub struct AggregatePersister<E, R> {
    tm: TransactionManager<E>,
    repo: R,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl<E, R> AggregatePersister<E, R>
where
    E: TransactionEngine,
{
    pub fn new(tm: TransactionManager<E>, repo: R, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            tm,
            repo,
            dispatcher,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 保存聚合；由本次调用开启的事务提交后排空并分发事件
    ///
    /// 若 `tx` 已携带外层事务，保存加入该事务，事件留在缓冲区，
    /// 由外层在提交后调用 [`AggregatePersister::dispatch_pending`]。
    pub async fn persist<A>(
        &self,
        ctx: &AppContext,
        tx: &TxContext<E::Tx>,
        aggregate: &mut A,
    ) -> AppResult<()>
    where
        A: AggregateRoot + 'static,
        R: Repository<A, Tx = E::Tx>,
    {
        let span = ctx.span("persist_aggregate");
        async {
            let snapshot: &A = aggregate;
            self.tm
                .with_transaction(tx, |child| async move {
                    self.repo.save(&child, snapshot).await.map_err(AppError::from)
                })
                .await?;

            if tx.is_active() {
                debug!(
                    aggregate_type = A::TYPE,
                    "saved inside ambient transaction, dispatch deferred"
                );
                return Ok(());
            }

            self.dispatch_pending(ctx, aggregate).await
        }
        .instrument(span)
        .await
    }

    /// 排空聚合的事件缓冲区并分发
    pub async fn dispatch_pending<A>(&self, ctx: &AppContext, aggregate: &mut A) -> AppResult<()>
    where
        A: AggregateRoot,
    {
        let events = aggregate.drain_events();
        if events.is_empty() {
            return Ok(());
        }
        info!(
            aggregate_type = A::TYPE,
            aggregate_id = ?aggregate.id(),
            events = events.len(),
            "dispatching committed events"
        );
        self.dispatcher.dispatch(ctx, events).await
    }
}

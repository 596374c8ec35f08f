//! 事务边界（Transactional Boundary）
//!
//! 环境事务通过显式传递的 [`TxContext`] 携带，而不是全局状态：
//! - 上下文已携带事务时，内层调用直接复用（不开启新事务，也不提交/回滚，由外层决定）；
//! - 否则由 [`TransactionManager::with_transaction`] 开启事务，把携带句柄的子上下文交给操作，
//!   成功则提交，失败则回滚并原样返回操作的错误；
//! - 提交失败会尝试回滚，并以 `DomainError::Transaction` 返回；提交时发现的并发冲突原样返回。
//!
//! 每次调用内部维护一个单次使用的状态机 `Idle → Active → Committed | RolledBack`，
//! 非法迁移会被拒绝；仍处于 `Active` 时被丢弃（例如 future 被取消）视为回滚，
//! 引擎不会收到提交。
//!
use crate::error::{DomainError, DomainResult};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 持久化引擎的事务能力
///
/// 边界被取消（future 在提交前被丢弃）时不会调用 [`rollback`](Self::rollback)：
/// 异步回滚无法在 `Drop` 中执行。持有连接等资源的引擎须让 `Tx` 自身的 `Drop`
/// 完成回滚；内存引擎的暂存写入随句柄一起丢弃。
#[async_trait]
pub trait TransactionEngine: Send + Sync {
    /// 事务句柄
    type Tx: Send + Sync + 'static;

    async fn begin(&self) -> DomainResult<Self::Tx>;

    async fn commit(&self, tx: &Self::Tx) -> DomainResult<()>;

    async fn rollback(&self, tx: &Self::Tx) -> DomainResult<()>;
}

#[async_trait]
impl<T> TransactionEngine for Arc<T>
where
    T: TransactionEngine + ?Sized,
{
    type Tx = T::Tx;

    async fn begin(&self) -> DomainResult<Self::Tx> {
        (**self).begin().await
    }

    async fn commit(&self, tx: &Self::Tx) -> DomainResult<()> {
        (**self).commit(tx).await
    }

    async fn rollback(&self, tx: &Self::Tx) -> DomainResult<()> {
        (**self).rollback(tx).await
    }
}

/// 调用链上下文，至多携带一个进行中的事务句柄
pub struct TxContext<H> {
    tx: Option<Arc<H>>,
}

impl<H> TxContext<H> {
    /// 不携带事务的根上下文
    pub fn none() -> Self {
        Self { tx: None }
    }

    pub fn with_transaction(tx: Arc<H>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    pub fn transaction(&self) -> Option<&H> {
        self.tx.as_deref()
    }

    /// 携带的事务句柄，没有则使用调用方提供的非事务句柄
    pub fn transaction_or<'a>(&'a self, fallback: &'a H) -> &'a H {
        self.tx.as_deref().unwrap_or(fallback)
    }
}

impl<H> Clone for TxContext<H> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<H> Default for TxContext<H> {
    fn default() -> Self {
        Self::none()
    }
}

impl<H> fmt::Debug for TxContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxContext")
            .field("active", &self.is_active())
            .finish()
    }
}

/// 单次事务的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Idle,
    Active,
    Committed,
    RolledBack,
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }

    /// 校验并执行状态迁移
    pub fn transition(self, to: TxState) -> DomainResult<TxState> {
        match (self, to) {
            (Self::Idle, Self::Active)
            | (Self::Active, Self::Committed)
            | (Self::Active, Self::RolledBack) => Ok(to),
            (from, to) => Err(DomainError::transaction(format!(
                "illegal transaction state transition: {from:?} -> {to:?}"
            ))),
        }
    }
}

struct UnitOfWork {
    state: TxState,
}

impl UnitOfWork {
    fn new() -> Self {
        Self {
            state: TxState::Idle,
        }
    }

    fn advance(&mut self, to: TxState) -> DomainResult<()> {
        self.state = self.state.transition(to)?;
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state == TxState::Active {
            warn!("unit of work dropped while active, treating as rolled back");
        }
    }
}

/// 事务管理器
pub struct TransactionManager<E> {
    engine: Arc<E>,
}

impl<E> Clone for TransactionManager<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<E> TransactionManager<E>
where
    E: TransactionEngine,
{
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// 在事务边界内执行操作
    ///
    /// 操作收到的子上下文携带事务句柄，仓储调用经由它自动加入同一事务。
    pub async fn with_transaction<T, Err, F, Fut>(
        &self,
        ctx: &TxContext<E::Tx>,
        operation: F,
    ) -> Result<T, Err>
    where
        F: FnOnce(TxContext<E::Tx>) -> Fut + Send,
        Fut: Future<Output = Result<T, Err>> + Send,
        Err: From<DomainError>,
    {
        if ctx.is_active() {
            debug!("reusing ambient transaction");
            return operation(ctx.clone()).await;
        }

        let mut uow = UnitOfWork::new();
        let tx = Arc::new(self.engine.begin().await?);
        uow.advance(TxState::Active)?;
        debug!("transaction started");

        let result = operation(TxContext::with_transaction(tx.clone())).await;

        match result {
            Ok(value) => match self.engine.commit(&tx).await {
                Ok(()) => {
                    uow.advance(TxState::Committed)?;
                    debug!("transaction committed");
                    Ok(value)
                }
                Err(err) => {
                    warn!(error = %err, "commit failed, rolling back");
                    if let Err(rollback_err) = self.engine.rollback(&tx).await {
                        error!(error = %rollback_err, "rollback after failed commit failed");
                    }
                    uow.advance(TxState::RolledBack)?;
                    let err = match err {
                        DomainError::VersionConflict { .. } | DomainError::Conflict { .. } => err,
                        other => DomainError::transaction(format!("commit failed: {other}")),
                    };
                    Err(err.into())
                }
            },
            Err(err) => {
                if let Err(rollback_err) = self.engine.rollback(&tx).await {
                    error!(error = %rollback_err, "rollback failed");
                }
                uow.advance(TxState::RolledBack)?;
                debug!("transaction rolled back");
                Err(err)
            }
        }
    }
}

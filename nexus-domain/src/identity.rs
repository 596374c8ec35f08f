//! 标识生成（Identity）
//!
//! 实体与领域事件的新标识统一来自显式构造并注入的 [`IdentityService`]。
//! 底层生成器在首次使用时初始化且仅初始化一次（并发调用方观察到同一个实例），
//! 之后的生成不会失败，也不会产生重复值。
//!
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, warn};
use ulid::Ulid;
use uuid::Uuid;

/// 实体/事件标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 标识生成策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    UuidV4,
    /// 时间有序的 UUID
    #[default]
    UuidV7,
    /// 单调递增的 ULID
    Ulid,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UuidV4 => "uuid_v4",
            Self::UuidV7 => "uuid_v7",
            Self::Ulid => "ulid",
        };
        f.write_str(s)
    }
}

/// 底层标识生成器
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// 同一毫秒内随机部分溢出时，退化为“时间戳 + 进程内计数器”
struct UlidGenerator {
    inner: Mutex<ulid::Generator>,
    fallback: AtomicU64,
}

impl UlidGenerator {
    fn new() -> Self {
        Self {
            inner: Mutex::new(ulid::Generator::new()),
            fallback: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate(&self) -> String {
        let mut generator = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match generator.generate() {
            Ok(id) => id.to_string(),
            Err(err) => {
                let counter = self.fallback.fetch_add(1, Ordering::Relaxed);
                let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
                warn!(error = %err, counter, "ulid generator overflow, using counter fallback");
                Ulid::from_parts(millis, u128::from(counter)).to_string()
            }
        }
    }
}

/// 标识生成服务
///
/// ```
/// use nexus_domain::identity::{IdStrategy, IdentityService};
///
/// let ids = IdentityService::new(IdStrategy::Ulid);
/// let a = ids.generate();
/// let b = ids.generate();
/// assert_ne!(a, b);
/// assert!(a < b);
/// ```
pub struct IdentityService {
    strategy: IdStrategy,
    generator: OnceLock<Box<dyn IdGenerator>>,
}

impl IdentityService {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            generator: OnceLock::new(),
        }
    }

    /// 使用自定义生成器（测试或外部 ID 服务）
    pub fn with_generator(generator: impl IdGenerator + 'static) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Box::new(generator) as Box<dyn IdGenerator>);
        Self {
            strategy: IdStrategy::default(),
            generator: cell,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub fn generate(&self) -> EntityId {
        EntityId(self.generator().generate())
    }

    fn generator(&self) -> &dyn IdGenerator {
        self.generator
            .get_or_init(|| {
                debug!(strategy = %self.strategy, "initializing identity generator");
                let generator: Box<dyn IdGenerator> = match self.strategy {
                    IdStrategy::UuidV4 => Box::new(UuidV4Generator),
                    IdStrategy::UuidV7 => Box::new(UuidV7Generator),
                    IdStrategy::Ulid => Box::new(UlidGenerator::new()),
                };
                generator
            })
            .as_ref()
    }
}

impl Default for IdentityService {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService")
            .field("strategy", &self.strategy)
            .field("initialized", &self.generator.get().is_some())
            .finish()
    }
}

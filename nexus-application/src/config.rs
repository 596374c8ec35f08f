//! 内核配置
//!
//! 加载顺序：可选的 TOML 文件，其上叠加前缀为 `NEXUS` 的环境变量，
//! 嵌套字段以 `__` 分隔，例如 `NEXUS_PAGINATION__DEFAULT_LIMIT=25`、
//! `NEXUS_IDENTITY__STRATEGY=ulid`。
//!
use crate::error::{AppError, AppResult};
use bon::Builder;
use ::config::{Config, Environment, File, FileFormat};
use nexus_domain::identity::{IdStrategy, IdentityService};
use nexus_domain::persist::{DEFAULT_LIMIT, DEFAULT_SORT, Filter, SortOrder};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "NEXUS";

const DEFAULT_MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Default, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    #[builder(default)]
    pub strategy: IdStrategy,
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    #[builder(default = DEFAULT_LIMIT)]
    pub default_limit: usize,
    #[builder(default = DEFAULT_MAX_LIMIT)]
    pub max_limit: usize,
    #[builder(into, default = DEFAULT_SORT.to_string())]
    pub default_sort: String,
    #[builder(default)]
    pub default_order: SortOrder,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 内核配置
#[derive(Debug, Clone, PartialEq, Default, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    #[builder(default)]
    pub identity: IdentityConfig,
    #[builder(default)]
    pub pagination: PaginationConfig,
}

/// 默认的环境变量来源
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl KernelConfig {
    /// 从可选文件与进程环境变量加载
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        Self::load_with(path, environment())
    }

    /// 从可选文件与给定的环境变量来源加载
    pub fn load_with(path: Option<&Path>, env: Environment) -> AppResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let cfg: Self = builder.add_source(env).build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(toml: &str) -> AppResult<Self> {
        let cfg: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        let p = &self.pagination;
        if p.default_limit == 0 || p.max_limit == 0 {
            return Err(AppError::Config(
                "pagination limits must be greater than 0".to_string(),
            ));
        }
        if p.default_limit > p.max_limit {
            return Err(AppError::Config(format!(
                "pagination.default_limit ({}) exceeds pagination.max_limit ({})",
                p.default_limit, p.max_limit
            )));
        }
        if p.default_sort.trim().is_empty() {
            return Err(AppError::Config(
                "pagination.default_sort must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn identity_service(&self) -> IdentityService {
        IdentityService::new(self.identity.strategy)
    }

    /// 按配置默认值构造的过滤器
    pub fn filter(&self) -> Filter {
        let p = &self.pagination;
        Filter::builder()
            .limit(p.default_limit)
            .sort(p.default_sort.clone())
            .order(p.default_order)
            .build()
    }

    /// 将调用方给出的过滤器限制在 `max_limit` 以内
    pub fn clamp(&self, filter: Filter) -> Filter {
        filter.clamp_limit(self.pagination.max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let cfg = KernelConfig::load_with(None, env(&[])).unwrap();
        assert_eq!(cfg, KernelConfig::default());
        assert_eq!(cfg.identity.strategy, IdStrategy::UuidV7);
        assert_eq!(cfg.pagination.default_limit, 10);
        assert_eq!(cfg.pagination.max_limit, 100);
        assert_eq!(cfg.filter(), Filter::default());
    }

    #[test]
    fn toml_document_overrides_defaults() {
        let cfg = KernelConfig::from_toml_str(
            r#"
            [identity]
            strategy = "ulid"

            [pagination]
            default_limit = 20
            default_order = "asc"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.identity.strategy, IdStrategy::Ulid);
        assert_eq!(cfg.pagination.default_limit, 20);
        assert_eq!(cfg.pagination.max_limit, 100);
        assert_eq!(cfg.filter().order, SortOrder::Asc);
        assert_eq!(cfg.identity_service().strategy(), IdStrategy::Ulid);
    }

    #[test]
    fn environment_variables_use_double_underscore_nesting() {
        let cfg = KernelConfig::load_with(
            None,
            env(&[
                ("NEXUS_PAGINATION__DEFAULT_LIMIT", "25"),
                ("NEXUS_IDENTITY__STRATEGY", "uuid_v4"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.pagination.default_limit, 25);
        assert_eq!(cfg.identity.strategy, IdStrategy::UuidV4);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let err = KernelConfig::from_toml_str("[pagination]\ndefault_limit = 0").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = KernelConfig::from_toml_str("[pagination]\ndefault_limit = 500").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("max_limit")));

        let err = KernelConfig::from_toml_str("[identity]\nstrategy = \"snowflake\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn clamp_caps_requested_page_size() {
        let cfg = KernelConfig::builder()
            .pagination(PaginationConfig::builder().max_limit(50).build())
            .build();
        let f = cfg.clamp(Filter::builder().limit(1_000).build());
        assert_eq!(f.limit, 50);
    }
}

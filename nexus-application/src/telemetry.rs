//! Tracing/logging 初始化

use tracing_subscriber::EnvFilter;

/// 安装全局 tracing subscriber（JSON 输出，`RUST_LOG` 控制过滤，默认 `info`）
///
/// 可重复调用，后续调用不生效。
pub fn init() {
    init_with_default("info");
}

/// 同 [`init`]，`RUST_LOG` 未设置时使用给定的默认过滤指令
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

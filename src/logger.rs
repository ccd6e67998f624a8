//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置时默认 info，`verbose` 为 true 时为 debug。

use tracing_subscriber::EnvFilter;

/// 初始化全局日志（重复调用无副作用）
///
/// # 参数
/// - `verbose`: 对应 `Config::verbose_logging`
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_follows_verbose_flag() {
        assert_eq!(default_level(true), "debug");
        assert_eq!(default_level(false), "info");

        // 重复初始化不会 panic
        init(true);
        init(false);
    }
}

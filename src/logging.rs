// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use std::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量（取值 json 时输出 JSON 行）
pub const LOG_FORMAT_ENV: &str = "KINERJA_ETL_LOG_FORMAT";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=kinerja_etl=trace
/// - KINERJA_ETL_LOG_FORMAT: json 时输出结构化 JSON
///
/// 日志写到 stderr，stdout 留给命令输出
///
/// # 返回
/// - Err: 全局 subscriber 已被设置
///
/// # 示例
/// ```no_run
/// use kinerja_etl::logging;
/// logging::init().expect("日志系统初始化失败");
/// ```
pub fn init() -> Result<(), Box<dyn Error + Send + Sync>> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, warning) = filter_from(rust_log.as_deref());
    if let Some(warning) = warning {
        eprintln!("warning: {}", warning);
    }

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// 解析 RUST_LOG
///
/// 未设置时为 info；无法解析时退回 info 并返回告警文本
fn filter_from(spec: Option<&str>) -> (EnvFilter, Option<String>) {
    match spec.map(str::trim).filter(|s| !s.is_empty()) {
        None => (EnvFilter::new("info"), None),
        Some(spec) => match EnvFilter::try_new(spec) {
            Ok(filter) => (filter, None),
            Err(e) => (
                EnvFilter::new("info"),
                Some(format!("RUST_LOG={} 无法解析 ({})，改用 info", spec, e)),
            ),
        },
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_info() {
        let (_, warning) = filter_from(None);
        assert!(warning.is_none());

        let (_, warning) = filter_from(Some("  "));
        assert!(warning.is_none());
    }

    #[test]
    fn test_filter_accepts_valid_directive() {
        let (_, warning) = filter_from(Some("kinerja_etl=debug,info"));
        assert!(warning.is_none());
    }

    #[test]
    fn test_filter_reports_invalid_directive() {
        let (_, warning) = filter_from(Some("kinerja_etl=loud"));
        assert!(warning.unwrap().contains("kinerja_etl=loud"));
    }

    #[test]
    fn test_second_init_reports_error() {
        init_test();
        assert!(init().is_err());
    }
}

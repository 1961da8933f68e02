// ==========================================
// KC/KCP 绩效报表 ETL - 配置管理器
// ==========================================
// 职责: 配置加载、环境变量覆写、校验
// 优先级: 默认值 < 配置文件 < 环境变量 < 命令行
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::pipeline_config::{DeliveryMode, PipelineConfig, PERIODE_FORMAT};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置
    ///
    /// # 参数
    /// - path: JSON 配置文件路径（None 时仅使用默认值）
    ///
    /// # 返回
    /// - Ok(PipelineConfig): 已合并环境变量并通过校验的配置
    /// - Err: 读取/解析/校验失败
    pub fn load(path: Option<&Path>) -> ConfigResult<PipelineConfig> {
        let mut config = match path {
            Some(p) => Self::read_file(p)?,
            None => PipelineConfig::default(),
        };

        Self::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;

        info!(
            periode = %config.periode,
            source_dir = %config.source.dir.display(),
            output_path = %config.output_path.display(),
            "配置加载完成"
        );
        Ok(config)
    }

    /// 读取 JSON 配置文件（缺省字段取默认值）
    pub fn read_file(path: &Path) -> ConfigResult<PipelineConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 应用覆写项
    ///
    /// # 参数
    /// - lookup: 按 key 取值（生产环境为环境变量）
    pub fn apply_overrides<F>(config: &mut PipelineConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(config_keys::PERIODE) {
            debug!(key = config_keys::PERIODE, value = %v, "覆写配置");
            config.periode = v;
        }
        if let Some(v) = get(config_keys::SOURCE_DIR) {
            config.source.dir = PathBuf::from(v);
        }
        if let Some(v) = get(config_keys::KC_WORKBOOK) {
            config.source.kc_workbook = v;
        }
        if let Some(v) = get(config_keys::KCP_WORKBOOK) {
            config.source.kcp_workbook = v;
        }
        if let Some(v) = get(config_keys::OUTPUT_PATH) {
            config.output_path = PathBuf::from(v);
        }
        if let Some(v) = get(config_keys::HANDOFF_DB_PATH) {
            config.handoff_db_path = PathBuf::from(v);
        }
        if let Some(v) = get(config_keys::DELIVERY_RECIPIENT) {
            config.delivery.recipient = v;
        }
        if let Some(v) = get(config_keys::DELIVERY_MODE) {
            config.delivery.mode = match v.to_lowercase().as_str() {
                "outbox" => DeliveryMode::Outbox,
                "log" => DeliveryMode::Log,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: config_keys::DELIVERY_MODE.to_string(),
                        value: v,
                        message: "仅支持 outbox / log".to_string(),
                    })
                }
            };
        }
        if let Some(v) = get(config_keys::MAX_WORKSHEETS) {
            config.source.max_worksheets =
                v.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                    key: config_keys::MAX_WORKSHEETS.to_string(),
                    value: v.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// 校验配置
    pub fn validate(config: &PipelineConfig) -> ConfigResult<()> {
        NaiveDate::parse_from_str(&config.periode, PERIODE_FORMAT).map_err(|e| {
            ConfigError::InvalidValue {
                key: "periode".to_string(),
                value: config.periode.clone(),
                message: format!("期望 DD/MM/YYYY: {}", e),
            }
        })?;

        config.layout.validate()?;

        if config.source.kc_workbook.trim().is_empty() || config.source.kcp_workbook.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "source".to_string(),
                value: String::new(),
                message: "工作簿名不能为空".to_string(),
            });
        }

        if config.effective_unit_map().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "unit_map".to_string(),
                value: "[]".to_string(),
                message: "单元映射表不能为空".to_string(),
            });
        }

        Ok(())
    }
}

// ==========================================
// 配置键常量（环境变量名）
// ==========================================
pub mod config_keys {
    pub const CONFIG_PATH: &str = "KINERJA_ETL_CONFIG";
    pub const PERIODE: &str = "KINERJA_ETL_PERIODE";
    pub const SOURCE_DIR: &str = "KINERJA_ETL_SOURCE_DIR";
    pub const KC_WORKBOOK: &str = "KINERJA_ETL_KC_WORKBOOK";
    pub const KCP_WORKBOOK: &str = "KINERJA_ETL_KCP_WORKBOOK";
    pub const MAX_WORKSHEETS: &str = "KINERJA_ETL_MAX_WORKSHEETS";
    pub const OUTPUT_PATH: &str = "KINERJA_ETL_OUTPUT_PATH";
    pub const HANDOFF_DB_PATH: &str = "KINERJA_ETL_HANDOFF_DB";
    pub const DELIVERY_MODE: &str = "KINERJA_ETL_DELIVERY_MODE";
    pub const DELIVERY_RECIPIENT: &str = "KINERJA_ETL_RECIPIENT";
}

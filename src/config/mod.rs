// ==========================================
// KC/KCP 绩效报表 ETL - 配置层
// ==========================================
// 职责: 报表模板偏移、工作簿名、报告期、路径等配置
// 来源: 默认值 / JSON 配置文件 / 环境变量 / 命令行
// ==========================================

pub mod config_manager;
pub mod error;
pub mod pipeline_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use pipeline_config::{
    default_data_dir, DeliveryConfig, DeliveryMode, PipelineConfig, SourceConfig, TemplateLayout,
    DEFAULT_PERIODE, PERIODE_FORMAT,
};

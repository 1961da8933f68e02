// ==========================================
// KC/KCP 绩效报表 ETL - 流水线错误类型
// ==========================================
// 运行级错误：任一出现即本次运行失败，不做内部重试
// ==========================================

use crate::config::ConfigError;
use crate::delivery::DeliveryError;
use crate::export::ExportError;
use crate::repository::RepositoryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("上游阶段无数据: {}", missing.join(", "))]
    MissingUpstreamData { missing: Vec<String> },

    #[error("输出文件写入失败 ({path}): {message}")]
    WriteFailure { path: PathBuf, message: String },

    #[error("阶段交接失败: {0}")]
    Handoff(#[from] RepositoryError),

    #[error("分发失败: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("未知阶段: {0}（可选: extract-kc / extract-kcp / combine / deliver）")]
    UnknownStage(String),
}

impl From<ExportError> for PipelineError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::WriteFailure { path, message } => {
                PipelineError::WriteFailure { path, message }
            }
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

// ==========================================
// KC/KCP 绩效报表 ETL - 分发层错误类型
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("附件不存在: {path}")]
    AttachmentMissing { path: PathBuf },

    #[error("发件箱写入失败 ({path}): {message}")]
    OutboxWriteError { path: PathBuf, message: String },

    #[error("信封序列化失败: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        DeliveryError::SerializationError(err.to_string())
    }
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;

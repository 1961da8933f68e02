// ==========================================
// KC/KCP 绩效报表 ETL - 分发层
// ==========================================
// 职责: 将合并结果作为附件交给外部分发通道
// 实现: 发件箱目录（外部邮件程序读取）/ 仅日志
// ==========================================

pub mod error;
pub mod log_delivery;
pub mod outbox;

pub use error::{DeliveryError, DeliveryResult};
pub use log_delivery::LogDelivery;
pub use outbox::OutboxDelivery;

use crate::config::{DeliveryConfig, DeliveryMode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// 分发请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub recipient: String,
    pub subject: String,
    pub body: String, // HTML 正文
    pub attachments: Vec<PathBuf>,
}

impl DeliveryRequest {
    /// 按配置的收件人/主题/正文生成请求
    pub fn from_config(config: &DeliveryConfig, attachments: Vec<PathBuf>) -> Self {
        Self {
            recipient: config.recipient.clone(),
            subject: config.subject.clone(),
            body: config.body.clone(),
            attachments,
        }
    }
}

/// 分发回执
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
    pub recipient: String,
    pub delivered_at: DateTime<Utc>,
    /// 发件箱条目目录（LogDelivery 为 None）
    pub location: Option<PathBuf>,
}

// ==========================================
// DeliveryService Trait
// ==========================================
// 用途: 合并结果的分发
// 实现者: OutboxDelivery、LogDelivery
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// 分发一次
    ///
    /// # 返回
    /// - Err(AttachmentMissing): 附件文件不存在
    async fn deliver(&self, request: &DeliveryRequest) -> DeliveryResult<DeliveryReceipt>;
}

/// 按配置构造分发服务
pub fn build_delivery(config: &DeliveryConfig) -> Arc<dyn DeliveryService> {
    match config.mode {
        DeliveryMode::Outbox => Arc::new(OutboxDelivery::new(config.outbox_dir.clone())),
        DeliveryMode::Log => Arc::new(LogDelivery::new()),
    }
}

/// 附件存在性检查（所有实现共用）
pub(crate) fn ensure_attachments(request: &DeliveryRequest) -> DeliveryResult<()> {
    for path in &request.attachments {
        if !path.is_file() {
            return Err(DeliveryError::AttachmentMissing { path: path.clone() });
        }
    }
    Ok(())
}

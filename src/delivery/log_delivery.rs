use crate::delivery::{
    ensure_attachments, DeliveryReceipt, DeliveryRequest, DeliveryResult, DeliveryService,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// 仅记录日志的分发（本地调试 / 不需要发送时）
#[derive(Debug, Default)]
pub struct LogDelivery;

impl LogDelivery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeliveryService for LogDelivery {
    async fn deliver(&self, request: &DeliveryRequest) -> DeliveryResult<DeliveryReceipt> {
        ensure_attachments(request)?;

        let delivery_id = Uuid::new_v4().to_string();
        info!(
            delivery_id = %delivery_id,
            recipient = %request.recipient,
            subject = %request.subject,
            attachments = request.attachments.len(),
            "分发请求（仅日志）"
        );
        Ok(DeliveryReceipt {
            delivery_id,
            recipient: request.recipient.clone(),
            delivered_at: Utc::now(),
            location: None,
        })
    }
}

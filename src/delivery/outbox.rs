// ==========================================
// KC/KCP 绩效报表 ETL - 发件箱分发
// ==========================================
// 条目布局: <outbox_dir>/<时间戳>_<id>/
//   - 附件副本
//   - envelope.json（收件人、主题、正文、附件文件名）
// 外部邮件程序扫描发件箱并发送
// ==========================================

use crate::delivery::{
    ensure_attachments, DeliveryError, DeliveryReceipt, DeliveryRequest, DeliveryResult,
    DeliveryService,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const ENVELOPE_FILE: &str = "envelope.json";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    delivery_id: &'a str,
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
    attachments: Vec<String>,
    created_at: String,
}

pub struct OutboxDelivery {
    outbox_dir: PathBuf,
}

impl OutboxDelivery {
    pub fn new(outbox_dir: PathBuf) -> Self {
        Self { outbox_dir }
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }
}

fn io_error(path: &Path, err: std::io::Error) -> DeliveryError {
    DeliveryError::OutboxWriteError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[async_trait]
impl DeliveryService for OutboxDelivery {
    async fn deliver(&self, request: &DeliveryRequest) -> DeliveryResult<DeliveryReceipt> {
        ensure_attachments(request)?;

        let now = Utc::now();
        let delivery_id = Uuid::new_v4().to_string();
        let entry_dir = self.outbox_dir.join(format!(
            "{}_{}",
            now.format("%Y%m%dT%H%M%S"),
            &delivery_id[..8]
        ));
        tokio::fs::create_dir_all(&entry_dir)
            .await
            .map_err(|e| io_error(&entry_dir, e))?;

        let mut names = Vec::with_capacity(request.attachments.len());
        for source in &request.attachments {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let target = entry_dir.join(&name);
            tokio::fs::copy(source, &target)
                .await
                .map_err(|e| io_error(&target, e))?;
            names.push(name);
        }

        let envelope = Envelope {
            delivery_id: &delivery_id,
            recipient: &request.recipient,
            subject: &request.subject,
            body: &request.body,
            attachments: names,
            created_at: now.to_rfc3339(),
        };
        let envelope_path = entry_dir.join(ENVELOPE_FILE);
        tokio::fs::write(&envelope_path, serde_json::to_vec_pretty(&envelope)?)
            .await
            .map_err(|e| io_error(&envelope_path, e))?;

        info!(
            delivery_id = %delivery_id,
            recipient = %request.recipient,
            entry = %entry_dir.display(),
            "已写入发件箱"
        );
        Ok(DeliveryReceipt {
            delivery_id,
            recipient: request.recipient.clone(),
            delivered_at: now,
            location: Some(entry_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_outbox_entry_contains_attachment_and_envelope() {
        let dir = TempDir::new().unwrap();
        let attachment = dir.path().join("combined_data.xlsx");
        std::fs::write(&attachment, b"xlsx-bytes").unwrap();

        let outbox = OutboxDelivery::new(dir.path().join("outbox"));
        let request = DeliveryRequest {
            recipient: "ro@example.com".to_string(),
            subject: "Combined KC and KCP Data".to_string(),
            body: "<p>Update combined KC and KCP data.</p>".to_string(),
            attachments: vec![attachment],
        };
        let receipt = outbox.deliver(&request).await.unwrap();

        let entry = receipt.location.unwrap();
        assert!(entry.starts_with(outbox.outbox_dir()));
        assert_eq!(
            std::fs::read(entry.join("combined_data.xlsx")).unwrap(),
            b"xlsx-bytes"
        );

        let envelope: serde_json::Value =
            serde_json::from_slice(&std::fs::read(entry.join(ENVELOPE_FILE)).unwrap()).unwrap();
        assert_eq!(envelope["recipient"], "ro@example.com");
        assert_eq!(envelope["subject"], "Combined KC and KCP Data");
        assert_eq!(envelope["attachments"][0], "combined_data.xlsx");
        assert_eq!(envelope["delivery_id"], receipt.delivery_id.as_str());
    }

    #[tokio::test]
    async fn test_outbox_missing_attachment_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxDelivery::new(dir.path().join("outbox"));
        let request = DeliveryRequest {
            recipient: "ro@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attachments: vec![dir.path().join("missing.xlsx")],
        };
        let result = outbox.deliver(&request).await;
        assert!(matches!(result, Err(DeliveryError::AttachmentMissing { .. })));
        assert!(!outbox.outbox_dir().exists());
    }
}

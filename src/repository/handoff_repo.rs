// ==========================================
// KC/KCP 绩效报表 ETL - 阶段交接存储
// ==========================================
// 职责: 按 (run_id, stage_key) 保存各阶段产出的表格载荷
// 红线: 存储层不含清洗逻辑，只做载荷的写入/读取/清理
// 载荷格式: split JSON（列名数组 + 行值数组）
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::{
    CellValue, Dataset, ExtractOutcome, NoDataReason, TablePayload, UnitRecord, OUTPUT_COLUMNS,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// StagePayload - 阶段载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StagePayload {
    Table(TablePayload),
    NoData {
        reason: NoDataReason,
        message: String,
    },
    /// 合并完成标记（分发阶段的前置条件）
    Combined {
        rows: usize,
        output_path: PathBuf,
    },
}

impl StagePayload {
    pub fn from_outcome(outcome: &ExtractOutcome) -> Self {
        match outcome {
            ExtractOutcome::Data(dataset) => StagePayload::Table(TablePayload::from(dataset)),
            ExtractOutcome::NoData { reason, message } => StagePayload::NoData {
                reason: *reason,
                message: message.clone(),
            },
        }
    }

    /// 还原为抽取结果（表格载荷按列名解析）
    pub fn into_outcome(self) -> RepositoryResult<ExtractOutcome> {
        match self {
            StagePayload::Table(table) => Ok(ExtractOutcome::Data(payload_to_dataset(&table)?)),
            StagePayload::NoData { reason, message } => {
                Ok(ExtractOutcome::NoData { reason, message })
            }
            StagePayload::Combined { .. } => Err(RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: "合并完成标记不是抽取载荷".to_string(),
            }),
        }
    }
}

/// 表格载荷 → Dataset
///
/// 按列名定位，不依赖列顺序；缺列或行宽不符视为载荷损坏
pub fn payload_to_dataset(table: &TablePayload) -> RepositoryResult<Dataset> {
    let mut index = [0usize; 11];
    for (slot, name) in index.iter_mut().zip(OUTPUT_COLUMNS.iter()) {
        *slot = table
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RepositoryError::FieldValueError {
                field: name.to_string(),
                message: "载荷缺少该列".to_string(),
            })?;
    }

    let mut records = Vec::with_capacity(table.data.len());
    for (row_no, row) in table.data.iter().enumerate() {
        if row.len() != table.columns.len() {
            return Err(RepositoryError::FieldValueError {
                field: format!("data[{}]", row_no),
                message: format!("行宽 {} 与列数 {} 不一致", row.len(), table.columns.len()),
            });
        }
        let cell = |i: usize| row[index[i]].clone();
        let text = |i: usize| match &row[index[i]] {
            CellValue::Text(s) => s.clone(),
            other => other.to_string(),
        };
        records.push(UnitRecord {
            sandi_rka: cell(0),
            header_kpi: cell(1),
            item_kpi: cell(2),
            bobot: cell(3),
            target: cell(4),
            realisasi: cell(5),
            pencapaian: cell(6),
            skor: cell(7),
            main_branch: text(8),
            unit_kerja: text(9),
            periode: text(10),
        });
    }
    Ok(Dataset::from_records(records))
}

// ==========================================
// HandoffStore Trait
// ==========================================
// 用途: 阶段间数据交接（抽取 → 合并）
// 实现者: SqliteHandoffStore（跨进程）、InMemoryHandoffStore（单进程/测试）
#[async_trait]
pub trait HandoffStore: Send + Sync {
    /// 写入载荷（同 key 覆盖）
    async fn put(&self, run_id: &str, stage_key: &str, payload: &StagePayload)
        -> RepositoryResult<()>;

    /// 读取载荷
    ///
    /// # 返回
    /// - Ok(None): 该阶段尚未写入
    async fn get(&self, run_id: &str, stage_key: &str) -> RepositoryResult<Option<StagePayload>>;

    /// 清理一次运行的全部载荷，返回删除条数
    async fn purge_run(&self, run_id: &str) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteHandoffStore
// ==========================================
pub struct SqliteHandoffStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHandoffStore {
    /// 打开（或创建）交接数据库
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（父目录不存在时自动创建）
    pub fn open(db_path: &Path) -> RepositoryResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RepositoryError::DatabaseConnectionError(format!(
                        "无法创建目录 {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（自动建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS stage_handoff (
                run_id TEXT NOT NULL,
                stage_key TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (run_id, stage_key)
            );
            "#,
        )?;
        Ok(())
    }
}

#[async_trait]
impl HandoffStore for SqliteHandoffStore {
    async fn put(
        &self,
        run_id: &str,
        stage_key: &str,
        payload: &StagePayload,
    ) -> RepositoryResult<()> {
        let json = serde_json::to_string(payload)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stage_handoff (run_id, stage_key, payload_json, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(run_id, stage_key) DO UPDATE SET
                payload_json = excluded.payload_json,
                created_at = excluded.created_at
            "#,
            params![run_id, stage_key, json, Utc::now().to_rfc3339()],
        )?;
        debug!(run_id = run_id, stage_key = stage_key, bytes = json.len(), "载荷已写入");
        Ok(())
    }

    async fn get(&self, run_id: &str, stage_key: &str) -> RepositoryResult<Option<StagePayload>> {
        let conn = self.get_conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM stage_handoff WHERE run_id = ?1 AND stage_key = ?2",
                params![run_id, stage_key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    async fn purge_run(&self, run_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM stage_handoff WHERE run_id = ?1",
            params![run_id],
        )?;
        Ok(deleted)
    }
}

// ==========================================
// InMemoryHandoffStore
// ==========================================
// 与 SQLite 实现一致：保存序列化后的 JSON
#[derive(Default)]
pub struct InMemoryHandoffStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<HashMap<(String, String), String>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl HandoffStore for InMemoryHandoffStore {
    async fn put(
        &self,
        run_id: &str,
        stage_key: &str,
        payload: &StagePayload,
    ) -> RepositoryResult<()> {
        let json = serde_json::to_string(payload)?;
        self.lock()?
            .insert((run_id.to_string(), stage_key.to_string()), json);
        Ok(())
    }

    async fn get(&self, run_id: &str, stage_key: &str) -> RepositoryResult<Option<StagePayload>> {
        let entries = self.lock()?;
        match entries.get(&(run_id.to_string(), stage_key.to_string())) {
            Some(s) => Ok(Some(serde_json::from_str(s)?)),
            None => Ok(None),
        }
    }

    async fn purge_run(&self, run_id: &str) -> RepositoryResult<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|(run, _), _| run != run_id);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        Dataset::from_records(vec![UnitRecord {
            sandi_rka: CellValue::Text("1.1".to_string()),
            header_kpi: CellValue::Text("Dana".to_string()),
            item_kpi: CellValue::Text("Giro".to_string()),
            bobot: CellValue::Number(10.0),
            target: CellValue::Number(100.0),
            realisasi: CellValue::zero(),
            pencapaian: CellValue::Text("n/a".to_string()),
            skor: CellValue::Number(9.5),
            main_branch: "KC JAKARTA KCK".to_string(),
            unit_kerja: "KCP TANAH ABANG".to_string(),
            periode: "31/07/2023".to_string(),
        }])
    }

    #[test]
    fn test_payload_json_is_split_format() {
        let payload = StagePayload::from_outcome(&ExtractOutcome::Data(sample_dataset()));
        let value: serde_json::Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["status"], "TABLE");
        assert_eq!(value["columns"][0], "sandi_rka");
        assert_eq!(value["data"][0][3], 10.0);
        assert_eq!(value["data"][0][9], "KCP TANAH ABANG");
    }

    #[test]
    fn test_payload_to_dataset_by_column_name() {
        let mut table = TablePayload::from(&sample_dataset());
        // 列顺序调换不影响还原
        table.columns.swap(0, 1);
        for row in table.data.iter_mut() {
            row.swap(0, 1);
        }
        assert_eq!(payload_to_dataset(&table).unwrap(), sample_dataset());
    }

    #[test]
    fn test_payload_missing_column_rejected() {
        let mut table = TablePayload::from(&sample_dataset());
        table.columns[10] = "tanggal".to_string();
        assert!(matches!(
            payload_to_dataset(&table),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }

    #[test]
    fn test_no_data_payload_round_trip() {
        let outcome = ExtractOutcome::NoData {
            reason: NoDataReason::SourceUnavailable,
            message: "工作簿不存在".to_string(),
        };
        let json = serde_json::to_string(&StagePayload::from_outcome(&outcome)).unwrap();
        assert!(json.contains("NO_DATA"));

        let back: StagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_outcome().unwrap(), outcome);
    }

    #[test]
    fn test_combined_marker_is_not_an_extraction() {
        let marker = StagePayload::Combined {
            rows: 16,
            output_path: PathBuf::from("/data/combined_data.xlsx"),
        };
        let json = serde_json::to_string(&marker).unwrap();
        assert!(json.contains("COMBINED"));

        let back: StagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marker);
        assert!(matches!(
            back.into_outcome(),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store_upsert_and_purge() {
        let store = InMemoryHandoffStore::new();
        let first = StagePayload::from_outcome(&ExtractOutcome::Data(Dataset::new()));
        let second = StagePayload::from_outcome(&ExtractOutcome::Data(sample_dataset()));

        store.put("run-1", "kc_data", &first).await.unwrap();
        store.put("run-1", "kc_data", &second).await.unwrap();
        store.put("run-2", "kc_data", &first).await.unwrap();

        assert_eq!(store.get("run-1", "kc_data").await.unwrap(), Some(second));
        assert_eq!(store.get("run-1", "kcp_data").await.unwrap(), None);

        assert_eq!(store.purge_run("run-1").await.unwrap(), 1);
        assert_eq!(store.get("run-1", "kc_data").await.unwrap(), None);
        assert!(store.get("run-2", "kc_data").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sqlite_store_in_memory() {
        let store = SqliteHandoffStore::open_in_memory().unwrap();
        let payload = StagePayload::from_outcome(&ExtractOutcome::Data(sample_dataset()));

        store.put("run-1", "kcp_data", &payload).await.unwrap();
        store.put("run-1", "kcp_data", &payload).await.unwrap();

        let back = store.get("run-1", "kcp_data").await.unwrap().unwrap();
        assert_eq!(back.into_outcome().unwrap().row_count(), 1);
        assert_eq!(store.purge_run("run-1").await.unwrap(), 1);
    }
}

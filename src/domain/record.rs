// ==========================================
// KC/KCP 绩效报表 ETL - 清洗结果领域模型
// ==========================================
// UnitRecord: 单行清洗结果
// Dataset: 一次工作簿抽取的有序结果集
// TablePayload: 阶段间交接的表格载荷（列名 + 行值）
// ==========================================

use crate::domain::types::{CellValue, NoDataReason};
use serde::{Deserialize, Serialize};

/// 输出文件的 11 列（8 个标准列 + 元信息列）
pub const OUTPUT_COLUMNS: [&str; 11] = [
    "sandi_rka",
    "header_kpi",
    "item_kpi",
    "bobot",
    "target",
    "realisasi",
    "pencapaian",
    "skor",
    "main_branch",
    "unit_kerja",
    "periode",
];

// ==========================================
// UnitRecord - 单行清洗结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    // ===== 投影列（空值已填充为 0）=====
    pub sandi_rka: CellValue,  // RKA 代码
    pub header_kpi: CellValue, // KPI 大类（向下填充）
    pub item_kpi: CellValue,   // KPI 明细项
    pub bobot: CellValue,      // 权重
    pub target: CellValue,     // 目标
    pub realisasi: CellValue,  // 实际
    pub pencapaian: CellValue, // 达成率
    pub skor: CellValue,       // 得分

    // ===== 元信息 =====
    pub main_branch: String, // 父级单元名
    pub unit_kerja: String,  // 报告单元名
    pub periode: String,     // 报告期
}

impl UnitRecord {
    /// 按 OUTPUT_COLUMNS 顺序展开为单元格
    pub fn to_cells(&self) -> Vec<CellValue> {
        vec![
            self.sandi_rka.clone(),
            self.header_kpi.clone(),
            self.item_kpi.clone(),
            self.bobot.clone(),
            self.target.clone(),
            self.realisasi.clone(),
            self.pencapaian.clone(),
            self.skor.clone(),
            CellValue::Text(self.main_branch.clone()),
            CellValue::Text(self.unit_kerja.clone()),
            CellValue::Text(self.periode.clone()),
        ]
    }
}

// ==========================================
// Dataset - 有序结果集
// ==========================================
// 拼接保持顺序，不去重
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<UnitRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<UnitRecord>) -> Self {
        Self { records }
    }

    /// 追加另一个结果集（保持先后顺序）
    pub fn append(&mut self, other: Dataset) {
        self.records.extend(other.records);
    }

    /// 拼接多个结果集
    pub fn concat<I: IntoIterator<Item = Dataset>>(parts: I) -> Self {
        let mut combined = Dataset::new();
        for part in parts {
            combined.append(part);
        }
        combined
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UnitRecord] {
        &self.records
    }
}

// ==========================================
// TablePayload - 表格载荷（split 格式）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub columns: Vec<String>,
    pub data: Vec<Vec<CellValue>>,
}

impl From<&Dataset> for TablePayload {
    fn from(dataset: &Dataset) -> Self {
        TablePayload {
            columns: OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            data: dataset.records().iter().map(|r| r.to_cells()).collect(),
        }
    }
}

// ==========================================
// ExtractOutcome - 工作簿抽取结果
// ==========================================
// NoData 与 "0 行的 Dataset" 是两种不同结果
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    Data(Dataset),
    NoData {
        reason: NoDataReason,
        message: String,
    },
}

impl ExtractOutcome {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            ExtractOutcome::Data(d) => Some(d),
            ExtractOutcome::NoData { .. } => None,
        }
    }

    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            ExtractOutcome::Data(d) => Some(d),
            ExtractOutcome::NoData { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ExtractOutcome::NoData { .. })
    }

    /// 行数（NoData 为 0）
    pub fn row_count(&self) -> usize {
        self.dataset().map(|d| d.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(unit: &str, item: &str) -> UnitRecord {
        UnitRecord {
            sandi_rka: CellValue::Text("1.1".to_string()),
            header_kpi: CellValue::Text("Dana".to_string()),
            item_kpi: CellValue::Text(item.to_string()),
            bobot: CellValue::Number(10.0),
            target: CellValue::Number(100.0),
            realisasi: CellValue::Number(90.0),
            pencapaian: CellValue::Number(0.9),
            skor: CellValue::Number(9.0),
            main_branch: unit.to_string(),
            unit_kerja: unit.to_string(),
            periode: "31/07/2023".to_string(),
        }
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = Dataset::from_records(vec![record("KC A", "Giro"), record("KC A", "FBI")]);
        let b = Dataset::from_records(vec![record("KCP B", "Giro")]);

        let combined = Dataset::concat(vec![a, Dataset::new(), b]);

        let units: Vec<&str> = combined
            .records()
            .iter()
            .map(|r| r.unit_kerja.as_str())
            .collect();
        assert_eq!(units, vec!["KC A", "KC A", "KCP B"]);
    }

    #[test]
    fn test_table_payload_layout() {
        let dataset = Dataset::from_records(vec![record("KC A", "Giro")]);
        let payload = TablePayload::from(&dataset);

        assert_eq!(payload.columns.len(), 11);
        assert_eq!(payload.columns[8], "main_branch");
        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.data[0][10], CellValue::Text("31/07/2023".to_string()));
    }
}

// ==========================================
// KC/KCP 绩效报表 ETL - 领域类型定义
// ==========================================
// 职责: 报表类型、单元格值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 报表类型 (Report Kind)
// ==========================================
// KC = 主分行（父级），KCP = 支行（子级）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    Kc,  // 父级报表
    Kcp, // 子级报表
}

impl ReportKind {
    /// 单元名前缀（"KC " / "KCP " 中的前半部分）
    pub fn unit_prefix(&self) -> &'static str {
        match self {
            ReportKind::Kc => "KC",
            ReportKind::Kcp => "KCP",
        }
    }

    /// 阶段间数据交接使用的 key
    pub fn stage_key(&self) -> &'static str {
        match self {
            ReportKind::Kc => "kc_data",
            ReportKind::Kcp => "kcp_data",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Kc => write!(f, "KC"),
            ReportKind::Kcp => write!(f, "KCP"),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KC" => Ok(ReportKind::Kc),
            "KCP" => Ok(ReportKind::Kcp),
            other => Err(format!("未知报表类型: {}（仅支持 KC/KCP）", other)),
        }
    }
}

// ==========================================
// 无数据原因 (No Data Reason)
// ==========================================
// 工作簿抽取未产出数据时的原因码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoDataReason {
    SourceUnavailable, // 工作簿无法打开
    NoWorksheetData,   // 没有任何工作表处理成功
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::SourceUnavailable => write!(f, "SOURCE_UNAVAILABLE"),
            NoDataReason::NoWorksheetData => write!(f, "NO_WORKSHEET_DATA"),
        }
    }
}

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 清洗后的单元格：数值或文本
// 序列化为 JSON 原生类型（数值 → number，文本 → string）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 空值填充值（字面量 0）
    pub fn zero() -> Self {
        CellValue::Number(0.0)
    }

    /// 文本列：非空原样保留，空白视为缺失
    pub fn text(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(CellValue::Text(raw.to_string()))
        }
    }

    /// 数值列：可解析为浮点数则转为数值，否则保留原文本
    pub fn numeric(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(CellValue::Number(v)),
            _ => Some(CellValue::Text(raw.to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            CellValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ==========================================
// KC/KCP 绩效报表 ETL - 流水线配置结构
// ==========================================
// 职责: 集中声明报表模板偏移、工作簿名、报告期、输出路径等配置
// 默认值与现行报表模板一致，所有字段可由配置文件覆写
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::unit_map::{builtin_unit_map, UnitMapEntry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认报告期
pub const DEFAULT_PERIODE: &str = "31/07/2023";

/// 报告期格式（DD/MM/YYYY）
pub const PERIODE_FORMAT: &str = "%d/%m/%Y";

// ==========================================
// PipelineConfig - 流水线总配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 报告期（写入每行 periode）
    pub periode: String,

    /// 工作表源配置
    pub source: SourceConfig,

    /// 报表模板布局
    pub layout: TemplateLayout,

    /// 权重强制为 0 的 KPI 明细项
    pub excluded_weight_items: Vec<String>,

    /// 合并结果输出路径
    pub output_path: PathBuf,

    /// 阶段交接库路径（分阶段独立执行时使用）
    pub handoff_db_path: PathBuf,

    /// 分发配置
    pub delivery: DeliveryConfig,

    /// 单元映射表覆写（None 时使用内置表）
    pub unit_map: Option<Vec<UnitMapEntry>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let base = default_data_dir();
        Self {
            periode: DEFAULT_PERIODE.to_string(),
            source: SourceConfig::default(),
            layout: TemplateLayout::default(),
            excluded_weight_items: vec!["FBI".to_string(), "LAR".to_string(), "Merchant".to_string()],
            output_path: base.join("combined_data.xlsx"),
            handoff_db_path: base.join("handoff.db"),
            delivery: DeliveryConfig::default(),
            unit_map: None,
        }
    }
}

impl PipelineConfig {
    /// 生效的单元映射表
    pub fn effective_unit_map(&self) -> Vec<UnitMapEntry> {
        self.unit_map.clone().unwrap_or_else(builtin_unit_map)
    }
}

// ==========================================
// SourceConfig - 工作表源
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 工作簿文件所在目录
    pub dir: PathBuf,

    /// KC（父级）工作簿名
    pub kc_workbook: String,

    /// KCP（子级）工作簿名
    pub kcp_workbook: String,

    /// 每个工作簿最多处理的工作表数（跳过的工作表也计入）
    pub max_worksheets: usize,

    /// 跳过的工作表名（精确匹配）
    pub skip_sheets: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir().join("sources"),
            kc_workbook: "KINERJA KANCA RO JAKARTA 1".to_string(),
            kcp_workbook: "KINERJA_KANCA_RO_Value_Only".to_string(),
            max_worksheets: 5,
            skip_sheets: vec!["KANCA".to_string()],
        }
    }
}

// ==========================================
// TemplateLayout - 报表模板布局
// ==========================================
// 所有下标均为工作表绝对下标（从 0 开始）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// 数据区起始行（之前为标题/表头）
    pub data_start_row: usize,

    /// 数据区起始列（含）
    pub col_start: usize,

    /// 数据区结束列（不含）
    pub col_end: usize,

    /// KPI 大类列
    pub label_col: usize,

    /// KPI 大类溢出列（优先取值）
    pub overflow_col: usize,

    /// 投影列，顺序对应 sandi_rka..skor
    pub projection: [usize; 8],
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            data_start_row: 8,
            col_start: 2,
            col_end: 19,
            label_col: 3,
            overflow_col: 4,
            projection: [2, 3, 4, 5, 6, 9, 16, 18],
        }
    }
}

impl TemplateLayout {
    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.col_start && col < self.col_end
    }

    /// 校验布局
    ///
    /// 投影列、大类列、溢出列都必须落在数据区 [col_start, col_end) 内
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "layout".to_string(),
            value: format!("{:?}", self),
            message,
        };

        if self.col_start >= self.col_end {
            return Err(invalid("col_start 必须小于 col_end".to_string()));
        }
        for col in self
            .projection
            .iter()
            .chain([self.label_col, self.overflow_col].iter())
        {
            if !self.contains_col(*col) {
                return Err(invalid(format!(
                    "列 {} 超出数据区 [{}, {})",
                    col, self.col_start, self.col_end
                )));
            }
        }
        Ok(())
    }
}

// ==========================================
// DeliveryConfig - 分发
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Outbox, // 写入发件箱目录，由外部邮件程序发送
    Log,    // 仅记录日志
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub mode: DeliveryMode,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub outbox_dir: PathBuf,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Outbox,
            recipient: "kinerja-ro@example.com".to_string(),
            subject: "Combined KC and KCP Data".to_string(),
            body: "<p>Update combined KC and KCP data.</p>".to_string(),
            outbox_dir: default_data_dir().join("outbox"),
        }
    }
}

/// 默认数据目录
///
/// 优先使用用户数据目录，取不到时退回当前目录
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("kinerja-etl"))
        .unwrap_or_else(|| PathBuf::from("./kinerja-etl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_template() {
        let layout = TemplateLayout::default();
        assert_eq!(layout.data_start_row, 8);
        assert_eq!(layout.col_end - layout.col_start, 17);
        assert!(layout.projection.iter().all(|c| layout.contains_col(*c)));
    }

    #[test]
    fn test_layout_rejects_label_left_of_data_area() {
        let layout = TemplateLayout {
            label_col: 1,
            ..TemplateLayout::default()
        };
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "layout"
        ));
    }

    #[test]
    fn test_layout_projection_must_have_eight_columns() {
        let seven = r#"{"projection": [2, 3, 4, 5, 6, 9, 16]}"#;
        assert!(serde_json::from_str::<TemplateLayout>(seven).is_err());

        let eight = r#"{"projection": [2, 3, 4, 5, 6, 9, 16, 17]}"#;
        let layout: TemplateLayout = serde_json::from_str(eight).unwrap();
        assert_eq!(layout.projection[7], 17);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"periode": "31/08/2023", "source": {"max_worksheets": 3}}"#)
                .unwrap();
        assert_eq!(cfg.periode, "31/08/2023");
        assert_eq!(cfg.source.max_worksheets, 3);
        assert_eq!(cfg.source.skip_sheets, vec!["KANCA".to_string()]);
        assert_eq!(cfg.layout, TemplateLayout::default());
        assert_eq!(cfg.delivery.mode, DeliveryMode::Outbox);
    }

    #[test]
    fn test_effective_unit_map_defaults_to_builtin() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.effective_unit_map(), builtin_unit_map());
    }
}

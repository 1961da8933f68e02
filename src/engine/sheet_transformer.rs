// ==========================================
// KC/KCP 绩效报表 ETL - 工作表清洗器
// ==========================================
// 职责: 单个原始工作表 → 清洗后的 Dataset
// 流程: 截取数据区 → 去掉合计行 → KPI 大类合并与向下填充
//       → 投影重命名 → 权重置零 → 空值填 0 → 元信息 → 单元名规范化
// ==========================================

use crate::config::{ConfigResult, PipelineConfig, TemplateLayout};
use crate::domain::{CellValue, Dataset, RawSheet, ReportKind, UnitRecord};
use crate::engine::unit_mapper::UnitMapper;
use crate::importer::error::{ImportError, ImportResult};
use std::sync::Arc;
use tracing::debug;

pub struct SheetTransformer {
    layout: TemplateLayout,
    excluded_weight_items: Vec<String>,
    periode: String,
    mapper: Arc<UnitMapper>,
}

impl SheetTransformer {
    /// 创建清洗器
    ///
    /// # 返回
    /// - Err(InvalidValue): 布局中的列不在数据区内
    pub fn new(
        layout: TemplateLayout,
        excluded_weight_items: Vec<String>,
        periode: String,
        mapper: Arc<UnitMapper>,
    ) -> ConfigResult<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            excluded_weight_items,
            periode,
            mapper,
        })
    }

    pub fn from_config(config: &PipelineConfig, mapper: Arc<UnitMapper>) -> ConfigResult<Self> {
        Self::new(
            config.layout.clone(),
            config.excluded_weight_items.clone(),
            config.periode.clone(),
            mapper,
        )
    }

    /// 清洗单个工作表
    ///
    /// # 参数
    /// - raw: 原始工作表
    /// - sheet_name: 工作表名（用于生成单元名）
    /// - kind: 报表类型（KC 父级 / KCP 子级）
    ///
    /// # 返回
    /// - Ok(Dataset): 清洗结果（每个数据行一条记录）
    /// - Err(MalformedSheet): 工作表尺寸不足
    pub fn clean(&self, raw: &RawSheet, sheet_name: &str, kind: ReportKind) -> ImportResult<Dataset> {
        self.check_dimensions(raw, sheet_name)?;

        // 1-2. 截取数据区，去掉最后一行（合计行）
        let mut block = self.extract_block(raw);
        block.pop();

        // 3. KPI 大类合并 + 向下填充
        let label = self.layout.label_col - self.layout.col_start;
        let overflow = self.layout.overflow_col - self.layout.col_start;
        merge_label_columns(&mut block, label, overflow);

        // 7-8. 元信息
        let (main_branch, unit_kerja) = self.unit_names(sheet_name, kind);

        let records: Vec<UnitRecord> = block
            .iter()
            .map(|row| self.build_record(row, &main_branch, &unit_kerja))
            .collect();

        debug!(
            sheet = sheet_name,
            kind = %kind,
            rows = records.len(),
            "工作表清洗完成"
        );
        Ok(Dataset::from_records(records))
    }

    fn check_dimensions(&self, raw: &RawSheet, sheet_name: &str) -> ImportResult<()> {
        if raw.height() <= self.layout.data_start_row {
            return Err(ImportError::MalformedSheet {
                sheet: sheet_name.to_string(),
                message: format!(
                    "行数 {} 不足，数据区起始行为 {}",
                    raw.height(),
                    self.layout.data_start_row
                ),
            });
        }
        if raw.width() < self.layout.col_end {
            return Err(ImportError::MalformedSheet {
                sheet: sheet_name.to_string(),
                message: format!(
                    "列数 {} 不足，模板需要 {} 列",
                    raw.width(),
                    self.layout.col_end
                ),
            });
        }
        Ok(())
    }

    fn extract_block(&self, raw: &RawSheet) -> Vec<Vec<String>> {
        (self.layout.data_start_row..raw.height())
            .map(|r| {
                (self.layout.col_start..self.layout.col_end)
                    .map(|c| raw.cell(r, c).to_string())
                    .collect()
            })
            .collect()
    }

    /// 4-6. 投影重命名、权重置零、空值填 0
    fn build_record(&self, row: &[String], main_branch: &str, unit_kerja: &str) -> UnitRecord {
        let cell = |i: usize| row[self.layout.projection[i] - self.layout.col_start].as_str();

        let item_kpi = CellValue::text(cell(2));
        let bobot = if self.is_excluded_item(item_kpi.as_ref()) {
            Some(CellValue::zero())
        } else {
            CellValue::numeric(cell(3))
        };

        let fill = |v: Option<CellValue>| v.unwrap_or_else(CellValue::zero);

        UnitRecord {
            sandi_rka: fill(CellValue::text(cell(0))),
            header_kpi: fill(CellValue::text(cell(1))),
            item_kpi: fill(item_kpi),
            bobot: fill(bobot),
            target: fill(CellValue::numeric(cell(4))),
            realisasi: fill(CellValue::numeric(cell(5))),
            pencapaian: fill(CellValue::numeric(cell(6))),
            skor: fill(CellValue::numeric(cell(7))),
            main_branch: main_branch.to_string(),
            unit_kerja: unit_kerja.to_string(),
            periode: self.periode.clone(),
        }
    }

    fn is_excluded_item(&self, item_kpi: Option<&CellValue>) -> bool {
        match item_kpi.and_then(|v| v.as_text()) {
            Some(item) => self.excluded_weight_items.iter().any(|x| x == item),
            None => false,
        }
    }

    /// 返回 (main_branch, unit_kerja)，已做下划线/空白规范化
    fn unit_names(&self, sheet_name: &str, kind: ReportKind) -> (String, String) {
        let unit_kerja = format!("{} {}", kind.unit_prefix(), sheet_name);
        let main_branch = match kind {
            ReportKind::Kc => unit_kerja.clone(),
            ReportKind::Kcp => self.mapper.resolve_parent(&unit_kerja),
        };
        (
            normalize_unit_name(&main_branch),
            normalize_unit_name(&unit_kerja),
        )
    }
}

/// KPI 大类列合并
///
/// 大类非空的行改取溢出列的值；之后仍为空的大类单元格
/// 沿用上方最近一个非空值（首个非空值之前的保持为空）
pub fn merge_label_columns(block: &mut [Vec<String>], label: usize, overflow: usize) {
    let mut last: Option<String> = None;
    for row in block.iter_mut() {
        if !is_blank(&row[label]) {
            row[label] = row[overflow].clone();
        }
        if is_blank(&row[label]) {
            if let Some(prev) = &last {
                row[label] = prev.clone();
            }
        } else {
            last = Some(row[label].clone());
        }
    }
}

/// 下划线替换为空格并去除首尾空白
pub fn normalize_unit_name(name: &str) -> String {
    name.replace('_', " ").trim().to_string()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

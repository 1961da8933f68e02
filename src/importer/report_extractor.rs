// ==========================================
// KC/KCP 绩效报表 ETL - 报表抽取器
// ==========================================
// 职责: 打开工作簿 → 逐个工作表清洗 → 按工作表顺序拼接
// 失败粒度:
// - 工作簿打开失败: 整个工作簿放弃，返回 NoData(SourceUnavailable)
// - 单个工作表读取/尺寸不符: 记录告警并跳过，其余工作表继续
// - 没有任何工作表处理成功: NoData(NoWorksheetData)
// ==========================================

use crate::config::{ConfigResult, PipelineConfig};
use crate::domain::{Dataset, ExtractOutcome, NoDataReason, ReportKind};
use crate::engine::sheet_transformer::SheetTransformer;
use crate::engine::unit_mapper::UnitMapper;
use crate::importer::sheet_source_trait::SheetSource;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub struct ReportExtractor {
    source: Arc<dyn SheetSource>,
    transformer: SheetTransformer,
    max_worksheets: usize,
    skip_sheets: Vec<String>,
}

impl ReportExtractor {
    pub fn new(
        source: Arc<dyn SheetSource>,
        transformer: SheetTransformer,
        max_worksheets: usize,
        skip_sheets: Vec<String>,
    ) -> Self {
        Self {
            source,
            transformer,
            max_worksheets,
            skip_sheets,
        }
    }

    pub fn from_config(
        config: &PipelineConfig,
        source: Arc<dyn SheetSource>,
        mapper: Arc<UnitMapper>,
    ) -> ConfigResult<Self> {
        Ok(Self::new(
            source,
            SheetTransformer::from_config(config, mapper)?,
            config.source.max_worksheets,
            config.source.skip_sheets.clone(),
        ))
    }

    /// 抽取一个工作簿
    ///
    /// # 参数
    /// - workbook_name: 工作簿名
    /// - kind: 报表类型
    ///
    /// # 返回
    /// - ExtractOutcome::Data: 所有成功工作表的拼接结果（可能为 0 行）
    /// - ExtractOutcome::NoData: 工作簿不可用或没有工作表处理成功
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub fn extract(&self, workbook_name: &str, kind: ReportKind) -> ExtractOutcome {
        let mut workbook = match self.source.open(workbook_name) {
            Ok(wb) => wb,
            Err(e) => {
                error!(workbook = workbook_name, error = %e, "工作簿打开失败，放弃本工作簿");
                return ExtractOutcome::NoData {
                    reason: NoDataReason::SourceUnavailable,
                    message: e.to_string(),
                };
            }
        };

        let titles = workbook.worksheet_titles();
        let mut parts: Vec<Dataset> = Vec::new();
        let mut skipped = 0usize;

        // 限额计入被跳过的工作表
        for title in titles.iter().take(self.max_worksheets) {
            if self.skip_sheets.iter().any(|s| s == title) {
                info!(sheet = %title, "跳过汇总工作表");
                continue;
            }

            let cleaned = workbook
                .read_all(title)
                .and_then(|raw| self.transformer.clean(&raw, title, kind));

            match cleaned {
                Ok(dataset) => {
                    info!(sheet = %title, rows = dataset.len(), "工作表处理完成");
                    parts.push(dataset);
                }
                Err(e) => {
                    warn!(sheet = %title, error = %e, "工作表处理失败，已跳过");
                    skipped += 1;
                }
            }
        }

        if parts.is_empty() {
            warn!(
                workbook = workbook_name,
                skipped = skipped,
                "没有可合并的工作表数据"
            );
            return ExtractOutcome::NoData {
                reason: NoDataReason::NoWorksheetData,
                message: format!(
                    "工作簿 {} 没有处理成功的工作表（失败 {} 个）",
                    workbook_name, skipped
                ),
            };
        }

        let sheets = parts.len();
        let dataset = Dataset::concat(parts);
        info!(
            workbook = workbook_name,
            sheets = sheets,
            skipped = skipped,
            rows = dataset.len(),
            "工作簿抽取完成"
        );
        ExtractOutcome::Data(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSheet;
    use crate::importer::memory_source::MemorySheetSource;

    /// 19 列模板，n 个数据行 + 1 行合计
    fn sheet_with_rows(n: usize, item: &str) -> RawSheet {
        let mut rows = vec![vec![String::new(); 19]; 8];
        for i in 0..n {
            let mut r = vec![String::new(); 19];
            r[2] = format!("{}", i + 1);
            r[4] = item.to_string();
            r[5] = "10".to_string();
            rows.push(r);
        }
        rows.push(vec!["Total".to_string(); 19]);
        RawSheet::from_rows(rows)
    }

    fn extractor(source: MemorySheetSource) -> ReportExtractor {
        ReportExtractor::from_config(
            &PipelineConfig::default(),
            Arc::new(source),
            Arc::new(UnitMapper::builtin()),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_skips_kanca_and_keeps_order() {
        let source = MemorySheetSource::new().with_workbook(
            "KC",
            vec![
                ("KANCA", sheet_with_rows(3, "Ringkasan")),
                ("B_UNIT", sheet_with_rows(2, "Giro")),
                ("A_UNIT", sheet_with_rows(1, "Giro")),
            ],
        );
        let outcome = extractor(source).extract("KC", ReportKind::Kc);
        let dataset = outcome.into_dataset().unwrap();

        let units: Vec<&str> = dataset
            .records()
            .iter()
            .map(|r| r.unit_kerja.as_str())
            .collect();
        assert_eq!(units, vec!["KC B UNIT", "KC B UNIT", "KC A UNIT"]);
    }

    #[test]
    fn test_extract_limits_to_first_five_sheets() {
        let sheets: Vec<(&str, RawSheet)> = ["S1", "KANCA", "S3", "S4", "S5", "S6"]
            .iter()
            .map(|name| (*name, sheet_with_rows(1, "Giro")))
            .collect();
        let source = MemorySheetSource::new().with_workbook("KC", sheets);

        let dataset = extractor(source)
            .extract("KC", ReportKind::Kc)
            .into_dataset()
            .unwrap();

        // KANCA 占用一个名额，S6 不处理
        assert_eq!(dataset.len(), 4);
        assert!(dataset.records().iter().all(|r| r.unit_kerja != "KC S6"));
    }

    #[test]
    fn test_extract_isolates_malformed_sheet() {
        let source = MemorySheetSource::new().with_workbook(
            "KCP",
            vec![
                ("RUSAK", RawSheet::from_str_rows(&[&["x"]])),
                ("CIKINI", sheet_with_rows(2, "Giro")),
            ],
        );
        let dataset = extractor(source)
            .extract("KCP", ReportKind::Kcp)
            .into_dataset()
            .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].main_branch, "KC JAKARTA CUT MUTIAH");
    }

    #[test]
    fn test_extract_missing_workbook_is_no_data() {
        let outcome = extractor(MemorySheetSource::new()).extract("KC", ReportKind::Kc);
        assert!(matches!(
            outcome,
            ExtractOutcome::NoData {
                reason: NoDataReason::SourceUnavailable,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_all_sheets_failing_is_no_data() {
        let source = MemorySheetSource::new().with_workbook(
            "KC",
            vec![
                ("KANCA", sheet_with_rows(1, "Giro")),
                ("RUSAK", RawSheet::default()),
            ],
        );
        let outcome = extractor(source).extract("KC", ReportKind::Kc);
        assert!(matches!(
            outcome,
            ExtractOutcome::NoData {
                reason: NoDataReason::NoWorksheetData,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_zero_rows_is_data_not_no_data() {
        let source =
            MemorySheetSource::new().with_workbook("KC", vec![("KOSONG", sheet_with_rows(0, ""))]);
        let outcome = extractor(source).extract("KC", ReportKind::Kc);
        assert!(!outcome.is_no_data());
        assert_eq!(outcome.row_count(), 0);
    }
}

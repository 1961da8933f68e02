// ==========================================
// 本地工作簿源集成测试
// ==========================================
// 测试目标: rust_xlsxwriter 生成工作簿 → calamine 读取 → 清洗 → 合并写出
// ==========================================


use calamine::{open_workbook_auto, Reader};
use kinerja_etl::config::DeliveryMode;
use kinerja_etl::delivery::build_delivery;
use kinerja_etl::domain::{ExtractOutcome, NoDataReason, ReportKind};
use kinerja_etl::engine::{PipelineOrchestrator, UnitMapper};
use kinerja_etl::importer::{ExcelSheetSource, ImportError, ReportExtractor, SheetSource};
use kinerja_etl::repository::InMemoryHandoffStore;
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::*;

#[test]
fn test_excel_source_reads_template_at_absolute_offsets() {
    let dir = TempDir::new().unwrap();
    let sheet = standard_sheet();
    write_workbook(
        &dir.path().join("KINERJA KANCA RO JAKARTA 1.xlsx"),
        &[("KANCA", &sheet), ("JAKARTA_KCK", &sheet)],
    )
    .unwrap();

    let source = ExcelSheetSource::new(dir.path());
    let mut workbook = source.open("KINERJA KANCA RO JAKARTA 1").unwrap();

    assert_eq!(workbook.worksheet_titles(), vec!["KANCA", "JAKARTA_KCK"]);

    let raw = workbook.read_all("JAKARTA_KCK").unwrap();
    assert_eq!(raw.height(), sheet.height());
    assert_eq!(raw.width(), 19);
    // 数值单元格读回为最短文本
    assert_eq!(raw.cell(9, 4), "Giro");
    assert_eq!(raw.cell(9, 5), "10");
    assert_eq!(raw.cell(9, 2), "1.1");
    assert_eq!(raw.cell(8, 1), "");
}

#[test]
fn test_excel_source_missing_workbook_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let source = ExcelSheetSource::new(dir.path());
    assert!(matches!(
        source.open("KINERJA_KANCA_RO_Value_Only"),
        Err(ImportError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_excel_source_unreadable_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("RUSAK.xlsx"), b"not a zip archive").unwrap();

    let source = ExcelSheetSource::new(dir.path());
    let extractor = ReportExtractor::from_config(
        &test_config(dir.path()),
        Arc::new(source),
        Arc::new(UnitMapper::builtin()),
    )
    .unwrap();

    match extractor.extract("RUSAK", ReportKind::Kc) {
        ExtractOutcome::NoData { reason, .. } => {
            assert_eq!(reason, NoDataReason::SourceUnavailable)
        }
        other => panic!("应为 NoData，实际: {:?}", other),
    }
}

#[test]
fn test_extract_child_workbook_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("KINERJA_KANCA_RO_Value_Only.xlsx");
    let sheet = standard_sheet();
    let short = malformed_sheet();
    write_workbook(
        &path,
        &[
            ("KANCA", &sheet),
            ("TANAH_ABANG", &sheet),
            ("RINGKASAN", &short),
            ("PASAR_BARU", &sheet),
        ],
    )
    .unwrap();

    let extractor = ReportExtractor::from_config(
        &test_config(dir.path()),
        Arc::new(ExcelSheetSource::new(dir.path())),
        Arc::new(UnitMapper::builtin()),
    )
    .unwrap();
    let dataset = extractor
        .extract("KINERJA_KANCA_RO_Value_Only", ReportKind::Kcp)
        .into_dataset()
        .expect("应有数据");

    assert_eq!(dataset.len(), 8);
    assert_eq!(dataset.records()[0].unit_kerja, "KCP TANAH ABANG");
    assert_eq!(dataset.records()[4].unit_kerja, "KCP PASAR BARU");
}

#[tokio::test]
async fn test_full_run_over_workbook_files() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.delivery.mode = DeliveryMode::Log;

    let sheet = standard_sheet();
    write_workbook(
        &config.source.dir.join(format!("{}.xlsx", config.source.kc_workbook)),
        &[("KANCA", &sheet), ("JAKARTA_KCK", &sheet)],
    )
    .unwrap();
    write_workbook(
        &config.source.dir.join(format!("{}.xlsx", config.source.kcp_workbook)),
        &[("KANCA", &sheet), ("CIKINI", &sheet)],
    )
    .unwrap();

    let config = Arc::new(config);
    let orchestrator = PipelineOrchestrator::new(
        config.clone(),
        Arc::new(ExcelSheetSource::new(&config.source.dir)),
        Arc::new(InMemoryHandoffStore::new()),
        build_delivery(&config.delivery),
    )
    .unwrap();
    let report = orchestrator.run().await.expect("运行应该成功");
    assert_eq!(report.combined_rows, 8);

    let mut wb = open_workbook_auto(&config.output_path).unwrap();
    let first = wb.sheet_names()[0].clone();
    let range = wb.worksheet_range(&first).unwrap();
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    assert_eq!(rows.len(), 9);
    assert_eq!(
        rows[0],
        vec![
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
            "periode"
        ]
    );
    assert_eq!(rows[1][9], "KC JAKARTA KCK");
    assert_eq!(rows[5][9], "KCP CIKINI");
    assert_eq!(rows[3][3], "0");
}

// ==========================================
// 配置加载集成测试
// ==========================================
// 测试目标: JSON 配置文件 → 校验 → 驱动清洗行为
// ==========================================


use kinerja_etl::config::{ConfigError, ConfigManager};
use kinerja_etl::domain::ReportKind;
use kinerja_etl::engine::UnitMapper;
use kinerja_etl::importer::ReportExtractor;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use test_helpers::*;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_drives_transform() {
    let file = write_config(
        r#"{
            "periode": "31/08/2023",
            "excluded_weight_items": ["Giro"],
            "source": { "kcp_workbook": "KCP_AGUSTUS", "skip_sheets": ["KANCA", "REKAP"] },
            "unit_map": [
                { "parent": "KC JAKARTA PUSAT", "aliases": ["KC JAKARTA PUSAT", "KCP CIKINI"] }
            ]
        }"#,
    );
    let config = ConfigManager::read_file(file.path()).unwrap();
    ConfigManager::validate(&config).unwrap();

    let source = memory_source(
        &config,
        vec![],
        vec![
            ("REKAP", standard_sheet()),
            ("CIKINI", standard_sheet()),
        ],
    );
    let extractor = ReportExtractor::from_config(
        &config,
        Arc::new(source),
        Arc::new(UnitMapper::new(config.effective_unit_map())),
    )
    .unwrap();
    let dataset = extractor
        .extract("KCP_AGUSTUS", ReportKind::Kcp)
        .into_dataset()
        .unwrap();

    assert_eq!(dataset.len(), 4);
    let giro = &dataset.records()[1];
    assert_eq!(giro.main_branch, "KC JAKARTA PUSAT");
    assert_eq!(giro.periode, "31/08/2023");
    assert_eq!(giro.bobot.as_number(), Some(0.0));
    // LAR 不在本配置的排除列表中
    assert_eq!(dataset.records()[2].bobot.as_number(), Some(5.0));
}

#[test]
fn test_config_file_with_bad_periode_rejected() {
    let file = write_config(r#"{ "periode": "2023-07-31" }"#);
    let result = ConfigManager::load(Some(file.path()));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "periode"
    ));
}

#[test]
fn test_config_file_missing() {
    let result = ConfigManager::read_file(std::path::Path::new("/nonexistent/kinerja.json"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

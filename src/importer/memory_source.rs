// ==========================================
// KC/KCP 绩效报表 ETL - 内存工作表源
// ==========================================
// 用途: 嵌入调用方已取得的数据 / 测试
// ==========================================

use crate::domain::RawSheet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sheet_source_trait::{SheetSource, SourceWorkbook};

#[derive(Debug, Clone, Default)]
pub struct MemorySheetSource {
    workbooks: Vec<(String, Vec<(String, RawSheet)>)>,
}

impl MemorySheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加工作簿（工作表按给定顺序保存）
    pub fn with_workbook(mut self, name: &str, sheets: Vec<(&str, RawSheet)>) -> Self {
        let sheets = sheets
            .into_iter()
            .map(|(title, sheet)| (title.to_string(), sheet))
            .collect();
        self.workbooks.push((name.to_string(), sheets));
        self
    }
}

impl SheetSource for MemorySheetSource {
    fn open(&self, workbook_name: &str) -> ImportResult<Box<dyn SourceWorkbook>> {
        self.workbooks
            .iter()
            .find(|(name, _)| name == workbook_name)
            .map(|(name, sheets)| {
                Box::new(MemoryWorkbook {
                    name: name.clone(),
                    sheets: sheets.clone(),
                }) as Box<dyn SourceWorkbook>
            })
            .ok_or_else(|| ImportError::SourceUnavailable {
                workbook: workbook_name.to_string(),
                message: "工作簿不存在".to_string(),
            })
    }
}

struct MemoryWorkbook {
    name: String,
    sheets: Vec<(String, RawSheet)>,
}

impl SourceWorkbook for MemoryWorkbook {
    fn name(&self) -> &str {
        &self.name
    }

    fn worksheet_titles(&self) -> Vec<String> {
        self.sheets.iter().map(|(title, _)| title.clone()).collect()
    }

    fn read_all(&mut self, title: &str) -> ImportResult<RawSheet> {
        self.sheets
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, sheet)| sheet.clone())
            .ok_or_else(|| ImportError::WorksheetReadError {
                workbook: self.name.clone(),
                sheet: title.to_string(),
                message: "工作表不存在".to_string(),
            })
    }
}

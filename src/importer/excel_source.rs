// ==========================================
// KC/KCP 绩效报表 ETL - 本地工作簿源实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls) / OpenDocument (.ods)
// 约定: 工作簿名 = 目录下的文件名（不含扩展名）
// ==========================================

use crate::domain::RawSheet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sheet_source_trait::{SheetSource, SourceWorkbook};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 按优先级尝试的扩展名
const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

// ==========================================
// ExcelSheetSource - 目录下的工作簿文件
// ==========================================
pub struct ExcelSheetSource {
    dir: PathBuf,
}

impl ExcelSheetSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 定位工作簿文件
    fn locate(&self, workbook_name: &str) -> ImportResult<PathBuf> {
        let direct = self.dir.join(workbook_name);
        if direct.is_file() {
            let ext = direct
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return Ok(direct);
            }
            return Err(ImportError::UnsupportedFormat(ext));
        }

        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", workbook_name, ext)))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ImportError::FileNotFound(self.dir.join(workbook_name).display().to_string())
            })
    }
}

impl SheetSource for ExcelSheetSource {
    fn open(&self, workbook_name: &str) -> ImportResult<Box<dyn SourceWorkbook>> {
        let unavailable = |message: String| ImportError::SourceUnavailable {
            workbook: workbook_name.to_string(),
            message,
        };

        let path = self.locate(workbook_name).map_err(|e| unavailable(e.to_string()))?;
        let sheets = open_workbook_auto(&path).map_err(|e| unavailable(e.to_string()))?;

        debug!(workbook = workbook_name, path = %path.display(), "工作簿已打开");
        Ok(Box::new(ExcelWorkbook {
            name: workbook_name.to_string(),
            sheets,
        }))
    }
}

struct ExcelWorkbook {
    name: String,
    sheets: Sheets<BufReader<File>>,
}

impl SourceWorkbook for ExcelWorkbook {
    fn name(&self) -> &str {
        &self.name
    }

    fn worksheet_titles(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn read_all(&mut self, title: &str) -> ImportResult<RawSheet> {
        let range = self
            .sheets
            .worksheet_range(title)
            .map_err(|e| ImportError::WorksheetReadError {
                workbook: self.name.clone(),
                sheet: title.to_string(),
                message: e.to_string(),
            })?;
        Ok(range_to_raw_sheet(&range))
    }
}

/// Range → RawSheet
///
/// calamine 的 Range 从首个非空单元格开始，这里补回左上角偏移，
/// 保证下标与 A1 起算一致
pub fn range_to_raw_sheet(range: &Range<Data>) -> RawSheet {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return RawSheet::default(),
    };
    let (height, width) = range.get_size();

    let mut rows = vec![vec![String::new(); start_col + width]; start_row + height];
    for (r, c, cell) in range.cells() {
        rows[start_row + r][start_col + c] = cell_to_text(cell);
    }
    RawSheet::from_rows(rows)
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_range_offset_restored() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Dana".to_string()));
        range.set_value((3, 2), Data::Float(10.0));

        let sheet = range_to_raw_sheet(&range);
        assert_eq!(sheet.height(), 4);
        assert_eq!(sheet.width(), 3);
        assert_eq!(sheet.cell(2, 1), "Dana");
        assert_eq!(sheet.cell(3, 2), "10");
        assert_eq!(sheet.cell(0, 0), "");
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert_eq!(range_to_raw_sheet(&range), RawSheet::default());
    }

    #[test]
    fn test_open_missing_workbook() {
        let dir = TempDir::new().unwrap();
        let source = ExcelSheetSource::new(dir.path());
        let result = source.open("TIDAK ADA");
        assert!(matches!(result, Err(ImportError::SourceUnavailable { .. })));
    }

    #[test]
    fn test_open_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("laporan.txt"), "x").unwrap();
        let source = ExcelSheetSource::new(dir.path());
        match source.open("laporan.txt") {
            Err(ImportError::SourceUnavailable { message, .. }) => {
                assert!(message.contains("txt"));
            }
            other => panic!("期望 SourceUnavailable，实际 {:?}", other.map(|_| ())),
        }
    }
}

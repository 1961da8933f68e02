// ==========================================
// KC/KCP 绩效报表 ETL - 合并结果写出
// ==========================================
// 单个工作表: 首行为 11 个标准列名（加粗），其后每条记录一行
// 先写同目录临时文件，再 rename 到目标路径
// ==========================================

use crate::domain::{CellValue, Dataset, OUTPUT_COLUMNS};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("输出文件写入失败 ({path}): {message}")]
    WriteFailure { path: PathBuf, message: String },
}

pub type ExportResult<T> = Result<T, ExportError>;

fn failure(path: &Path, message: impl ToString) -> ExportError {
    ExportError::WriteFailure {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// 写出合并结果
///
/// # 参数
/// - dataset: 合并后的结果集
/// - path: 目标文件路径（父目录不存在时自动创建）
///
/// # 返回
/// - Ok(()): 目标文件已完整替换
/// - Err(WriteFailure): 目标文件保持原状
pub fn write_dataset(dataset: &Dataset, path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| failure(path, e))?;
        }
    }

    let tmp = temp_path_for(path);
    let written = build_workbook(dataset)
        .and_then(|mut workbook| workbook.save(&tmp))
        .map_err(|e| failure(path, e))
        .and_then(|_| std::fs::rename(&tmp, path).map_err(|e| failure(path, e)));

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    info!(path = %path.display(), rows = dataset.len(), "合并结果已写出");
    Ok(())
}

fn build_workbook(dataset: &Dataset) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (col, name) in OUTPUT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (row_idx, record) in dataset.records().iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, value) in record.to_cells().iter().enumerate() {
            write_cell(worksheet, row, col as u16, value)?;
        }
    }

    Ok(workbook)
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<(), XlsxError> {
    match value {
        CellValue::Number(v) => {
            ws.write_number(row, col, *v)?;
        }
        CellValue::Text(s) => {
            ws.write_string(row, col, s)?;
        }
    }
    Ok(())
}

/// 同目录临时文件路径（rename 不跨文件系统）
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

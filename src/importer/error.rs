// ==========================================
// KC/KCP 绩效报表 ETL - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 工作表源错误 =====
    #[error("工作簿不可用 ({workbook}): {message}")]
    SourceUnavailable { workbook: String, message: String },

    #[error("工作表读取失败 ({workbook}/{sheet}): {message}")]
    WorksheetReadError {
        workbook: String,
        sheet: String,
        message: String,
    },

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.ods）")]
    UnsupportedFormat(String),

    // ===== 模板错误 =====
    #[error("工作表尺寸不符合模板 ({sheet}): {message}")]
    MalformedSheet { sheet: String, message: String },
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

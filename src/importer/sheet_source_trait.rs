// ==========================================
// KC/KCP 绩效报表 ETL - 工作表源 Trait
// ==========================================
// 职责: 定义只读工作表源接口（不包含实现）
// 认证/传输细节由实现者负责，对清洗流程不可见
// ==========================================

use crate::domain::RawSheet;
use crate::importer::error::ImportResult;

// ==========================================
// SheetSource Trait
// ==========================================
// 用途: 按名称打开工作簿
// 实现者: ExcelSheetSource, MemorySheetSource
pub trait SheetSource: Send + Sync {
    /// 打开工作簿
    ///
    /// # 参数
    /// - workbook_name: 工作簿名
    ///
    /// # 返回
    /// - Ok(Box<dyn SourceWorkbook>): 已打开的工作簿
    /// - Err(SourceUnavailable): 不存在/无权限/无法解析
    fn open(&self, workbook_name: &str) -> ImportResult<Box<dyn SourceWorkbook>>;
}

// ==========================================
// SourceWorkbook Trait
// ==========================================
// 用途: 枚举工作表并读取全部单元格
pub trait SourceWorkbook {
    /// 工作簿名
    fn name(&self) -> &str;

    /// 按工作簿内顺序列出工作表名
    fn worksheet_titles(&self) -> Vec<String>;

    /// 读取工作表全部内容（从 A1 开始的二维文本网格）
    fn read_all(&mut self, title: &str) -> ImportResult<RawSheet>;
}

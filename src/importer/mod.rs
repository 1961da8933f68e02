// ==========================================
// KC/KCP 绩效报表 ETL - 导入层
// ==========================================
// 职责: 从工作表源读取工作簿，清洗后产出 Dataset
// 支持: 本地工作簿文件 (calamine) / 内存
// ==========================================

// 模块声明
pub mod error;
pub mod excel_source;
pub mod memory_source;
pub mod report_extractor;
pub mod sheet_source_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use excel_source::ExcelSheetSource;
pub use memory_source::MemorySheetSource;
pub use report_extractor::ReportExtractor;

// 重导出 Trait 接口
pub use sheet_source_trait::{SheetSource, SourceWorkbook};

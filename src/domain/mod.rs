// ==========================================
// KC/KCP 绩效报表 ETL - 领域模型层
// ==========================================
// 职责: 定义原始工作表、清洗结果、报表类型
// 红线: 不含数据访问逻辑,不含清洗规则
// ==========================================

pub mod raw_sheet;
pub mod record;
pub mod types;
pub mod unit_map;

// 重导出核心类型
pub use raw_sheet::RawSheet;
pub use record::{Dataset, ExtractOutcome, TablePayload, UnitRecord, OUTPUT_COLUMNS};
pub use types::{CellValue, NoDataReason, ReportKind};
pub use unit_map::{builtin_unit_map, UnitMapEntry};

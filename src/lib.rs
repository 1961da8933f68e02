// ==========================================
// KC/KCP 绩效报表 ETL - 核心库
// ==========================================
// 流程: 抽取 KC 工作簿 → 抽取 KCP 工作簿 → 合并写出 → 分发
// 技术栈: calamine + rust_xlsxwriter + SQLite（阶段交接）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据模型与单元映射表
pub mod domain;

// 配置层 - 流水线配置
pub mod config;

// 导入层 - 工作表源与报表抽取
pub mod importer;

// 引擎层 - 清洗与编排
pub mod engine;

// 数据仓储层 - 阶段交接
pub mod repository;

// 输出层 - 合并结果写出
pub mod export;

// 分发层
pub mod delivery;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigManager, PipelineConfig, TemplateLayout};
pub use domain::{CellValue, Dataset, ExtractOutcome, NoDataReason, RawSheet, ReportKind, UnitRecord};
pub use engine::{
    PipelineError, PipelineOrchestrator, PipelineResult, RunReport, SheetTransformer, Stage,
    UnitMapper,
};
pub use importer::{ExcelSheetSource, MemorySheetSource, ReportExtractor, SheetSource};
pub use repository::{HandoffStore, InMemoryHandoffStore, SqliteHandoffStore};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "KC/KCP 绩效报表 ETL";

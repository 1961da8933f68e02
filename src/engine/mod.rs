// ==========================================
// KC/KCP 绩效报表 ETL - 引擎层
// ==========================================
// 职责: 单元映射、工作表清洗、流水线编排
// 红线: Engine 不拼 SQL，不直接读写工作簿文件
// ==========================================

pub mod error;
pub mod orchestrator;
pub mod sheet_transformer;
pub mod unit_mapper;

// 重导出核心引擎
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{
    combine_outcomes, new_run_id, PipelineOrchestrator, RunReport, Stage, StageOutcome,
    COMBINED_STAGE_KEY,
};
pub use sheet_transformer::SheetTransformer;
pub use unit_mapper::{UnitMapper, UNKNOWN_UNIT};

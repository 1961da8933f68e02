// ==========================================
// KC/KCP 绩效报表 ETL - 数据仓储层
// ==========================================
// 红线: Repository 不含清洗逻辑
// ==========================================
// 职责: 阶段交接载荷的持久化，屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod handoff_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use handoff_repo::{
    payload_to_dataset, HandoffStore, InMemoryHandoffStore, SqliteHandoffStore, StagePayload,
};

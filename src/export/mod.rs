// ==========================================
// KC/KCP 绩效报表 ETL - 输出层
// ==========================================

pub mod xlsx_writer;

pub use xlsx_writer::{write_dataset, ExportError, ExportResult};

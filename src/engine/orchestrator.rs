// ==========================================
// KC/KCP 绩效报表 ETL - 流水线编排器
// ==========================================
// 用途: 按严格顺序执行 四个阶段
//   extract-kc → extract-kcp → combine → deliver
// 阶段间只通过交接存储传递数据，单个阶段可独立执行
// ==========================================

use crate::config::PipelineConfig;
use crate::delivery::{DeliveryReceipt, DeliveryRequest, DeliveryService};
use crate::domain::{Dataset, ExtractOutcome, NoDataReason, ReportKind};
use crate::engine::error::{PipelineError, PipelineResult};
use crate::engine::unit_mapper::UnitMapper;
use crate::export::write_dataset;
use crate::importer::{ReportExtractor, SheetSource};
use crate::repository::{HandoffStore, StagePayload};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// Stage - 流水线阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractKc,
    ExtractKcp,
    Combine,
    Deliver,
}

impl Stage {
    /// 执行顺序
    pub const ALL: [Stage; 4] = [
        Stage::ExtractKc,
        Stage::ExtractKcp,
        Stage::Combine,
        Stage::Deliver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExtractKc => "extract-kc",
            Stage::ExtractKcp => "extract-kcp",
            Stage::Combine => "combine",
            Stage::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s.trim())
            .ok_or_else(|| PipelineError::UnknownStage(s.to_string()))
    }
}

// ==========================================
// StageOutcome / RunReport - 执行结果
// ==========================================

/// 单阶段执行结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageOutcome {
    Extracted {
        kind: ReportKind,
        rows: usize,
        no_data: Option<NoDataReason>,
    },
    Combined {
        rows: usize,
        output_path: PathBuf,
    },
    Delivered {
        receipt: DeliveryReceipt,
    },
}

/// 完整运行报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub kc_rows: usize,
    pub kcp_rows: usize,
    pub combined_rows: usize,
    pub output_path: PathBuf,
    pub receipt: DeliveryReceipt,
}

/// 合并完成标记的交接 key
pub const COMBINED_STAGE_KEY: &str = "combined";

/// 生成运行 ID
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

// ==========================================
// PipelineOrchestrator - 流水线编排器
// ==========================================
pub struct PipelineOrchestrator {
    config: Arc<PipelineConfig>,
    extractor: ReportExtractor,
    store: Arc<dyn HandoffStore>,
    delivery: Arc<dyn DeliveryService>,
}

impl PipelineOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 已校验的流水线配置
    /// - source: 工作表源
    /// - store: 阶段交接存储
    /// - delivery: 分发服务
    ///
    /// # 返回
    /// - Err(Config): 模板布局不合法
    pub fn new(
        config: Arc<PipelineConfig>,
        source: Arc<dyn SheetSource>,
        store: Arc<dyn HandoffStore>,
        delivery: Arc<dyn DeliveryService>,
    ) -> PipelineResult<Self> {
        let mapper = Arc::new(UnitMapper::new(config.effective_unit_map()));
        let extractor = ReportExtractor::from_config(&config, source, mapper)?;
        Ok(Self {
            config,
            extractor,
            store,
            delivery,
        })
    }

    /// 执行完整流水线（新的 run_id）
    ///
    /// # 返回
    /// - Ok(RunReport): 四个阶段全部成功
    /// - Err: 首个失败阶段的错误，后续阶段不执行
    #[instrument(skip(self))]
    pub async fn run(&self) -> PipelineResult<RunReport> {
        let run_id = new_run_id();
        info!(run_id = %run_id, periode = %self.config.periode, "开始运行流水线");

        let kc = self.extract_stage(ReportKind::Kc, &run_id).await?;
        let kcp = self.extract_stage(ReportKind::Kcp, &run_id).await?;
        let combined_rows = self.combine_stage(&run_id).await?;
        let receipt = self.deliver_stage(&run_id).await?;

        info!(
            run_id = %run_id,
            combined_rows = combined_rows,
            delivery_id = %receipt.delivery_id,
            "流水线运行完成"
        );
        Ok(RunReport {
            run_id,
            kc_rows: kc.row_count(),
            kcp_rows: kcp.row_count(),
            combined_rows,
            output_path: self.config.output_path.clone(),
            receipt,
        })
    }

    /// 单独执行一个阶段（外部调度器分进程调用）
    #[instrument(skip(self, stage), fields(stage = %stage))]
    pub async fn run_stage(&self, stage: Stage, run_id: &str) -> PipelineResult<StageOutcome> {
        match stage {
            Stage::ExtractKc | Stage::ExtractKcp => {
                let kind = if stage == Stage::ExtractKc {
                    ReportKind::Kc
                } else {
                    ReportKind::Kcp
                };
                let outcome = self.extract_stage(kind, run_id).await?;
                let no_data = match &outcome {
                    ExtractOutcome::NoData { reason, .. } => Some(*reason),
                    ExtractOutcome::Data(_) => None,
                };
                Ok(StageOutcome::Extracted {
                    kind,
                    rows: outcome.row_count(),
                    no_data,
                })
            }
            Stage::Combine => {
                let rows = self.combine_stage(run_id).await?;
                Ok(StageOutcome::Combined {
                    rows,
                    output_path: self.config.output_path.clone(),
                })
            }
            Stage::Deliver => {
                let receipt = self.deliver_stage(run_id).await?;
                Ok(StageOutcome::Delivered { receipt })
            }
        }
    }

    // ==========================================
    // 阶段实现
    // ==========================================

    async fn extract_stage(&self, kind: ReportKind, run_id: &str) -> PipelineResult<ExtractOutcome> {
        let workbook = match kind {
            ReportKind::Kc => &self.config.source.kc_workbook,
            ReportKind::Kcp => &self.config.source.kcp_workbook,
        };

        let outcome = self.extractor.extract(workbook, kind);
        if let ExtractOutcome::NoData { reason, message } = &outcome {
            warn!(run_id = run_id, kind = %kind, reason = %reason, message = %message, "抽取无数据");
        }

        self.store
            .put(run_id, kind.stage_key(), &StagePayload::from_outcome(&outcome))
            .await?;
        info!(
            run_id = run_id,
            stage_key = kind.stage_key(),
            rows = outcome.row_count(),
            "抽取结果已交接"
        );
        Ok(outcome)
    }

    async fn combine_stage(&self, run_id: &str) -> PipelineResult<usize> {
        let kc = self.load_upstream(run_id, ReportKind::Kc).await?;
        let kcp = self.load_upstream(run_id, ReportKind::Kcp).await?;

        let combined = match combine_outcomes(kc, kcp) {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(run_id = run_id, error = %e, "合并中止，未写出输出文件");
                return Err(e);
            }
        };

        write_dataset(&combined, &self.config.output_path)?;

        let purged = self.store.purge_run(run_id).await?;
        let marker = StagePayload::Combined {
            rows: combined.len(),
            output_path: self.config.output_path.clone(),
        };
        self.store.put(run_id, COMBINED_STAGE_KEY, &marker).await?;
        info!(
            run_id = run_id,
            rows = combined.len(),
            purged = purged,
            path = %self.config.output_path.display(),
            "合并完成"
        );
        Ok(combined.len())
    }

    /// 只分发本次运行合并写出的文件；没有合并完成标记时拒绝分发
    async fn deliver_stage(&self, run_id: &str) -> PipelineResult<DeliveryReceipt> {
        let output_path = match self.store.get(run_id, COMBINED_STAGE_KEY).await? {
            Some(StagePayload::Combined { output_path, .. }) => output_path,
            _ => {
                error!(run_id = run_id, "本次运行没有合并完成标记，拒绝分发");
                return Err(PipelineError::MissingUpstreamData {
                    missing: vec![COMBINED_STAGE_KEY.to_string()],
                });
            }
        };

        let request = DeliveryRequest::from_config(&self.config.delivery, vec![output_path]);
        let receipt = self.delivery.deliver(&request).await?;

        self.store.purge_run(run_id).await?;
        info!(run_id = run_id, delivery_id = %receipt.delivery_id, "分发完成");
        Ok(receipt)
    }

    async fn load_upstream(
        &self,
        run_id: &str,
        kind: ReportKind,
    ) -> PipelineResult<Option<ExtractOutcome>> {
        match self.store.get(run_id, kind.stage_key()).await? {
            Some(payload) => Ok(Some(payload.into_outcome()?)),
            None => Ok(None),
        }
    }
}

/// 合并两份抽取结果（KC 行在前，KCP 行在后）
///
/// 任一方未交接或为 NoData 时返回 MissingUpstreamData，列出缺失的 key
pub fn combine_outcomes(
    kc: Option<ExtractOutcome>,
    kcp: Option<ExtractOutcome>,
) -> PipelineResult<Dataset> {
    let mut missing = Vec::new();
    let mut parts = Vec::with_capacity(2);

    for (kind, outcome) in [(ReportKind::Kc, kc), (ReportKind::Kcp, kcp)] {
        match outcome.and_then(ExtractOutcome::into_dataset) {
            Some(dataset) => parts.push(dataset),
            None => missing.push(kind.stage_key().to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::MissingUpstreamData { missing });
    }
    Ok(Dataset::concat(parts))
}

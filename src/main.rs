// ==========================================
// KC/KCP 绩效报表 ETL - 命令行入口
// ==========================================
// 由外部调度器调用；调度、重试均在外部
// run: 单进程执行全部阶段（内存交接）
// extract / combine / deliver: 分进程执行单个阶段（SQLite 交接）
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kinerja_etl::config::{config_keys, ConfigManager, PipelineConfig};
use kinerja_etl::delivery::build_delivery;
use kinerja_etl::engine::{new_run_id, PipelineOrchestrator, Stage, UnitMapper};
use kinerja_etl::importer::ExcelSheetSource;
use kinerja_etl::repository::{HandoffStore, InMemoryHandoffStore, SqliteHandoffStore};
use kinerja_etl::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kinerja-etl")]
#[command(about = "KC/KCP performance report ETL: extract, clean, combine and deliver")]
#[command(version)]
struct Cli {
    /// JSON config file (default: $KINERJA_ETL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report period written to every row, DD/MM/YYYY
    #[arg(long, global = true)]
    periode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage in order within this process
    Run,
    /// Extract one workbook and store the result for a run
    Extract {
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Run id shared by the stages of one run (generated when omitted)
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Combine both extraction results and write the output file
    Combine {
        #[arg(long)]
        run_id: String,
    },
    /// Hand the output file of a combined run to the configured delivery channel
    Deliver {
        #[arg(long)]
        run_id: String,
    },
    /// Print the parent unit for a unit name
    ResolveUnit { name: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Kc,
    Kcp,
}

impl KindArg {
    fn stage(self) -> Stage {
        match self {
            KindArg::Kc => Stage::ExtractKc,
            KindArg::Kcp => Stage::ExtractKcp,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("warning: 日志系统初始化失败: {}", e);
    }

    if let Err(e) = execute(cli).await {
        error!(error = %format!("{:#}", e), "运行失败");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = Arc::new(load_config(&cli)?);
    info!(app = APP_NAME, version = VERSION, "启动");

    match cli.command {
        Commands::Run => {
            let store: Arc<dyn HandoffStore> = Arc::new(InMemoryHandoffStore::new());
            let report = orchestrator(&config, store)?.run().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Extract { kind, run_id } => {
            let run_id = run_id.unwrap_or_else(new_run_id);
            let outcome = orchestrator(&config, sqlite_store(&config)?)?
                .run_stage(kind.stage(), &run_id)
                .await?;
            println!(
                "{}",
                serde_json::json!({ "run_id": run_id, "outcome": outcome })
            );
        }
        Commands::Combine { run_id } => {
            let outcome = orchestrator(&config, sqlite_store(&config)?)?
                .run_stage(Stage::Combine, &run_id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Deliver { run_id } => {
            let outcome = orchestrator(&config, sqlite_store(&config)?)?
                .run_stage(Stage::Deliver, &run_id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::ResolveUnit { name } => {
            let mapper = UnitMapper::new(config.effective_unit_map());
            println!("{}", mapper.resolve_parent(&name));
        }
    }
    Ok(())
}

/// 默认值 < 配置文件 < 环境变量 < 命令行
fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var(config_keys::CONFIG_PATH).ok().map(PathBuf::from));

    let mut config = ConfigManager::load(path.as_deref()).context("配置加载失败")?;
    if let Some(periode) = &cli.periode {
        config.periode = periode.trim().to_string();
        ConfigManager::validate(&config).context("--periode 无效")?;
    }
    Ok(config)
}

fn orchestrator(
    config: &Arc<PipelineConfig>,
    store: Arc<dyn HandoffStore>,
) -> Result<PipelineOrchestrator> {
    let orchestrator = PipelineOrchestrator::new(
        config.clone(),
        Arc::new(ExcelSheetSource::new(config.source.dir.clone())),
        store,
        build_delivery(&config.delivery),
    )?;
    Ok(orchestrator)
}

fn sqlite_store(config: &PipelineConfig) -> Result<Arc<dyn HandoffStore>> {
    let store = SqliteHandoffStore::open(&config.handoff_db_path).with_context(|| {
        format!("无法打开交接数据库 {}", config.handoff_db_path.display())
    })?;
    Ok(Arc::new(store))
}

//! BoxOps CLI 应用

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "boxops")]
#[command(about = "BoxOps - 机箱重启恢复运维台", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行重启恢复工作流
    Run(RunArgs),

    /// 管理域端点管理
    Endpoint {
        #[command(subcommand)]
        action: EndpointAction,
    },

    /// 测试用例跟踪
    Testcase {
        #[command(subcommand)]
        action: TestcaseAction,
    },

    /// 运行日志管理
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
}

/// 工作流运行参数
///
/// 三个分支开关沿用运维台的 Yes/No 口径，大小写不敏感。
#[derive(Args)]
pub struct RunArgs {
    /// 目标机箱名
    pub system: String,

    /// 是否执行完整 ESX 重启路径 (Yes/No)
    #[arg(long, default_value = "No")]
    pub esx_reboot: String,

    /// 是否执行仅 VM 重启路径 (Yes/No)
    #[arg(long, default_value = "No")]
    pub vm_reboot: String,

    /// 是否刷新 Adios 版本 (Yes/No)
    #[arg(long, default_value = "No")]
    pub update_adios: String,

    /// Adios 发布版本标识（--update-adios Yes 时必填）
    #[arg(long)]
    pub adios_version: Option<String>,

    /// ACLX 恢复的目标虚拟机名子串
    #[arg(long)]
    pub aclx_hostname: Option<String>,

    /// ACLX 恢复脚本在目标机上的路径
    #[arg(long)]
    pub aclx_script: Option<String>,
}

#[derive(Subcommand)]
pub enum EndpointAction {
    /// 列出管理域端点（顺序即发现优先级）
    List,

    /// 添加管理域端点（追加到优先级末尾）
    Add {
        /// 端点名称
        name: String,
        /// 管理域地址
        server: String,
        /// 用户名
        #[arg(long, short = 'u')]
        username: String,
        /// 密码
        #[arg(long, short = 'p')]
        password: String,
    },

    /// 移除管理域端点
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum TestcaseAction {
    /// 显示用例摘要
    Show {
        /// 用例号 (TC-xxxxx)
        id: String,

        /// Bearer 令牌（缺省读 BOXOPS_API_TOKEN 环境变量）
        #[arg(long)]
        token: Option<String>,
    },

    /// 显示测试步骤
    Steps {
        /// 用例号 (TC-xxxxx)
        id: String,

        #[arg(long)]
        token: Option<String>,
    },

    /// 回写自动化状态字段
    SetAutomationStatus {
        /// 用例号 (TC-xxxxx)
        id: String,

        /// 状态字段值 ID
        value: i64,

        #[arg(long)]
        token: Option<String>,
    },

    /// 删除用例全部附件
    ClearAttachments {
        /// 用例号 (TC-xxxxx)
        id: String,

        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LogsAction {
    /// 显示最新一份运行日志
    Latest,

    /// 日志目录统计
    Stats {
        /// 过期阈值（小时）
        #[arg(long, default_value = "24")]
        hours: u64,
    },

    /// 清理过期日志
    Cleanup {
        /// 过期阈值（小时）
        #[arg(long, default_value = "24")]
        hours: u64,
    },
}

fn init_console_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // run 自行初始化双路日志（控制台 + 每次运行一份文件）
        Commands::Run(args) => commands::run::handle(args, &cli.log_level).await?,
        Commands::Endpoint { action } => {
            init_console_logging(&cli.log_level);
            commands::endpoint::handle(action)?
        }
        Commands::Testcase { action } => {
            init_console_logging(&cli.log_level);
            commands::testcase::handle(action).await?
        }
        Commands::Logs { action } => {
            init_console_logging(&cli.log_level);
            commands::logs::handle(action)?
        }
    }

    Ok(())
}

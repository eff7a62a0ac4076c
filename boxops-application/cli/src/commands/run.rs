//! 重启恢复工作流命令

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxops_common::{parse_yes_no, RunRequest};
use boxops_orchestrator::{
    HostWorkflow, PlatformSessionProvider, SshShellConnector, SystemPinger,
};

use crate::config::CliConfig;
use crate::RunArgs;

/// 初始化双路日志：控制台 + 每次运行一份文件
///
/// 文件名 `{BOX}_log_{YYYY-MM-DD_HH-MM-SS}.log`，放在配置的日志目录下。
fn init_run_logging(log_dir: &str, boxname: &str, log_level: &str) -> Result<String> {
    fs::create_dir_all(log_dir).with_context(|| format!("创建日志目录失败: {}", log_dir))?;

    let filename = format!(
        "{}_log_{}.log",
        boxname,
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let path = Path::new(log_dir).join(&filename);
    let file = File::create(&path).with_context(|| format!("创建日志文件失败: {:?}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();

    Ok(filename)
}

pub async fn handle(args: RunArgs, log_level: &str) -> Result<()> {
    let config = CliConfig::load()?;
    if config.endpoints.is_empty() {
        anyhow::bail!("未配置任何管理域端点，请先执行 boxops endpoint add");
    }

    let boxname = args.system.to_uppercase();
    let filename = init_run_logging(&config.log_dir, &boxname, log_level)?;
    info!("运行日志: {}/{}", config.log_dir, filename);

    let request = RunRequest {
        system: args.system,
        esx_reboot: parse_yes_no(&args.esx_reboot),
        vm_reboot: parse_yes_no(&args.vm_reboot),
        update_adios: parse_yes_no(&args.update_adios),
        adios_version: args.adios_version,
        aclx_hostname: args.aclx_hostname,
        aclx_script: args.aclx_script,
    };

    let workflow = HostWorkflow::new(
        Arc::new(PlatformSessionProvider::default()),
        Arc::new(SshShellConnector::default()),
        Arc::new(SystemPinger),
        config.endpoints.clone(),
        config.workflow.clone(),
    );

    let outcome = workflow.run(&request).await.context("工作流执行失败")?;

    println!("管理域: {}", outcome.endpoint_name);
    println!("主机 {} 台, 虚拟机 {} 台", outcome.hosts.len(), outcome.vms.len());
    let failed = outcome
        .remote_results
        .iter()
        .filter(|(_, result)| result.is_err())
        .count();
    for (name, result) in &outcome.remote_results {
        match result {
            Ok(()) => println!("  {} 就绪", name),
            Err(e) => println!("  {} 失败: {}", name, e),
        }
    }
    if failed > 0 {
        println!("{} 台机器配置失败，详见运行日志", failed);
    }

    Ok(())
}

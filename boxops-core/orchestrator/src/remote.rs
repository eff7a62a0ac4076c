//! 远端调度器配置
//!
//! 虚拟机控制台就绪后，登录每台机器把调度器带回可用状态：
//! 1. 调度器仍在运行则先杀掉，等状态离开 Running；
//! 2. 未处于 DNR 则下发 dexit -all，等状态收敛到 DNR；
//! 3. 固定静置后按需刷新 adios 版本；
//! 4. 下发 adiosx config，在第二条会话上等状态收敛到 Ready。
//!
//! 各台机器并发处理，单台失败不影响其余；每台的结果单独收集。
//! 状态轮询带截止时间，到期返回超时错误（原流程在这里会无限等待）。

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::config::WorkflowConfig;
use crate::credentials::Credential;
use crate::error::{OrchestratorError, Result};
use crate::shell::{RemoteShell, ShellConnector};

/// 调度器状态查询（首行 STATE 字段）
pub const STATE_QUERY: &str = "axcli state | grep STATE | awk 'NR==1'";
/// 杀掉调度器进程
pub const KILL_SCHEDULER: &str = "kill -9";
/// 全部桌面退出
pub const DEXIT_ALL: &str = "axcli dexit -all";
/// 调度器配置
pub const ADIOSX_CONFIG: &str = "axcli adiosx config";

/// adios 版本刷新命令
pub fn axinstall_command(release: &str) -> String {
    format!("/usr/adios/axinstall -b {}", release)
}

/// 远端调度器配置器
pub struct RemoteConfigurator {
    connector: Arc<dyn ShellConnector>,
    config: Arc<WorkflowConfig>,
}

impl RemoteConfigurator {
    pub fn new(connector: Arc<dyn ShellConnector>, config: Arc<WorkflowConfig>) -> Self {
        Self { connector, config }
    }

    /// 并发配置一批虚拟机的调度器
    ///
    /// 返回每台机器的处理结果（顺序不保证与输入一致）。
    /// 地址未上报的机器直接跳过，不产生结果项。
    pub async fn ready_hosts(
        &self,
        credentials: &[Credential],
        do_update: bool,
        release: Option<&str>,
    ) -> Vec<(String, Result<()>)> {
        info!("配置远端调度器 ...");
        let mut tasks = JoinSet::new();

        for credential in credentials {
            if credential.address.is_none() {
                continue;
            }

            let connector = Arc::clone(&self.connector);
            let config = Arc::clone(&self.config);
            let credential = credential.clone();
            let release = release.map(str::to_string);

            tasks.spawn(async move {
                let name = credential.host_name.clone();
                let result =
                    configure_host(connector.as_ref(), &config, &credential, do_update, release)
                        .await;
                (name, result)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, result)) => {
                    if let Err(e) = &result {
                        error!("{} 调度器配置失败: {}", name, e);
                    }
                    results.push((name, result));
                }
                Err(e) => {
                    error!("调度器配置任务异常退出: {}", e);
                }
            }
        }
        results
    }

    /// 恢复指定虚拟机上的 ACLX 数据库
    ///
    /// 按名称（大小写不敏感的包含匹配）在凭据列表中找目标机，
    /// 上传好的脚本先放开权限，静置后以 python3 或直接方式执行。
    pub async fn setup_aclx(
        &self,
        credentials: &[Credential],
        hostname: &str,
        script_name: &str,
    ) -> Result<()> {
        let needle = hostname.to_lowercase();
        let credential = credentials
            .iter()
            .find(|c| c.host_name.to_lowercase().contains(&needle))
            .ok_or_else(|| {
                OrchestratorError::ConfigError(format!("凭据列表中未找到 {}", hostname))
            })?;

        let (address, username, password) = usable_login(credential)?;
        let shell = self.connector.open(address, username, password).await?;

        info!("开始执行 ACLX 恢复脚本 ...");
        shell.run(&format!("chmod 777 {}", script_name)).await?;
        info!("脚本权限已放开");
        sleep(self.config.aclx_settle_delay).await;

        let command = if script_name.ends_with(".py") {
            format!("python3 {}", script_name)
        } else {
            script_name.to_string()
        };
        let output = shell.run(&command).await?;

        if output.is_success() {
            info!("{} 的 ACLX 数据库恢复成功", hostname);
            Ok(())
        } else {
            Err(OrchestratorError::SessionError(format!(
                "ACLX 恢复脚本退出码 {:?}",
                output.exit_code
            )))
        }
    }
}

fn usable_login(credential: &Credential) -> Result<(&str, &str, &str)> {
    match (
        credential.address.as_deref(),
        credential.username.as_deref(),
        credential.password.as_deref(),
    ) {
        (Some(address), Some(username), Some(password)) => Ok((address, username, password)),
        _ => Err(OrchestratorError::ConfigError(format!(
            "{} 没有可用的 SSH 凭据",
            credential.host_name
        ))),
    }
}

/// 配置单台虚拟机的调度器
async fn configure_host(
    connector: &dyn ShellConnector,
    config: &WorkflowConfig,
    credential: &Credential,
    do_update: bool,
    release: Option<String>,
) -> Result<()> {
    let name = &credential.host_name;
    let (address, username, password) = usable_login(credential)?;

    // 主会话下发命令，第二条会话只做最终的 Ready 轮询
    let shell = connector.open(address, username, password).await?;
    let watch_shell = connector.open(address, username, password).await?;

    let mut state = shell.run(STATE_QUERY).await?.stdout;

    if state.contains("Running") {
        info!("{} 调度器仍在运行，先行终止", name);
        shell.run(KILL_SCHEDULER).await?;
        state = poll_state_until(shell.as_ref(), config, name, |s| !s.contains("Running")).await?;
    }

    if !state.contains("DNR") {
        shell.run(DEXIT_ALL).await?;
        poll_state_until(shell.as_ref(), config, name, |s| s.contains("DNR")).await?;
        info!("{} 调度器已置为 Not Ready", name);
    }

    sleep(config.settle_delay).await;

    if do_update {
        let release = release.ok_or_else(|| {
            OrchestratorError::ConfigError("刷新 adios 需要指定版本号".to_string())
        })?;
        info!("{} 刷新 adios 版本: {}", name, release);
        let output = shell.run(&axinstall_command(&release)).await?;
        if output.is_success() {
            info!("{} 的 adios 已更新", name);
        } else {
            error!("{} adios 更新退出码 {:?}", name, output.exit_code);
        }
    }

    // 配置前再取一次状态（仅记录，不参与分支）
    let _ = shell.run(STATE_QUERY).await?;
    info!("{} 配置调度器 ...", name);
    let output = shell.run(ADIOSX_CONFIG).await?;
    if output.is_success() {
        info!("{} 调度器配置完成", name);
    } else {
        error!("{} 调度器配置退出码 {:?}", name, output.exit_code);
    }

    poll_state_until(watch_shell.as_ref(), config, name, |s| s.contains("Ready")).await?;
    info!("{} 已就绪", name);
    Ok(())
}

/// 轮询调度器状态直到谓词成立或超时
async fn poll_state_until(
    shell: &dyn RemoteShell,
    config: &WorkflowConfig,
    name: &str,
    predicate: impl Fn(&str) -> bool,
) -> Result<String> {
    let deadline = Instant::now() + config.service_state_deadline;
    loop {
        let output = shell.run(STATE_QUERY).await?;
        if predicate(&output.stdout) {
            return Ok(output.stdout);
        }

        if Instant::now() >= deadline {
            return Err(OrchestratorError::Timeout(format!(
                "{} 调度器状态在截止时间内未收敛（当前: {}）",
                name,
                output.stdout.trim()
            )));
        }
        sleep(config.service_poll_interval).await;
    }
}

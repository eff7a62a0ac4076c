//! 主机维护模式控制
//!
//! 主机重启后拓扑解析阶段拿到的句柄已失效，
//! 进入/退出维护模式前都按名称对全域主机视图重新解析
//! （发现名包含在视图名中即命中，两边的命名粒度不同）。
//! 操作幂等：已处于目标维护状态的主机直接跳过。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::error::{OrchestratorError, Result};
use crate::session::{HostRef, ManagementSession, TaskHandle, TaskStatus};

/// 维护模式控制器
pub struct MaintenanceController<'a> {
    session: &'a dyn ManagementSession,
    task_timeout_secs: u32,
    poll_interval: Duration,
}

impl<'a> MaintenanceController<'a> {
    pub fn new(
        session: &'a dyn ManagementSession,
        task_timeout_secs: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            session,
            task_timeout_secs,
            poll_interval,
        }
    }

    /// 让一批主机进入维护模式
    pub async fn enter_all(&self, hosts: &[HostRef]) -> Result<()> {
        info!("主机进入维护模式 ...");
        for host in hosts {
            if let Err(e) = self.enter(host).await {
                error!("主机 {} 进入维护模式失败: {}", host.name, e);
            }
        }
        Ok(())
    }

    /// 让一批主机退出维护模式
    pub async fn exit_all(&self, hosts: &[HostRef]) -> Result<()> {
        info!("主机退出维护模式 ...");
        for host in hosts {
            if let Err(e) = self.exit(host).await {
                error!("主机 {} 退出维护模式失败: {}", host.name, e);
            }
        }
        Ok(())
    }

    /// 单台主机进入维护模式
    pub async fn enter(&self, host: &HostRef) -> Result<()> {
        let current = self.re_resolve(host).await?;
        let state = self.session.host_state(&current).await?;
        if state.in_maintenance {
            info!("主机 {} 已处于维护模式，跳过", current.name);
            return Ok(());
        }

        info!("主机 {} 进入维护模式 ...", current.name);
        let task = self
            .session
            .enter_maintenance(&current, self.task_timeout_secs)
            .await?;
        self.wait_task(&current.name, &task).await?;
        info!("主机 {} 已进入维护模式", current.name);
        Ok(())
    }

    /// 单台主机退出维护模式
    pub async fn exit(&self, host: &HostRef) -> Result<()> {
        let current = self.re_resolve(host).await?;
        let state = self.session.host_state(&current).await?;
        if !state.in_maintenance {
            info!("主机 {} 不在维护模式中，跳过", current.name);
            return Ok(());
        }

        info!("主机 {} 退出维护模式 ...", current.name);
        let task = self
            .session
            .exit_maintenance(&current, self.task_timeout_secs)
            .await?;
        self.wait_task(&current.name, &task).await?;
        info!("主机 {} 已退出维护模式", current.name);
        Ok(())
    }

    /// 按名称对全域主机视图重新解析句柄
    async fn re_resolve(&self, host: &HostRef) -> Result<HostRef> {
        let view = self.session.host_view().await?;
        view.into_iter()
            .find(|candidate| candidate.name.contains(&host.name))
            .ok_or_else(|| {
                OrchestratorError::SessionError(format!("主机视图中未找到 {}", host.name))
            })
    }

    /// 轮询维护任务直到终态
    async fn wait_task(&self, host_name: &str, task: &TaskHandle) -> Result<()> {
        loop {
            let status = self.session.task_status(task).await?;
            match status {
                TaskStatus::Success => return Ok(()),
                TaskStatus::Error(message) => {
                    return Err(OrchestratorError::TaskFailed(format!(
                        "{}: {}",
                        host_name, message
                    )));
                }
                _ => sleep(self.poll_interval).await,
            }
        }
    }
}

//! 主机重启
//!
//! 和维护模式一样，下发前按名称对全域主机视图重新解析句柄。
//! 管理域不为强制重启返回可轮询任务，进度只能通过连接状态观察，分两个阶段：
//! 1. 等待主机失联（确认重启真的开始了）；
//! 2. 等待主机重新连上管理域。
//!
//! 两个阶段都有独立的截止时间。失联阶段到期只告警后直接进入重连阶段
//! （重启可能快到在两次采样之间完成）；重连阶段到期返回超时错误。
//! 主机离线期间状态查询本身会报错，按"尚未到达目标状态"处理。

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::error::{OrchestratorError, Result};
use crate::session::{HostRef, ManagementSession};

/// 主机重启控制器
pub struct RebootController<'a> {
    session: &'a dyn ManagementSession,
    poll_interval: Duration,
    phase_deadline: Duration,
}

impl<'a> RebootController<'a> {
    pub fn new(
        session: &'a dyn ManagementSession,
        poll_interval: Duration,
        phase_deadline: Duration,
    ) -> Self {
        Self {
            session,
            poll_interval,
            phase_deadline,
        }
    }

    /// 依次重启一批主机并等待回连
    pub async fn reboot_all(&self, hosts: &[HostRef]) -> Result<()> {
        info!("重启主机 ...");
        for host in hosts {
            if let Err(e) = self.reboot_and_wait(host).await {
                error!("主机 {} 重启失败: {}", host.name, e);
            }
        }
        Ok(())
    }

    /// 重启单台主机并等待其重新连上管理域
    pub async fn reboot_and_wait(&self, host: &HostRef) -> Result<()> {
        let current = self.re_resolve(host).await?;
        info!("[重启] 下发主机重启: {}", current.name);
        self.session.reboot_host(&current).await?;

        self.wait_disconnect(&current).await;
        self.wait_reconnect(&current).await
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

    /// 阶段一：等待主机失联
    async fn wait_disconnect(&self, host: &HostRef) {
        let deadline = Instant::now() + self.phase_deadline;
        loop {
            match self.session.host_state(host).await {
                Ok(state) if state.is_not_responding() => {
                    info!("[重启] 主机 {} 已失联，重启进行中", host.name);
                    return;
                }
                Ok(state) => {
                    info!(
                        "[重启] 主机 {} 连接状态={} 电源状态={}，等待失联 ...",
                        host.name, state.connection_state, state.power_state
                    );
                }
                Err(e) => {
                    // 离线主机的状态查询报错同样说明重启已开始
                    info!("[重启] 查询 {} 状态失败（按失联处理）: {}", host.name, e);
                    return;
                }
            }

            if Instant::now() >= deadline {
                warn!(
                    "[重启] 主机 {} 在截止时间内未观察到失联，可能在两次采样间完成了重启",
                    host.name
                );
                return;
            }
            sleep(self.poll_interval).await;
        }
    }

    /// 阶段二：等待主机重新连上
    async fn wait_reconnect(&self, host: &HostRef) -> Result<()> {
        let deadline = Instant::now() + self.phase_deadline;
        loop {
            match self.session.host_state(host).await {
                Ok(state) if state.is_connected() => {
                    info!("[重启] 主机 {} 已重新连接", host.name);
                    return Ok(());
                }
                Ok(state) => {
                    info!(
                        "[重启] 主机 {} 连接状态={} 电源状态={}，等待回连 ...",
                        host.name, state.connection_state, state.power_state
                    );
                }
                Err(e) => {
                    info!("[重启] 查询 {} 状态失败（继续等待）: {}", host.name, e);
                }
            }

            if Instant::now() >= deadline {
                return Err(OrchestratorError::Timeout(format!(
                    "主机 {} 在截止时间内未重新连接",
                    host.name
                )));
            }
            sleep(self.poll_interval).await;
        }
    }
}

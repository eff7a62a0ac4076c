//! 控制台就绪等待
//!
//! 虚拟机开机后逐台 ping 其客户机地址，直到可达或到期。
//! 未上报地址的虚拟机直接跳过（只告警）；单台超时记录错误后继续下一台。

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::error::{OrchestratorError, Result};
use crate::topology::VmAddress;

/// 可达性探测
#[async_trait]
pub trait Pinger: Send + Sync {
    /// 目标地址当前是否可达
    async fn is_reachable(&self, address: &str) -> bool;
}

/// 基于系统 ping 命令的探测
pub struct SystemPinger;

#[async_trait]
impl Pinger for SystemPinger {
    async fn is_reachable(&self, address: &str) -> bool {
        #[cfg(target_os = "windows")]
        let count_flag = "-n";
        #[cfg(not(target_os = "windows"))]
        let count_flag = "-c";

        match Command::new("ping")
            .arg(count_flag)
            .arg("1")
            .arg(address)
            .output()
            .await
        {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// 就绪等待器
pub struct ReadinessWaiter<'a> {
    pinger: &'a dyn Pinger,
    poll_interval: Duration,
    deadline: Duration,
}

impl<'a> ReadinessWaiter<'a> {
    pub fn new(pinger: &'a dyn Pinger, poll_interval: Duration, deadline: Duration) -> Self {
        Self {
            pinger,
            poll_interval,
            deadline,
        }
    }

    /// 依次等待一批虚拟机控制台就绪
    pub async fn wait_all(&self, addresses: &[VmAddress]) -> Result<()> {
        info!("等待虚拟机控制台就绪 ...");
        for entry in addresses {
            let Some(address) = &entry.address else {
                warn!("{} 未上报客户机地址，跳过就绪等待", entry.name);
                continue;
            };
            if let Err(e) = self.wait_one(&entry.name, address).await {
                error!("{} 就绪等待失败: {}", entry.name, e);
            }
        }
        Ok(())
    }

    /// 等待单台虚拟机可达
    pub async fn wait_one(&self, name: &str, address: &str) -> Result<()> {
        let deadline = Instant::now() + self.deadline;
        loop {
            if self.pinger.is_reachable(address).await {
                info!("{} ({}) 已可达", name, address);
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(OrchestratorError::Timeout(format!(
                    "{} ({}) 在截止时间内未可达",
                    name, address
                )));
            }

            info!("{} ({}) 尚不可达，继续等待 ...", name, address);
            sleep(self.poll_interval).await;
        }
    }
}

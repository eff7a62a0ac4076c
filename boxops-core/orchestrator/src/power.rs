//! 虚拟机电源控制
//!
//! 关机/开机都是幂等操作：已经处于目标状态的虚拟机直接跳过，
//! 其余提交电源任务并轮询到终态。单台失败只记录日志，不影响同批其他虚拟机。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::error::{OrchestratorError, Result};
use crate::session::{ManagementSession, PowerState, TaskHandle, TaskStatus, VmRef};

/// 虚拟机电源控制器
pub struct PowerController<'a> {
    session: &'a dyn ManagementSession,
    poll_interval: Duration,
}

impl<'a> PowerController<'a> {
    pub fn new(session: &'a dyn ManagementSession, poll_interval: Duration) -> Self {
        Self {
            session,
            poll_interval,
        }
    }

    /// 依次硬关机一批虚拟机
    pub async fn power_off_all(&self, vms: &[VmRef]) -> Result<()> {
        info!("关闭虚拟机电源 ...");
        for vm in vms {
            if let Err(e) = self.power_off(vm).await {
                error!("关闭 {} 失败: {}", vm.name, e);
            }
        }
        Ok(())
    }

    /// 依次开启一批虚拟机
    pub async fn power_on_all(&self, vms: &[VmRef]) -> Result<()> {
        info!("开启虚拟机电源 ...");
        for vm in vms {
            if let Err(e) = self.power_on(vm).await {
                error!("开启 {} 失败: {}", vm.name, e);
            }
        }
        Ok(())
    }

    /// 硬关机单台虚拟机（已关机则跳过）
    pub async fn power_off(&self, vm: &VmRef) -> Result<()> {
        let state = self.session.vm_power_state(vm).await?;
        if state == PowerState::PoweredOff {
            info!("{} 已处于关机状态，跳过", vm.name);
            return Ok(());
        }

        info!("关闭虚拟机: {}", vm.name);
        let task = self.session.power_off_vm(vm).await?;
        self.wait_task(&vm.name, &task).await?;
        info!("{} 已关机", vm.name);
        Ok(())
    }

    /// 开启单台虚拟机（已开机则跳过）
    pub async fn power_on(&self, vm: &VmRef) -> Result<()> {
        let state = self.session.vm_power_state(vm).await?;
        if state == PowerState::PoweredOn {
            info!("{} 已处于开机状态，跳过", vm.name);
            return Ok(());
        }

        info!("开启虚拟机: {}", vm.name);
        let task = self.session.power_on_vm(vm).await?;
        self.wait_task(&vm.name, &task).await?;
        info!("{} 已开机", vm.name);
        Ok(())
    }

    /// 轮询电源任务直到终态
    async fn wait_task(&self, vm_name: &str, task: &TaskHandle) -> Result<()> {
        loop {
            let status = self.session.task_status(task).await?;
            match status {
                TaskStatus::Success => return Ok(()),
                TaskStatus::Error(message) => {
                    return Err(OrchestratorError::TaskFailed(format!(
                        "{}: {}",
                        vm_name, message
                    )));
                }
                _ => sleep(self.poll_interval).await,
            }
        }
    }
}

//! 管理域会话的 REST 实现
//!
//! 把 [`boxops_platform::PlatformClient`] 适配成编排器的
//! [`ManagementSession`] / [`SessionProvider`]。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use boxops_platform::{
    InventoryObject, ObjectKind, PlatformClient, PlatformConfig, TaskState,
};

use crate::config::ManagementEndpoint;
use crate::error::{OrchestratorError, Result};
use crate::session::{
    ComputeResourceRef, FolderRef, HostRef, HostState, InventoryEntity, ManagementSession,
    PowerState, SessionProvider, TaskHandle, TaskStatus, VmRef,
};

/// 基于 REST 客户端的管理域会话
pub struct PlatformSession {
    client: PlatformClient,
}

impl PlatformSession {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

fn entity_from_object(obj: InventoryObject) -> InventoryEntity {
    match obj.kind {
        ObjectKind::Folder => InventoryEntity::Folder(FolderRef {
            id: obj.id,
            name: obj.name,
            parent_name: obj.parent_name,
        }),
        ObjectKind::ComputeResource => InventoryEntity::ComputeResource(ComputeResourceRef {
            id: obj.id,
            name: obj.name,
        }),
        ObjectKind::HostSystem => InventoryEntity::Host(HostRef {
            id: obj.id,
            name: obj.name,
        }),
        ObjectKind::VirtualMachine => InventoryEntity::Vm(VmRef {
            id: obj.id,
            name: obj.name,
        }),
    }
}

fn vm_from_object(obj: InventoryObject) -> VmRef {
    VmRef {
        id: obj.id,
        name: obj.name,
    }
}

fn parse_power_state(raw: &str) -> Result<PowerState> {
    match raw.to_ascii_lowercase().as_str() {
        "poweredon" => Ok(PowerState::PoweredOn),
        "poweredoff" => Ok(PowerState::PoweredOff),
        "suspended" => Ok(PowerState::Suspended),
        other => Err(OrchestratorError::SessionError(format!(
            "未知的电源状态: {}",
            other
        ))),
    }
}

#[async_trait]
impl ManagementSession for PlatformSession {
    async fn root_view(&self) -> Result<Vec<InventoryEntity>> {
        let objects = self.client.inventory().view(None).await?;
        Ok(objects.into_iter().map(entity_from_object).collect())
    }

    async fn folder_view(&self, folder: &FolderRef) -> Result<Vec<InventoryEntity>> {
        let objects = self.client.inventory().view(Some(&folder.id)).await?;
        Ok(objects.into_iter().map(entity_from_object).collect())
    }

    async fn host_view(&self) -> Result<Vec<HostRef>> {
        let objects = self.client.inventory().host_view().await?;
        Ok(objects
            .into_iter()
            .map(|obj| HostRef {
                id: obj.id,
                name: obj.name,
            })
            .collect())
    }

    async fn compute_resource_vms(&self, cr: &ComputeResourceRef) -> Result<Vec<VmRef>> {
        let objects = self.client.inventory().compute_resource_vms(&cr.id).await?;
        Ok(objects.into_iter().map(vm_from_object).collect())
    }

    async fn host_vms(&self, host: &HostRef) -> Result<Vec<VmRef>> {
        let objects = self.client.inventory().host_vms(&host.id).await?;
        Ok(objects.into_iter().map(vm_from_object).collect())
    }

    async fn vm_power_state(&self, vm: &VmRef) -> Result<PowerState> {
        let runtime = self.client.vm().runtime(&vm.id).await?;
        parse_power_state(&runtime.power_state)
    }

    async fn vm_guest_address(&self, vm: &VmRef) -> Result<Option<String>> {
        let runtime = self.client.vm().runtime(&vm.id).await?;
        Ok(runtime.guest_address)
    }

    async fn power_off_vm(&self, vm: &VmRef) -> Result<TaskHandle> {
        let task = self.client.vm().power_off(&vm.id).await?;
        Ok(TaskHandle(task.id))
    }

    async fn power_on_vm(&self, vm: &VmRef) -> Result<TaskHandle> {
        let task = self.client.vm().power_on(&vm.id).await?;
        Ok(TaskHandle(task.id))
    }

    async fn host_state(&self, host: &HostRef) -> Result<HostState> {
        let runtime = self.client.host().runtime(&host.id).await?;
        Ok(HostState {
            connection_state: runtime.connection_state,
            power_state: runtime.power_state,
            in_maintenance: runtime.in_maintenance,
        })
    }

    async fn enter_maintenance(&self, host: &HostRef, timeout_secs: u32) -> Result<TaskHandle> {
        let task = self
            .client
            .host()
            .enter_maintenance(&host.id, timeout_secs)
            .await?;
        Ok(TaskHandle(task.id))
    }

    async fn exit_maintenance(&self, host: &HostRef, timeout_secs: u32) -> Result<TaskHandle> {
        let task = self
            .client
            .host()
            .exit_maintenance(&host.id, timeout_secs)
            .await?;
        Ok(TaskHandle(task.id))
    }

    async fn reboot_host(&self, host: &HostRef) -> Result<()> {
        self.client.host().reboot(&host.id, true).await?;
        Ok(())
    }

    async fn task_status(&self, task: &TaskHandle) -> Result<TaskStatus> {
        let info = self.client.task().get(&task.0).await?;
        Ok(match info.state {
            TaskState::Queued => TaskStatus::Queued,
            TaskState::Running => TaskStatus::Running,
            TaskState::Success => TaskStatus::Success,
            TaskState::Error => {
                TaskStatus::Error(info.error.unwrap_or_else(|| "未知任务错误".to_string()))
            }
        })
    }
}

/// 按端点建立 REST 会话
pub struct PlatformSessionProvider {
    config: PlatformConfig,
}

impl PlatformSessionProvider {
    pub fn new(config: PlatformConfig) -> Self {
        Self { config }
    }
}

impl Default for PlatformSessionProvider {
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

#[async_trait]
impl SessionProvider for PlatformSessionProvider {
    async fn connect(&self, endpoint: &ManagementEndpoint) -> Result<Arc<dyn ManagementSession>> {
        info!("连接管理域: {} ({})", endpoint.name, endpoint.server);
        let client = PlatformClient::new(&endpoint.server, self.config.clone())?;
        client.login(&endpoint.username, &endpoint.password).await?;
        Ok(Arc::new(PlatformSession::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_power_state() {
        assert_eq!(parse_power_state("poweredOn").unwrap(), PowerState::PoweredOn);
        assert_eq!(
            parse_power_state("POWEREDOFF").unwrap(),
            PowerState::PoweredOff
        );
        assert_eq!(
            parse_power_state("suspended").unwrap(),
            PowerState::Suspended
        );
        assert!(parse_power_state("sleeping").is_err());
    }
}

//! 虚拟机管理 API

use reqwest::Method;
use tracing::info;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::models::{TaskInfo, VmRuntime};

/// 虚拟机管理 API
pub struct VmApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> VmApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// 查询虚拟机运行时状态（电源状态 + 客户机地址）
    pub async fn runtime(&self, vm_id: &str) -> Result<VmRuntime> {
        self.client
            .request(
                Method::GET,
                &format!("/api/v1/vms/{}/runtime", vm_id),
                None::<()>,
            )
            .await
    }

    /// 硬关机（返回任务句柄）
    pub async fn power_off(&self, vm_id: &str) -> Result<TaskInfo> {
        info!("请求关闭虚拟机: {}", vm_id);
        self.client
            .request(
                Method::POST,
                &format!("/api/v1/vms/{}/power-off", vm_id),
                None::<()>,
            )
            .await
    }

    /// 开机（返回任务句柄）
    pub async fn power_on(&self, vm_id: &str) -> Result<TaskInfo> {
        info!("请求启动虚拟机: {}", vm_id);
        self.client
            .request(
                Method::POST,
                &format!("/api/v1/vms/{}/power-on", vm_id),
                None::<()>,
            )
            .await
    }
}

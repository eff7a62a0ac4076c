//! 清单管理 API
//!
//! 容器视图是递归的：`view(None)` 返回根文件夹之下的全部对象，
//! `view(Some(id))` 返回指定容器之下的全部对象（含各级子对象）。

use reqwest::Method;
use tracing::info;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::models::InventoryObject;

/// 清单管理 API
pub struct InventoryApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> InventoryApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// 获取容器视图（递归）
    pub async fn view(&self, container_id: Option<&str>) -> Result<Vec<InventoryObject>> {
        let path = match container_id {
            Some(id) => format!("/api/v1/inventory/view?container={}", id),
            None => "/api/v1/inventory/view".to_string(),
        };
        self.client.request(Method::GET, &path, None::<()>).await
    }

    /// 查询计算资源资源池下的虚拟机列表
    pub async fn compute_resource_vms(&self, cr_id: &str) -> Result<Vec<InventoryObject>> {
        info!("查询计算资源虚拟机列表: {}", cr_id);
        self.client
            .request(
                Method::GET,
                &format!("/api/v1/compute-resources/{}/vms", cr_id),
                None::<()>,
            )
            .await
    }

    /// 查询主机直属虚拟机列表
    pub async fn host_vms(&self, host_id: &str) -> Result<Vec<InventoryObject>> {
        info!("查询主机虚拟机列表: {}", host_id);
        self.client
            .request(
                Method::GET,
                &format!("/api/v1/hosts/{}/vms", host_id),
                None::<()>,
            )
            .await
    }

    /// 获取全域主机视图（供按名称重新解析句柄使用）
    pub async fn host_view(&self) -> Result<Vec<InventoryObject>> {
        self.client
            .request(Method::GET, "/api/v1/inventory/hosts", None::<()>)
            .await
    }
}

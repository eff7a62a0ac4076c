//! 主机管理 API

use reqwest::Method;
use tracing::info;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::models::{HostRuntime, TaskInfo};

/// 主机管理 API
pub struct HostApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> HostApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// 查询主机运行时状态
    pub async fn runtime(&self, host_id: &str) -> Result<HostRuntime> {
        self.client
            .request(
                Method::GET,
                &format!("/api/v1/hosts/{}/runtime", host_id),
                None::<()>,
            )
            .await
    }

    /// 进入维护模式（返回任务句柄）
    pub async fn enter_maintenance(&self, host_id: &str, timeout_secs: u32) -> Result<TaskInfo> {
        info!("请求进入维护模式: {}", host_id);
        self.client
            .request(
                Method::POST,
                &format!("/api/v1/hosts/{}/enter-maintenance", host_id),
                Some(serde_json::json!({
                    "timeout": timeout_secs,
                    "evacuatePoweredOffVms": false,
                })),
            )
            .await
    }

    /// 退出维护模式（返回任务句柄）
    pub async fn exit_maintenance(&self, host_id: &str, timeout_secs: u32) -> Result<TaskInfo> {
        info!("请求退出维护模式: {}", host_id);
        self.client
            .request(
                Method::POST,
                &format!("/api/v1/hosts/{}/exit-maintenance", host_id),
                Some(serde_json::json!({ "timeout": timeout_secs })),
            )
            .await
    }

    /// 强制重启主机
    ///
    /// 平台不为重启返回可轮询任务，重启进度只能通过连接状态观察。
    pub async fn reboot(&self, host_id: &str, force: bool) -> Result<()> {
        info!("请求重启主机: {} (force={})", host_id, force);
        let _: serde_json::Value = self
            .client
            .request(
                Method::POST,
                &format!("/api/v1/hosts/{}/reboot", host_id),
                Some(serde_json::json!({ "force": force })),
            )
            .await?;
        Ok(())
    }
}

//! 任务管理 API

use reqwest::Method;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::models::TaskInfo;

/// 任务管理 API
pub struct TaskApi<'a> {
    client: &'a PlatformClient,
}

impl<'a> TaskApi<'a> {
    pub(crate) fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// 查询任务状态
    pub async fn get(&self, task_id: &str) -> Result<TaskInfo> {
        self.client
            .request(
                Method::GET,
                &format!("/api/v1/tasks/{}", task_id),
                None::<()>,
            )
            .await
    }
}

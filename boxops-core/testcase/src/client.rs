//! 测试用例跟踪客户端核心实现

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth;
use crate::error::{Result, TestcaseError};
use crate::models::{Attachment, TestStep, TestcaseRecord, TestcaseSummary};

/// 测试用例客户端配置
#[derive(Debug, Clone)]
pub struct TestcaseConfig {
    /// 跟踪系统 API 基础 URL
    pub base_url: String,

    /// 项目 ID
    pub project_id: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,
}

impl TestcaseConfig {
    pub fn new(base_url: impl Into<String>, project_id: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id,
            request_timeout: 30,
        }
    }
}

/// 测试用例跟踪客户端
///
/// 以 Bearer 令牌认证。令牌由用户整串提供（含前缀），
/// 创建时校验格式，首次调用前可用 [`TestcaseClient::probe`] 验证有效性。
pub struct TestcaseClient {
    config: TestcaseConfig,
    http_client: Client,
    /// 裸令牌（不含 "Bearer " 前缀）
    token: String,
}

impl TestcaseClient {
    /// 创建客户端（bearer_string 须为 "Bearer <token>" 格式）
    pub fn new(config: TestcaseConfig, bearer_string: &str) -> Result<Self> {
        let token = auth::extract_token(bearer_string)?;

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            config,
            http_client,
            token,
        })
    }

    /// 用项目列表接口试探令牌有效性
    pub async fn probe(&self) -> Result<()> {
        let url = format!("{}/projects", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                info!("令牌验证通过");
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(TestcaseError::AuthenticationError(
                "令牌无效或已过期".to_string(),
            )),
            StatusCode::FORBIDDEN => {
                Err(TestcaseError::PermissionDenied("令牌权限不足".to_string()))
            }
            status => Err(TestcaseError::ApiError {
                status: status.as_u16(),
                message: "令牌试探失败".to_string(),
            }),
        }
    }

    /// 拉取用例完整记录
    pub async fn fetch_record(&self, testcase_id: &str) -> Result<TestcaseRecord> {
        self.request(
            Method::GET,
            &format!("/test-cases/{}", testcase_id),
            None::<()>,
        )
        .await
    }

    /// 拉取用例并抽取控制台关心的字段
    pub async fn fetch_summary(&self, testcase_id: &str) -> Result<(TestcaseSummary, u64)> {
        let record = self.fetch_record(testcase_id).await?;
        Ok((TestcaseSummary::from_record(&record), record.id))
    }

    /// 拉取测试步骤
    pub async fn fetch_test_steps(&self, internal_id: u64) -> Result<Vec<TestStep>> {
        self.request(
            Method::GET,
            &format!("/test-cases/{}/test-steps", internal_id),
            None::<()>,
        )
        .await
    }

    /// 拉取附件列表
    pub async fn fetch_attachments(&self, internal_id: u64) -> Result<Vec<Attachment>> {
        self.request(
            Method::GET,
            &format!("/test-cases/{}/attachments", internal_id),
            None::<()>,
        )
        .await
    }

    /// 更新自动化状态字段
    ///
    /// 跟踪系统要求整条记录回写：先取全量记录，
    /// 改写目标字段的 field_value 后整体 PUT 回去。
    pub async fn update_automation_status(
        &self,
        testcase_id: &str,
        status_value: serde_json::Value,
    ) -> Result<()> {
        let mut record: serde_json::Value = self
            .request(
                Method::GET,
                &format!("/test-cases/{}", testcase_id),
                None::<()>,
            )
            .await?;

        let internal_id = record["id"]
            .as_u64()
            .ok_or_else(|| TestcaseError::ParseError("用例记录缺少内部 ID".to_string()))?;

        let properties = record["properties"].as_array_mut().ok_or_else(|| {
            TestcaseError::ParseError("用例记录缺少 properties".to_string())
        })?;
        let mut found = false;
        for property in properties {
            if property["field_name"] == "Automation Status" {
                property["field_value"] = status_value.clone();
                found = true;
            }
        }
        if !found {
            return Err(TestcaseError::ParseError(
                "用例记录没有 Automation Status 字段".to_string(),
            ));
        }

        info!("回写用例 {} 的自动化状态", testcase_id);
        let _: serde_json::Value = self
            .request(
                Method::PUT,
                &format!("/test-cases/{}", internal_id),
                Some(record),
            )
            .await?;
        Ok(())
    }

    /// 删除用例的全部附件
    ///
    /// 返回成功删除的数量；单个删除失败只告警，不中断。
    pub async fn remove_attachments(&self, internal_id: u64) -> Result<usize> {
        let attachments = self.fetch_attachments(internal_id).await?;
        if attachments.is_empty() {
            return Ok(0);
        }

        let mut deleted = 0;
        for attachment in attachments {
            let url = format!(
                "{}/projects/{}/test-cases/{}/blob-handles/{}",
                self.config.base_url, self.config.project_id, internal_id, attachment.id
            );
            let response = self
                .http_client
                .delete(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;
            if response.status().is_success() {
                deleted += 1;
            } else {
                warn!("删除附件 {} 失败: HTTP {}", attachment.id, response.status());
            }
        }
        Ok(deleted)
    }

    /// 发送项目作用域内的 API 请求
    async fn request<T: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<T>,
    ) -> Result<R> {
        let url = format!(
            "{}/projects/{}{}",
            self.config.base_url, self.config.project_id, path
        );
        debug!("用例跟踪 API 请求: {} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Cache-Control", "no-cache")
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        match status {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(TestcaseError::AuthenticationError(
                    "令牌无效或已过期".to_string(),
                ));
            }
            StatusCode::FORBIDDEN => {
                return Err(TestcaseError::PermissionDenied(url));
            }
            status => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "无法读取错误响应".to_string());
                warn!("用例跟踪 API 请求失败: {} - {}", status, message);
                return Err(TestcaseError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        response
            .json::<R>()
            .await
            .map_err(|e| TestcaseError::ParseError(e.to_string()))
    }
}

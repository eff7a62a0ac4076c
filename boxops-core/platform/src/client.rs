//! 管理域客户端核心实现

use std::sync::Arc;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{HostApi, InventoryApi, TaskApi, VmApi};
use crate::error::{PlatformError, Result};

/// 管理域客户端配置
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书（实验室管理域多为自签名证书）
    pub verify_ssl: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            request_timeout: 60,
            verify_ssl: false,
        }
    }
}

/// 管理域客户端
///
/// 一个实例对应一个管理域的一次登录会话。
/// 工作流每次运行都新建会话，不跨运行复用。
pub struct PlatformClient {
    /// API 基础 URL
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 会话令牌
    session_token: Arc<RwLock<Option<String>>>,
}

impl PlatformClient {
    /// 创建新的管理域客户端
    pub fn new(server: &str, config: PlatformConfig) -> Result<Self> {
        let base_url = if server.starts_with("http://") || server.starts_with("https://") {
            server.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", server.trim_end_matches('/'))
        };

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| PlatformError::HttpError(e.to_string()))?;

        Ok(Self {
            base_url,
            http_client,
            session_token: Arc::new(RwLock::new(None)),
        })
    }

    /// 登录管理域
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        info!("登录管理域: {} ({})", self.base_url, username);

        let login_url = format!("{}/api/v1/session", self.base_url);
        let login_data = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .http_client
            .post(&login_url)
            .json(&login_data)
            .send()
            .await
            .map_err(|e| PlatformError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::AuthError(format!(
                "管理域登录失败: HTTP {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::ParseError(e.to_string()))?;

        let token = body["token"]
            .as_str()
            .ok_or_else(|| PlatformError::AuthError("登录响应缺少会话令牌".to_string()))?
            .to_string();

        *self.session_token.write().await = Some(token);

        info!("管理域登录成功: {}", self.base_url);
        Ok(())
    }

    /// 注销会话
    pub async fn logout(&self) -> Result<()> {
        info!("注销管理域会话: {}", self.base_url);
        *self.session_token.write().await = None;
        Ok(())
    }

    /// 获取清单管理 API
    pub fn inventory(&self) -> InventoryApi<'_> {
        InventoryApi::new(self)
    }

    /// 获取主机管理 API
    pub fn host(&self) -> HostApi<'_> {
        HostApi::new(self)
    }

    /// 获取虚拟机管理 API
    pub fn vm(&self) -> VmApi<'_> {
        VmApi::new(self)
    }

    /// 获取任务管理 API
    pub fn task(&self) -> TaskApi<'_> {
        TaskApi::new(self)
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送 HTTP 请求
    pub(crate) async fn request<T: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<T>,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!("管理域 API 请求: {} {}", method, url);

        let token = self.session_token.read().await;
        let token_str = token
            .as_ref()
            .ok_or_else(|| PlatformError::AuthError("未认证，请先登录".to_string()))?;

        let mut request = self
            .http_client
            .request(method, &url)
            .header("X-Session-Token", token_str)
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::HttpError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PlatformError::NotFound(url));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "无法读取错误响应".to_string());
            warn!("API 请求失败: {} - {}", status, error_text);
            return Err(PlatformError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| PlatformError::ParseError(e.to_string()))
    }
}

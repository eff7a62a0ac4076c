//! 管理域客户端错误定义

use thiserror::Error;

/// 管理域错误类型
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("HTTP 错误: {0}")]
    HttpError(String),

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("API 错误 [{0}]: {1}")]
    ApiError(u16, String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("任务失败: {0}")]
    TaskFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 管理域结果类型
pub type Result<T> = std::result::Result<T, PlatformError>;

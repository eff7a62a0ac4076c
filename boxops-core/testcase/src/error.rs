//! 测试用例客户端错误定义

use thiserror::Error;

/// 测试用例客户端结果类型
pub type Result<T> = std::result::Result<T, TestcaseError>;

/// 测试用例客户端错误类型
#[derive(Error, Debug)]
pub enum TestcaseError {
    /// HTTP 请求错误
    #[error("HTTP 请求失败: {0}")]
    RequestError(#[from] reqwest::Error),

    /// 令牌格式错误
    #[error("令牌格式错误: {0}")]
    TokenFormat(String),

    /// 认证失败（令牌无效或过期）
    #[error("认证失败: {0}")]
    AuthenticationError(String),

    /// 权限不足
    #[error("权限不足: {0}")]
    PermissionDenied(String),

    /// 服务端返回错误
    #[error("服务端错误 ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// 响应解析错误
    #[error("响应解析失败: {0}")]
    ParseError(String),
}

//! 编排器错误定义

use thiserror::Error;

/// 编排器错误类型
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// 所有管理域都未找到目标系统
    #[error("未在任何管理域中找到目标系统: {0}")]
    NotFound(String),

    /// 找到主机但没有虚拟机，无法继续
    #[error("目标系统没有可操作的虚拟机: {0}")]
    EmptyTopology(String),

    /// 管理域会话错误
    #[error("管理域会话错误: {0}")]
    SessionError(String),

    /// 管理域任务失败
    #[error("任务失败: {0}")]
    TaskFailed(String),

    /// SSH 错误
    #[error("SSH 错误: {0}")]
    Ssh(#[from] boxops_ssh_executor::SshError),

    /// 等待外部状态收敛超时
    #[error("等待超时: {0}")]
    Timeout(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<boxops_platform::PlatformError> for OrchestratorError {
    fn from(e: boxops_platform::PlatformError) -> Self {
        OrchestratorError::SessionError(e.to_string())
    }
}

impl OrchestratorError {
    /// 是否为 SSH 认证失败（凭据探测据此排除候选密码）
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Ssh(boxops_ssh_executor::SshError::AuthenticationError(_))
        )
    }
}

/// 编排器结果类型
pub type Result<T> = std::result::Result<T, OrchestratorError>;

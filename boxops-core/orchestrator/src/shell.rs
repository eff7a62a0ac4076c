//! 远程 shell 抽象
//!
//! 凭据探测和远端配置都通过这里的 trait 打开连接、执行命令：
//! 生产路径由系统 ssh/sshpass 实现，测试以脚本化的假 shell 替换。
//!
//! 连接总是按单次操作的粒度打开，用完即丢，不跨阶段复用句柄。

use std::time::Duration;

use async_trait::async_trait;

use boxops_ssh_executor::{SshClient, SshConfig};

use crate::error::Result;

/// 远程命令输出
#[derive(Debug, Clone, Default)]
pub struct ShellOutput {
    /// 标准输出
    pub stdout: String,
    /// 退出码
    pub exit_code: Option<u32>,
}

impl ShellOutput {
    /// 命令是否成功退出
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 一条已认证的远程 shell 会话
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// 执行命令并等待输出
    async fn run(&self, command: &str) -> Result<ShellOutput>;
}

/// 远程 shell 连接器
///
/// 打开失败时必须区分认证失败与其他错误
/// （凭据探测按 [`crate::error::OrchestratorError::is_auth_failure`] 排除候选密码）。
#[async_trait]
pub trait ShellConnector: Send + Sync {
    /// 打开一条到目标地址的已认证会话
    async fn open(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn RemoteShell>>;
}

/// 基于系统 ssh/sshpass 的远程 shell
pub struct SshShell {
    client: SshClient,
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        let output = self.client.execute(command).await?;
        Ok(ShellOutput {
            stdout: output.stdout,
            exit_code: output.exit_code,
        })
    }
}

/// 基于系统 ssh/sshpass 的连接器
pub struct SshShellConnector {
    /// 单条远端命令的超时（dexit/axinstall 可能运行数分钟）
    command_timeout: Duration,
}

impl SshShellConnector {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }
}

impl Default for SshShellConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

#[async_trait]
impl ShellConnector for SshShellConnector {
    async fn open(
        &self,
        address: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn RemoteShell>> {
        let config = SshConfig::with_password(address, username, password)
            .command_timeout(self.command_timeout);
        let client = SshClient::connect(config).await?;
        Ok(Box::new(SshShell { client }))
    }
}

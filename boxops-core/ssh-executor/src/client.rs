//! SSH 客户端实现
//!
//! 使用系统 ssh/sshpass 命令执行远程命令，兼容性更好。
//! 每次执行都会新建一个 ssh 进程，因此客户端本身无持久连接状态，
//! 凭据探测和远端配置可以各自按需创建/丢弃客户端而不泄漏句柄。

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::{AuthMethod, SshConfig};
use crate::error::{Result, SshError};

/// 命令执行输出
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// 标准输出
    pub stdout: String,
    /// 标准错误
    pub stderr: String,
    /// 退出码
    pub exit_code: Option<u32>,
}

impl CommandOutput {
    /// 检查命令是否成功执行
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 获取合并的输出（stdout + stderr）
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// SSH 客户端（使用系统 ssh 命令）
pub struct SshClient {
    config: SshConfig,
}

impl SshClient {
    /// 连接到 SSH 服务器（通过执行一条探活命令验证凭据）
    ///
    /// 密码错误会返回 [`SshError::AuthenticationError`]，
    /// 凭据探测依赖这一点逐个排除候选密码。
    pub async fn connect(config: SshConfig) -> Result<Self> {
        info!("正在连接 SSH: {}@{}", config.username, config.address());

        let client = Self { config };

        // 验证连接（执行简单命令）
        let output = client.execute("echo connected").await?;

        if output.stdout.trim() != "connected" {
            return Err(SshError::ConnectionError(format!(
                "SSH 连接验证失败: {}",
                output.stderr
            )));
        }

        info!(
            "SSH 连接成功: {}@{}",
            client.config.username,
            client.config.address()
        );
        Ok(client)
    }

    /// 执行命令
    pub async fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!("执行命令: {}", command);

        timeout(self.config.command_timeout, self.execute_internal(command))
            .await
            .map_err(|_| SshError::TimeoutError(format!("命令执行超时: {}", command)))?
    }

    /// 执行命令内部实现
    async fn execute_internal(&self, command: &str) -> Result<CommandOutput> {
        let mut cmd = match &self.config.auth {
            AuthMethod::Password(password) => {
                // 使用 sshpass 进行密码认证
                let mut cmd = Command::new("sshpass");
                cmd.arg("-p").arg(password);
                cmd.arg("ssh");
                cmd
            }
            AuthMethod::Key { key_path } => {
                let mut cmd = Command::new("ssh");
                cmd.arg("-i").arg(expand_path(key_path)?);
                cmd
            }
            AuthMethod::DefaultKey => Command::new("ssh"),
        };

        // 通用 SSH 参数
        cmd.arg("-o")
            .arg("StrictHostKeyChecking=no")
            .arg("-o")
            .arg("UserKnownHostsFile=/dev/null")
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.config.connect_timeout.as_secs()
            ))
            .arg("-o")
            .arg("NumberOfPasswordPrompts=1")
            .arg("-p")
            .arg(self.config.port.to_string())
            .arg(format!("{}@{}", self.config.username, self.config.host))
            .arg(command);

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|e| SshError::ExecutionError(format!("启动 SSH 进程失败: {}", e)))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SshError::ExecutionError(format!("等待 SSH 进程失败: {}", e)))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().map(|c| c as u32),
        };

        // sshpass 退出码 5 表示密码错误，ssh 255 需要结合 stderr 判断
        if result.exit_code == Some(5)
            || (result.exit_code == Some(255)
                && (result.stderr.contains("Permission denied")
                    || result.stderr.contains("Authentication failed")
                    || result.stderr.contains("password")))
        {
            return Err(SshError::AuthenticationError(format!(
                "SSH 认证失败: {}",
                result.stderr
            )));
        }

        debug!(
            "命令执行完成, 退出码: {:?}, stdout 长度: {}, stderr 长度: {}",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }

    /// 执行命令并检查是否成功
    pub async fn execute_checked(&self, command: &str) -> Result<CommandOutput> {
        let output = self.execute(command).await?;

        if !output.is_success() {
            return Err(SshError::ExecutionError(format!(
                "命令执行失败 (退出码 {:?}): {}",
                output.exit_code,
                if output.stderr.is_empty() {
                    &output.stdout
                } else {
                    &output.stderr
                }
            )));
        }

        Ok(output)
    }

    /// 关闭连接（对于系统 ssh 命令，无需显式关闭）
    pub async fn disconnect(self) -> Result<()> {
        Ok(())
    }

    /// 获取配置
    pub fn config(&self) -> &SshConfig {
        &self.config
    }
}

/// 展开路径（处理 ~ 等）
fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    if path_str.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
            return Ok(PathBuf::from(expanded));
        }
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output() {
        let output = CommandOutput {
            stdout: "STATE: Running".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert!(output.is_success());
        assert_eq!(output.combined_output(), "STATE: Running");
    }

    #[test]
    fn test_command_output_failure() {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: "axcli: command not found".to_string(),
            exit_code: Some(127),
        };
        assert!(!output.is_success());
        assert_eq!(output.combined_output(), "axcli: command not found");
    }

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("/etc/hosts");
        let expanded = expand_path(&path).unwrap();
        assert_eq!(expanded, path);
    }
}

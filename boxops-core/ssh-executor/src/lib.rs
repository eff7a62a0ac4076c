//! BoxOps SSH 执行器
//!
//! 提供 SSH 远程命令执行能力，支持：
//! - 密码认证（凭据探测依赖认证失败的精确识别）
//! - SSH 密钥认证
//! - 命令执行和输出捕获
//! - 连接/命令级超时
//!
//! # 示例
//!
//! ```ignore
//! use boxops_ssh_executor::{SshClient, SshConfig};
//!
//! // 使用密码认证
//! let config = SshConfig::with_password("192.168.1.100", "root", "password");
//! let client = SshClient::connect(config).await?;
//! let output = client.execute("axcli state").await?;
//! println!("{}", output.stdout);
//! ```

mod client;
mod config;
mod error;

pub use client::{CommandOutput, SshClient};
pub use config::{AuthMethod, SshConfig};
pub use error::{Result, SshError};

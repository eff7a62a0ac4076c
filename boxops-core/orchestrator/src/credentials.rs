//! SSH 凭据探测
//!
//! 机箱内各虚拟机的 root 密码不统一，按候选列表顺序逐个试连，
//! 首个能建立会话的密码生效。认证失败和连接失败都只是排除当前候选。
//! 全部落空或地址未上报时记为无凭据，由后续阶段跳过该机。

use tracing::{info, warn};

use crate::config::WorkflowConfig;
use crate::shell::ShellConnector;
use crate::topology::VmAddress;

/// 一台虚拟机的探测结果
#[derive(Debug, Clone)]
pub struct Credential {
    /// 虚拟机名
    pub host_name: String,
    /// 客户机地址（未上报时为 None）
    pub address: Option<String>,
    /// 探测成功的用户名
    pub username: Option<String>,
    /// 探测成功的密码
    pub password: Option<String>,
}

impl Credential {
    /// 是否探测到了可用凭据
    pub fn is_usable(&self) -> bool {
        self.address.is_some() && self.password.is_some()
    }
}

/// 凭据探测器
pub struct CredentialProber<'a> {
    connector: &'a dyn ShellConnector,
    config: &'a WorkflowConfig,
}

impl<'a> CredentialProber<'a> {
    pub fn new(connector: &'a dyn ShellConnector, config: &'a WorkflowConfig) -> Self {
        Self { connector, config }
    }

    /// 逐台探测一批虚拟机
    ///
    /// 结果与输入一一对应，顺序保持不变。
    pub async fn probe_all(&self, addresses: &[VmAddress]) -> Vec<Credential> {
        info!("探测虚拟机 SSH 凭据 ...");
        let mut credentials = Vec::with_capacity(addresses.len());
        for entry in addresses {
            credentials.push(self.probe_one(entry).await);
        }
        credentials
    }

    /// 探测单台虚拟机
    pub async fn probe_one(&self, entry: &VmAddress) -> Credential {
        let Some(address) = &entry.address else {
            warn!("{} 未上报客户机地址，跳过凭据探测", entry.name);
            return Credential {
                host_name: entry.name.clone(),
                address: None,
                username: None,
                password: None,
            };
        };

        let username = &self.config.ssh_username;
        for password in &self.config.ssh_passwords {
            match self.connector.open(address, username, password).await {
                Ok(_) => {
                    info!("{} ({}) 凭据探测成功", entry.name, address);
                    return Credential {
                        host_name: entry.name.clone(),
                        address: Some(address.clone()),
                        username: Some(username.clone()),
                        password: Some(password.clone()),
                    };
                }
                Err(e) if e.is_auth_failure() => {
                    info!("{} ({}) 候选密码被拒绝，尝试下一个", entry.name, address);
                }
                Err(e) => {
                    warn!(
                        "{} ({}) 连接失败，尝试下一个候选: {}",
                        entry.name, address, e
                    );
                }
            }
        }

        warn!("{} ({}) 所有候选密码均失败", entry.name, address);
        Credential {
            host_name: entry.name.clone(),
            address: Some(address.clone()),
            username: None,
            password: None,
        }
    }
}

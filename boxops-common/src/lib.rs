//! BoxOps 通用类型定义
//!
//! 此 crate 包含 CLI 与编排器之间共享的请求/结果类型。

use serde::{Deserialize, Serialize};

/// 主机运维工作流请求（来自 UI/CLI 边界）
///
/// 对应运维台的一次提交：目标机箱名加三个互斥分支开关。
/// 分支优先级：esx_reboot > vm_reboot > update_adios（仅更新）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// 目标机箱名（必填，匹配时统一转大写）
    pub system: String,

    /// 是否执行完整 ESX 重启路径
    #[serde(default)]
    pub esx_reboot: bool,

    /// 是否执行仅 VM 重启路径
    #[serde(default)]
    pub vm_reboot: bool,

    /// 是否更新 Adios 版本
    #[serde(default)]
    pub update_adios: bool,

    /// Adios 发布版本标识（重启路径或更新路径必填）
    pub adios_version: Option<String>,

    /// ACLX 目标主机名子串（可选）
    pub aclx_hostname: Option<String>,

    /// ACLX 恢复脚本路径（可选，与 aclx_hostname 配合）
    pub aclx_script: Option<String>,
}

impl RunRequest {
    /// 创建最小请求（仅目标机箱名）
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            esx_reboot: false,
            vm_reboot: false,
            update_adios: false,
            adios_version: None,
            aclx_hostname: None,
            aclx_script: None,
        }
    }

    /// 是否配置了 ACLX 恢复步骤
    pub fn has_aclx(&self) -> bool {
        self.aclx_hostname.is_some() && self.aclx_script.is_some()
    }
}

/// 解析 UI 边界的 "Yes"/"No" 字符串（大小写不敏感）
pub fn parse_yes_no(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

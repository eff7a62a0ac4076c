//! 工作流配置
//!
//! 所有轮询间隔与截止时间都来自这里，默认值即生产值。
//! 测试把间隔压到毫秒级以便快速运行。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 一个管理域的接入凭据
///
/// 进程启动时一次性加载，顺序即发现优先级：
/// 目标系统在多个管理域中同名时，第一个命中的管理域生效，后面的被静默忽略。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementEndpoint {
    /// 管理域名称（仅用于日志）
    pub name: String,

    /// 管理域地址
    pub server: String,

    /// 用户名
    pub username: String,

    /// 密码
    pub password: String,
}

/// 工作流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// 电源任务轮询间隔
    #[serde(with = "humantime_serde", default = "default_task_poll_interval")]
    pub task_poll_interval: Duration,

    /// 维护模式任务超时（秒，传给管理域）
    #[serde(default = "default_maintenance_task_timeout")]
    pub maintenance_task_timeout_secs: u32,

    /// 维护模式任务轮询间隔
    #[serde(with = "humantime_serde", default = "default_maintenance_poll_interval")]
    pub maintenance_poll_interval: Duration,

    /// 重启连接状态轮询间隔
    #[serde(with = "humantime_serde", default = "default_reboot_poll_interval")]
    pub reboot_poll_interval: Duration,

    /// 重启每个阶段（失联等待/重连等待）的截止时间
    #[serde(with = "humantime_serde", default = "default_reboot_phase_deadline")]
    pub reboot_phase_deadline: Duration,

    /// 控制台就绪 ping 轮询间隔
    #[serde(with = "humantime_serde", default = "default_readiness_poll_interval")]
    pub readiness_poll_interval: Duration,

    /// 控制台就绪截止时间（每台虚拟机）
    #[serde(with = "humantime_serde", default = "default_readiness_deadline")]
    pub readiness_deadline: Duration,

    /// 调度器退出后的固定静置时间
    #[serde(with = "humantime_serde", default = "default_settle_delay")]
    pub settle_delay: Duration,

    /// 仅 VM 重启路径中关机与开机之间的间隔
    #[serde(with = "humantime_serde", default = "default_vm_power_gap")]
    pub vm_power_gap: Duration,

    /// 远端服务状态轮询间隔
    #[serde(with = "humantime_serde", default = "default_service_poll_interval")]
    pub service_poll_interval: Duration,

    /// 远端服务状态收敛截止时间
    ///
    /// 原流程在这里无限轮询，卡死的远端会永久挂住线程；
    /// 现在到期返回超时错误，由编排器记录后继续处理其余主机。
    #[serde(with = "humantime_serde", default = "default_service_state_deadline")]
    pub service_state_deadline: Duration,

    /// ACLX 脚本 chmod 后的静置时间
    #[serde(with = "humantime_serde", default = "default_aclx_settle_delay")]
    pub aclx_settle_delay: Duration,

    /// 远端 SSH 用户名
    #[serde(default = "default_ssh_username")]
    pub ssh_username: String,

    /// 候选密码列表（按序尝试，首个成功者生效）
    #[serde(default = "default_ssh_passwords")]
    pub ssh_passwords: Vec<String>,
}

fn default_task_poll_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_maintenance_task_timeout() -> u32 {
    300
}

fn default_maintenance_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_reboot_poll_interval() -> Duration {
    Duration::from_secs(120)
}

fn default_reboot_phase_deadline() -> Duration {
    Duration::from_secs(1800)
}

fn default_readiness_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_readiness_deadline() -> Duration {
    Duration::from_secs(4000)
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(20)
}

fn default_vm_power_gap() -> Duration {
    Duration::from_secs(60)
}

fn default_service_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_service_state_deadline() -> Duration {
    Duration::from_secs(1800)
}

fn default_aclx_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_ssh_username() -> String {
    "root".to_string()
}

fn default_ssh_passwords() -> Vec<String> {
    vec![
        "dangerous".to_string(),
        "D@ngerous".to_string(),
        "D@nger0us1".to_string(),
    ]
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            task_poll_interval: default_task_poll_interval(),
            maintenance_task_timeout_secs: default_maintenance_task_timeout(),
            maintenance_poll_interval: default_maintenance_poll_interval(),
            reboot_poll_interval: default_reboot_poll_interval(),
            reboot_phase_deadline: default_reboot_phase_deadline(),
            readiness_poll_interval: default_readiness_poll_interval(),
            readiness_deadline: default_readiness_deadline(),
            settle_delay: default_settle_delay(),
            vm_power_gap: default_vm_power_gap(),
            service_poll_interval: default_service_poll_interval(),
            service_state_deadline: default_service_state_deadline(),
            aclx_settle_delay: default_aclx_settle_delay(),
            ssh_username: default_ssh_username(),
            ssh_passwords: default_ssh_passwords(),
        }
    }
}

impl WorkflowConfig {
    /// 生成一个适合测试的快速配置（毫秒级轮询，短截止时间）
    pub fn fast() -> Self {
        Self {
            task_poll_interval: Duration::from_millis(1),
            maintenance_poll_interval: Duration::from_millis(1),
            reboot_poll_interval: Duration::from_millis(1),
            reboot_phase_deadline: Duration::from_millis(50),
            readiness_poll_interval: Duration::from_millis(1),
            readiness_deadline: Duration::from_millis(50),
            settle_delay: Duration::from_millis(1),
            vm_power_gap: Duration::from_millis(1),
            service_poll_interval: Duration::from_millis(1),
            service_state_deadline: Duration::from_millis(50),
            aclx_settle_delay: Duration::from_millis(1),
            ..Self::default()
        }
    }
}

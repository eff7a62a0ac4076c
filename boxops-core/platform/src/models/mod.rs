//! 管理域数据模型
//!
//! 所有数据均为 REST API 实时查询结果，无本地持久化。
//! 主机级操作（尤其是重启）会使旧句柄失效，
//! 调用方每个阶段都应重新拉取容器视图而不是缓存这些对象。

use serde::{Deserialize, Serialize};

/// 清单对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    /// 组织文件夹
    Folder,
    /// 计算资源（主机 + 资源池）
    ComputeResource,
    /// 裸主机
    HostSystem,
    /// 虚拟机
    VirtualMachine,
}

/// 清单对象（容器视图的一项）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryObject {
    /// 对象 ID（管理域内唯一）
    pub id: String,

    /// 对象名称
    pub name: String,

    /// 对象类型
    pub kind: ObjectKind,

    /// 父容器名称（根对象为 None）
    #[serde(default)]
    pub parent_name: Option<String>,
}

/// 主机运行时状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRuntime {
    /// 连接状态（"connected" / "notResponding" / "disconnected"，平台拼写不保证大小写）
    pub connection_state: String,

    /// 电源状态
    pub power_state: String,

    /// 是否处于维护模式
    #[serde(default)]
    pub in_maintenance: bool,
}

/// 虚拟机运行时状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmRuntime {
    /// 电源状态（"poweredOn" / "poweredOff" / "suspended"）
    pub power_state: String,

    /// 客户机网络地址（未上报时为 None）
    #[serde(default)]
    pub guest_address: Option<String>,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Queued,
    Running,
    Success,
    Error,
}

impl TaskState {
    /// 任务是否仍在执行
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Queued | TaskState::Running)
    }
}

/// 任务信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInfo {
    /// 任务 ID
    pub id: String,

    /// 任务状态
    pub state: TaskState,

    /// 进度（0-100，可选）
    #[serde(default)]
    pub progress: Option<u32>,

    /// 失败原因（state == error 时有值）
    #[serde(default)]
    pub error: Option<String>,
}

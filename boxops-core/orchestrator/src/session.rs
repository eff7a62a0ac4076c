//! 管理域会话抽象
//!
//! 编排器不直接依赖具体平台客户端，而是通过这里的 trait 访问清单和任务：
//! 生产路径由 [`crate::platform`] 基于 REST 客户端实现，测试以假会话替换。
//!
//! 清单对象是带标签的变体（文件夹/计算资源/主机/虚拟机），
//! 按能力分派（子对象、资源池虚拟机），不做运行时类型探测。

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ManagementEndpoint;
use crate::error::Result;

/// 文件夹句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    /// 对象 ID
    pub id: String,
    /// 名称
    pub name: String,
    /// 父容器名称（用于排除 datastore/storage 文件夹）
    pub parent_name: Option<String>,
}

/// 计算资源句柄（主机 + 资源池）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeResourceRef {
    pub id: String,
    pub name: String,
}

/// 主机句柄
///
/// 句柄只在发现它的那次容器视图内有效：主机级操作（尤其是重启）会使其失效，
/// 后续阶段必须按名称对新视图重新解析。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRef {
    pub id: String,
    pub name: String,
}

/// 虚拟机句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRef {
    pub id: String,
    pub name: String,
}

/// 清单对象（带标签的变体）
#[derive(Debug, Clone)]
pub enum InventoryEntity {
    Folder(FolderRef),
    ComputeResource(ComputeResourceRef),
    Host(HostRef),
    Vm(VmRef),
}

/// 虚拟机电源状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
}

/// 主机运行时状态
///
/// 连接状态保留平台原始字符串，比较一律大小写不敏感
/// （各平台对 "notResponding" 的拼写并不一致）。
#[derive(Debug, Clone)]
pub struct HostState {
    pub connection_state: String,
    pub power_state: String,
    pub in_maintenance: bool,
}

impl HostState {
    /// 连接状态是否为失联
    pub fn is_not_responding(&self) -> bool {
        self.connection_state.eq_ignore_ascii_case("notresponding")
    }

    /// 连接状态是否为已连接
    pub fn is_connected(&self) -> bool {
        self.connection_state.eq_ignore_ascii_case("connected")
    }
}

/// 任务句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle(pub String);

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Running,
    Success,
    Error(String),
}

impl TaskStatus {
    /// 任务是否仍在执行
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Queued | TaskStatus::Running)
    }
}

/// 一个管理域的已登录会话
#[async_trait]
pub trait ManagementSession: Send + Sync {
    /// 根容器视图（递归，包含全部层级）
    async fn root_view(&self) -> Result<Vec<InventoryEntity>>;

    /// 指定文件夹之下的容器视图（递归）
    async fn folder_view(&self, folder: &FolderRef) -> Result<Vec<InventoryEntity>>;

    /// 全域主机视图（供按名称重新解析失效句柄）
    async fn host_view(&self) -> Result<Vec<HostRef>>;

    /// 计算资源资源池下的虚拟机
    async fn compute_resource_vms(&self, cr: &ComputeResourceRef) -> Result<Vec<VmRef>>;

    /// 主机直属虚拟机
    async fn host_vms(&self, host: &HostRef) -> Result<Vec<VmRef>>;

    /// 查询虚拟机电源状态
    async fn vm_power_state(&self, vm: &VmRef) -> Result<PowerState>;

    /// 查询虚拟机客户机地址（未上报时为 None）
    async fn vm_guest_address(&self, vm: &VmRef) -> Result<Option<String>>;

    /// 硬关机
    async fn power_off_vm(&self, vm: &VmRef) -> Result<TaskHandle>;

    /// 开机
    async fn power_on_vm(&self, vm: &VmRef) -> Result<TaskHandle>;

    /// 查询主机运行时状态
    async fn host_state(&self, host: &HostRef) -> Result<HostState>;

    /// 进入维护模式
    async fn enter_maintenance(&self, host: &HostRef, timeout_secs: u32) -> Result<TaskHandle>;

    /// 退出维护模式
    async fn exit_maintenance(&self, host: &HostRef, timeout_secs: u32) -> Result<TaskHandle>;

    /// 强制重启主机（无任务句柄，进度通过连接状态观察）
    async fn reboot_host(&self, host: &HostRef) -> Result<()>;

    /// 查询任务状态
    async fn task_status(&self, task: &TaskHandle) -> Result<TaskStatus>;
}

/// 按端点建立会话
///
/// 每次工作流运行都为命中的管理域新建会话，不跨运行复用。
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// 连接并登录一个管理域
    async fn connect(&self, endpoint: &ManagementEndpoint) -> Result<Arc<dyn ManagementSession>>;
}

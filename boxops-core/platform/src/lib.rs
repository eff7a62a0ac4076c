//! BoxOps 管理域客户端
//!
//! 封装一个虚拟化控制平面实例（管理域）的 REST API：
//! - 会话登录/注销
//! - 清单容器视图（文件夹/计算资源/主机/虚拟机）
//! - 虚拟机电源任务、主机维护模式、主机强制重启
//! - 任务状态轮询
//!
//! 编排器通过 trait 间接使用本 crate，测试时以假会话替换。

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use client::{PlatformClient, PlatformConfig};
pub use error::{PlatformError, Result};
pub use models::{
    HostRuntime, InventoryObject, ObjectKind, TaskInfo, TaskState, VmRuntime,
};

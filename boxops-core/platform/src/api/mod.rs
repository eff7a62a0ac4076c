//! 管理域 API 模块

mod host;
mod inventory;
mod task;
mod vm;

pub use host::HostApi;
pub use inventory::InventoryApi;
pub use task::TaskApi;
pub use vm::VmApi;

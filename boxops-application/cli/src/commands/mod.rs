//! CLI 命令处理模块

pub mod endpoint;
pub mod logs;
pub mod run;
pub mod testcase;

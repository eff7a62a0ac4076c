//! BoxOps 测试用例跟踪客户端
//!
//! 对接外部测试用例跟踪系统：按用例号拉取记录与步骤、
//! 管理附件、回写自动化状态。认证使用整串粘贴的 Bearer 令牌。

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{extract_token, is_valid_bearer_format};
pub use client::{TestcaseClient, TestcaseConfig};
pub use error::{Result, TestcaseError};
pub use models::{Attachment, PropertyField, TestStep, TestcaseRecord, TestcaseSummary};

//! Bearer 令牌校验
//!
//! 令牌由用户整串粘贴（含 "Bearer " 前缀），先做格式校验再拆出裸令牌。

use regex::Regex;

use crate::error::{Result, TestcaseError};

/// 令牌格式是否为 "Bearer <token>"
pub fn is_valid_bearer_format(token_string: &str) -> bool {
    // 前缀后必须跟非空白的令牌体
    let pattern = Regex::new(r"^Bearer\s+\S+$").expect("内置正则");
    pattern.is_match(token_string.trim())
}

/// 从 "Bearer <token>" 中拆出裸令牌
pub fn extract_token(bearer_string: &str) -> Result<String> {
    let trimmed = bearer_string.trim();
    if !is_valid_bearer_format(trimmed) {
        return Err(TestcaseError::TokenFormat(
            "令牌必须是 'Bearer <token>' 格式".to_string(),
        ));
    }
    let token = trimmed
        .strip_prefix("Bearer")
        .unwrap_or(trimmed)
        .trim()
        .to_string();
    Ok(token)
}

//! 测试用例跟踪命令

use anyhow::{Context, Result};

use boxops_testcase::{TestcaseClient, TestcaseConfig};

use crate::config::CliConfig;
use crate::TestcaseAction;

/// 组装客户端：配置里的服务地址 + 参数或环境变量里的令牌
fn build_client(config: &CliConfig, token: Option<String>) -> Result<TestcaseClient> {
    let service = config
        .testcase
        .as_ref()
        .context("未配置测试用例跟踪服务（config.toml 的 [testcase] 一节）")?;

    let bearer = match token {
        Some(token) => token,
        None => std::env::var("BOXOPS_API_TOKEN")
            .context("未提供令牌：使用 --token 或设置 BOXOPS_API_TOKEN")?,
    };

    let client = TestcaseClient::new(
        TestcaseConfig::new(&service.base_url, service.project_id),
        &bearer,
    )?;
    Ok(client)
}

pub async fn handle(action: TestcaseAction) -> Result<()> {
    let config = CliConfig::load()?;

    match action {
        TestcaseAction::Show { id, token } => {
            let client = build_client(&config, token)?;
            client.probe().await?;
            let (summary, _) = client.fetch_summary(&id).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        TestcaseAction::Steps { id, token } => {
            let client = build_client(&config, token)?;
            client.probe().await?;
            let (_, internal_id) = client.fetch_summary(&id).await?;
            let steps = client.fetch_test_steps(internal_id).await?;
            if steps.is_empty() {
                println!("用例 {} 没有测试步骤", id);
            }
            for (index, step) in steps.iter().enumerate() {
                println!("步骤 {}:", index + 1);
                println!("  描述: {}", step.description);
                if !step.expected.is_empty() {
                    println!("  预期: {}", step.expected);
                }
            }
        }
        TestcaseAction::SetAutomationStatus { id, value, token } => {
            let client = build_client(&config, token)?;
            client.probe().await?;
            client
                .update_automation_status(&id, serde_json::json!(value))
                .await?;
            println!("已回写用例 {} 的自动化状态", id);
        }
        TestcaseAction::ClearAttachments { id, token } => {
            let client = build_client(&config, token)?;
            client.probe().await?;
            let (_, internal_id) = client.fetch_summary(&id).await?;
            let deleted = client.remove_attachments(internal_id).await?;
            println!("已删除 {} 个附件", deleted);
        }
    }

    Ok(())
}

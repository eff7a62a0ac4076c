//! 管理域端点管理命令

use anyhow::Result;

use boxops_orchestrator::ManagementEndpoint;

use crate::config::CliConfig;
use crate::EndpointAction;

pub fn handle(action: EndpointAction) -> Result<()> {
    match action {
        EndpointAction::List => {
            let config = CliConfig::load()?;
            if config.endpoints.is_empty() {
                println!("尚未配置管理域端点");
                return Ok(());
            }
            println!("管理域端点（顺序即发现优先级）:");
            for (index, endpoint) in config.endpoints.iter().enumerate() {
                println!(
                    "  {}. {} ({}, 用户 {})",
                    index + 1,
                    endpoint.name,
                    endpoint.server,
                    endpoint.username
                );
            }
        }
        EndpointAction::Add {
            name,
            server,
            username,
            password,
        } => {
            let mut config = CliConfig::load()?;
            config.add_endpoint(ManagementEndpoint {
                name: name.clone(),
                server,
                username,
                password,
            })?;
            config.save()?;
            println!("已添加管理域端点: {}", name);
        }
        EndpointAction::Remove { name } => {
            let mut config = CliConfig::load()?;
            config.remove_endpoint(&name)?;
            config.save()?;
            println!("已移除管理域端点: {}", name);
        }
    }
    Ok(())
}

//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/boxops/config.toml)
//!
//! 管理域端点按文件中出现的顺序即为发现优先级，
//! 工作流参数一节缺省时使用生产默认值。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use boxops_orchestrator::{ManagementEndpoint, WorkflowConfig};

/// 测试用例跟踪服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestcaseServiceConfig {
    /// API 基础 URL
    pub base_url: String,

    /// 项目 ID
    pub project_id: u64,
}

/// CLI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// 管理域端点（顺序即发现优先级）
    #[serde(default)]
    pub endpoints: Vec<ManagementEndpoint>,

    /// 工作流参数
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// 测试用例跟踪服务
    pub testcase: Option<TestcaseServiceConfig>,

    /// 运行日志目录
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_log_dir() -> String {
    "Logs".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            workflow: WorkflowConfig::default(),
            testcase: None,
            log_dir: default_log_dir(),
        }
    }
}

impl CliConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("boxops").join("config.toml"))
    }

    /// 加载配置
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建配置目录失败: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(&path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;

        Ok(())
    }

    /// 添加管理域端点（追加到优先级末尾）
    pub fn add_endpoint(&mut self, endpoint: ManagementEndpoint) -> Result<()> {
        if self.endpoints.iter().any(|e| e.name == endpoint.name) {
            anyhow::bail!("管理域 {} 已存在", endpoint.name);
        }
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// 移除管理域端点
    pub fn remove_endpoint(&mut self, name: &str) -> Result<()> {
        let before = self.endpoints.len();
        self.endpoints.retain(|e| e.name != name);
        if self.endpoints.len() == before {
            anyhow::bail!("管理域 {} 不存在", name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.endpoints.is_empty());
        assert_eq!(config.log_dir, "Logs");
    }

    #[test]
    fn test_endpoint_order_preserved() {
        let mut config = CliConfig::default();
        for name in ["est-hop", "be-hop", "est-be-cork"] {
            config
                .add_endpoint(ManagementEndpoint {
                    name: name.to_string(),
                    server: format!("vc-{}.lab", name),
                    username: "administrator".to_string(),
                    password: "secret".to_string(),
                })
                .unwrap();
        }

        let names: Vec<_> = config.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["est-hop", "be-hop", "est-be-cork"]);

        // 重复添加报错
        assert!(config
            .add_endpoint(ManagementEndpoint {
                name: "be-hop".to_string(),
                server: "x".to_string(),
                username: "x".to_string(),
                password: "x".to_string(),
            })
            .is_err());

        config.remove_endpoint("be-hop").unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert!(config.remove_endpoint("be-hop").is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let toml_text = r#"
            log_dir = "Logs"

            [[endpoints]]
            name = "est-hop"
            server = "vc-est-hop.lab"
            username = "administrator"
            password = "secret"

            [workflow]
            task_poll_interval = "15s"
            reboot_poll_interval = "2m"
        "#;
        let config: CliConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(
            config.workflow.reboot_poll_interval,
            std::time::Duration::from_secs(120)
        );
        // 缺省字段回落到生产默认值
        assert_eq!(
            config.workflow.readiness_deadline,
            std::time::Duration::from_secs(4000)
        );
    }
}

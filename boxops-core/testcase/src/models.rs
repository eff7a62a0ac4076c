//! 测试用例数据模型

use serde::{Deserialize, Serialize};

/// 用例的一个自定义字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyField {
    /// 字段名（"Assigned To"、"Automation Status" 等）
    pub field_name: String,

    /// 字段值（ID 或 ID 列表，原样透传）
    #[serde(default)]
    pub field_value: serde_json::Value,

    /// 字段值的显示名
    #[serde(default)]
    pub field_value_name: Option<String>,
}

/// 跟踪系统返回的完整用例记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestcaseRecord {
    /// 内部数字 ID（test-steps/attachments 接口用它寻址）
    pub id: u64,

    /// 对外展示的用例号（TC-xxxxx）
    #[serde(default)]
    pub pid: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub web_url: Option<String>,

    #[serde(default)]
    pub properties: Vec<PropertyField>,
}

/// 控制台关心的字段子集
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestcaseSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
    pub assigned_to: Option<String>,
    pub automation_developer: Option<String>,
    pub automation_status: Option<String>,
    pub status: Option<String>,
    pub pillar: Option<String>,
    pub automation_release_date: Option<String>,
}

impl TestcaseSummary {
    /// 从完整记录中抽取关心的字段
    ///
    /// 支柱字段去掉方括号；目标日期只保留日期部分（按 'T' 截断）。
    pub fn from_record(record: &TestcaseRecord) -> Self {
        let mut summary = TestcaseSummary {
            id: record.pid.clone(),
            name: record.name.clone(),
            web_url: record.web_url.clone(),
            ..Default::default()
        };

        for property in &record.properties {
            match property.field_name.as_str() {
                "Assigned To" => summary.assigned_to = property.field_value_name.clone(),
                "Automation Developer" => {
                    summary.automation_developer = property.field_value_name.clone()
                }
                "Automation Status" => {
                    summary.automation_status = property.field_value_name.clone()
                }
                "Status" => summary.status = property.field_value_name.clone(),
                "System Test Pillars" => {
                    summary.pillar = property
                        .field_value_name
                        .as_ref()
                        .map(|v| v.replace(['[', ']'], ""));
                }
                "Automation Target Release Date" => {
                    summary.automation_release_date = property
                        .field_value
                        .as_str()
                        .map(|v| v.split('T').next().unwrap_or(v).to_string());
                }
                _ => {}
            }
        }

        summary
    }
}

/// 测试步骤
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStep {
    pub id: u64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub expected: String,
}

/// 用例附件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,
}

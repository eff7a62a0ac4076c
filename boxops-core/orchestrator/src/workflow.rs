//! 重启与恢复工作流
//!
//! 把各阶段按固定顺序串起来：
//! 拓扑解析 → 关机 → 进维护 → 重启 → 出维护 → 开机 → 就绪等待
//! → 凭据探测 → ACLX 恢复（可选）→ 远端调度器配置。
//!
//! 三条互斥路径，优先级 ESX 重启 > 仅 VM 重启 > 仅刷新：
//! ESX 路径走完整序列；仅 VM 路径跳过维护与主机重启，
//! 关机与开机之间留固定间隔；仅刷新路径不动电源，直接探测凭据后配置。

use std::sync::Arc;

use tracing::{info, warn};

use boxops_common::RunRequest;

use crate::config::{ManagementEndpoint, WorkflowConfig};
use crate::credentials::{Credential, CredentialProber};
use crate::error::{OrchestratorError, Result};
use crate::maintenance::MaintenanceController;
use crate::power::PowerController;
use crate::readiness::{Pinger, ReadinessWaiter};
use crate::reboot::RebootController;
use crate::remote::RemoteConfigurator;
use crate::session::SessionProvider;
use crate::shell::ShellConnector;
use crate::topology::{collect_vm_addresses, ResolvedTopology, TopologyResolver};

/// 一次运行的结果摘要
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// 命中的管理域
    pub endpoint_name: String,
    /// 涉及的主机名
    pub hosts: Vec<String>,
    /// 涉及的虚拟机名
    pub vms: Vec<String>,
    /// 远端配置的每机结果
    pub remote_results: Vec<(String, Result<()>)>,
}

/// 重启与恢复工作流
pub struct HostWorkflow {
    provider: Arc<dyn SessionProvider>,
    connector: Arc<dyn ShellConnector>,
    pinger: Arc<dyn Pinger>,
    endpoints: Vec<ManagementEndpoint>,
    config: Arc<WorkflowConfig>,
}

impl HostWorkflow {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        connector: Arc<dyn ShellConnector>,
        pinger: Arc<dyn Pinger>,
        endpoints: Vec<ManagementEndpoint>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            provider,
            connector,
            pinger,
            endpoints,
            config: Arc::new(config),
        }
    }

    /// 执行一次完整的工作流
    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let boxname = request.system.to_uppercase();
        info!("------------- 开始执行 --------------");

        if request.update_adios && request.adios_version.is_none() {
            return Err(OrchestratorError::ConfigError(
                "刷新 adios 需要指定版本号".to_string(),
            ));
        }

        let resolver = TopologyResolver::new(self.provider.as_ref(), &self.endpoints);
        let resolved = resolver.resolve(&boxname).await?;

        info!("{} 的主机列表:", boxname);
        for host in &resolved.topology.hosts {
            info!("     {}", host.name);
        }
        info!("{} 的虚拟机列表:", boxname);
        for vm in &resolved.topology.vms {
            info!("     {}", vm.name);
        }

        if resolved.topology.vms.is_empty() {
            warn!("{} 没有可操作的虚拟机，终止", boxname);
            return Err(OrchestratorError::EmptyTopology(boxname));
        }

        let mut outcome = RunOutcome {
            endpoint_name: resolved.endpoint_name.clone(),
            hosts: resolved
                .topology
                .hosts
                .iter()
                .map(|h| h.name.clone())
                .collect(),
            vms: resolved.topology.vms.iter().map(|v| v.name.clone()).collect(),
            remote_results: Vec::new(),
        };

        if request.esx_reboot {
            outcome.remote_results = self.run_esx_path(&resolved, request).await?;
        } else if request.vm_reboot {
            outcome.remote_results = self.run_vm_path(&resolved, request).await?;
        } else if request.update_adios {
            outcome.remote_results = self.run_update_path(&resolved, request).await?;
        } else {
            info!("未选择任何操作，仅列出拓扑");
        }

        info!("------------- 执行结束 --------------");
        Ok(outcome)
    }

    /// ESX 重启路径：完整序列
    async fn run_esx_path(
        &self,
        resolved: &ResolvedTopology,
        request: &RunRequest,
    ) -> Result<Vec<(String, Result<()>)>> {
        let session = resolved.session.as_ref();
        let topology = &resolved.topology;

        // 地址必须在关机前采集
        let addresses = collect_vm_addresses(session, &topology.vms).await;

        let power = PowerController::new(session, self.config.task_poll_interval);
        power.power_off_all(&topology.vms).await?;

        let maintenance = MaintenanceController::new(
            session,
            self.config.maintenance_task_timeout_secs,
            self.config.maintenance_poll_interval,
        );
        maintenance.enter_all(&topology.hosts).await?;

        let reboot = RebootController::new(
            session,
            self.config.reboot_poll_interval,
            self.config.reboot_phase_deadline,
        );
        reboot.reboot_all(&topology.hosts).await?;

        maintenance.exit_all(&topology.hosts).await?;
        power.power_on_all(&topology.vms).await?;

        let readiness = ReadinessWaiter::new(
            self.pinger.as_ref(),
            self.config.readiness_poll_interval,
            self.config.readiness_deadline,
        );
        readiness.wait_all(&addresses).await?;

        let prober = CredentialProber::new(self.connector.as_ref(), &self.config);
        let credentials = prober.probe_all(&addresses).await;

        self.finish(&credentials, request).await
    }

    /// 仅 VM 重启路径：不碰主机
    async fn run_vm_path(
        &self,
        resolved: &ResolvedTopology,
        request: &RunRequest,
    ) -> Result<Vec<(String, Result<()>)>> {
        let session = resolved.session.as_ref();
        let topology = &resolved.topology;

        let addresses = collect_vm_addresses(session, &topology.vms).await;

        let power = PowerController::new(session, self.config.task_poll_interval);
        power.power_off_all(&topology.vms).await?;
        tokio::time::sleep(self.config.vm_power_gap).await;
        power.power_on_all(&topology.vms).await?;

        let readiness = ReadinessWaiter::new(
            self.pinger.as_ref(),
            self.config.readiness_poll_interval,
            self.config.readiness_deadline,
        );
        readiness.wait_all(&addresses).await?;

        let prober = CredentialProber::new(self.connector.as_ref(), &self.config);
        let credentials = prober.probe_all(&addresses).await;

        self.finish(&credentials, request).await
    }

    /// 仅刷新路径：不动电源
    async fn run_update_path(
        &self,
        resolved: &ResolvedTopology,
        request: &RunRequest,
    ) -> Result<Vec<(String, Result<()>)>> {
        let session = resolved.session.as_ref();
        let addresses = collect_vm_addresses(session, &resolved.topology.vms).await;

        let prober = CredentialProber::new(self.connector.as_ref(), &self.config);
        let credentials = prober.probe_all(&addresses).await;

        self.finish(&credentials, request).await
    }

    /// 收尾：可选的 ACLX 恢复 + 远端调度器配置
    async fn finish(
        &self,
        credentials: &[Credential],
        request: &RunRequest,
    ) -> Result<Vec<(String, Result<()>)>> {
        let configurator =
            RemoteConfigurator::new(Arc::clone(&self.connector), Arc::clone(&self.config));

        if let (Some(hostname), Some(script)) = (&request.aclx_hostname, &request.aclx_script) {
            // ACLX 失败不阻断调度器配置
            if let Err(e) = configurator.setup_aclx(credentials, hostname, script).await {
                warn!("ACLX 恢复失败: {}", e);
            }
        }

        let results = configurator
            .ready_hosts(
                credentials,
                request.update_adios,
                request.adios_version.as_deref(),
            )
            .await;
        Ok(results)
    }
}

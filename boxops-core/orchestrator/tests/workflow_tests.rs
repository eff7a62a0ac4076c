//! 工作流集成测试
//!
//! 用假管理域/假 shell/假 ping 驱动完整工作流，
//! 断言阶段顺序、幂等性与各条失败路径。

mod common;

use std::sync::Arc;

use boxops_common::RunRequest;
use boxops_orchestrator::config::WorkflowConfig;
use boxops_orchestrator::credentials::CredentialProber;
use boxops_orchestrator::error::OrchestratorError;
use boxops_orchestrator::maintenance::MaintenanceController;
use boxops_orchestrator::power::PowerController;
use boxops_orchestrator::reboot::RebootController;
use boxops_orchestrator::session::{HostRef, VmRef};
use boxops_orchestrator::shell::ShellConnector;
use boxops_orchestrator::topology::{find_folder_by_name, match_compute_resources, VmAddress};
use boxops_orchestrator::workflow::HostWorkflow;

use common::{endpoint, FakeConnector, FakePinger, FakeProvider, FakeSession};

/// 组一个标准机箱：BOX1 文件夹下两个计算资源、三台虚拟机
fn box1_session() -> FakeSession {
    let mut session = FakeSession::new();
    session.add_folder("folder-1", "BOX1-System", None);
    session.add_compute_resource("folder-1", "cr-1", "ESX-01");
    session.add_compute_resource("folder-1", "cr-2", "ESX-02");
    session.add_vm("cr-1", "vm-1", "BOX1-VDI-01", Some("10.0.0.11"));
    session.add_vm("cr-1", "vm-2", "BOX1-VDI-02", Some("10.0.0.12"));
    session.add_vm("cr-2", "vm-3", "BOX1-MGMT", Some("10.0.0.13"));
    // 每台主机：进维护前查 1 次，失联等待 1 次，回连等待 1 次，出维护前 1 次
    session.script_connection_states("ESX-01", &["connected", "notResponding", "connected", "connected"]);
    session.script_connection_states("ESX-02", &["connected", "notResponding", "connected", "connected"]);
    session
}

#[tokio::test]
async fn test_full_esx_reboot_run() {
    let session = Arc::new(box1_session());

    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::new(FakeSession::new()));
    provider.add_session("domain-2", Arc::clone(&session));

    let connector = Arc::new(FakeConnector::new());
    connector.add_machine("10.0.0.11", "dangerous");
    connector.add_machine("10.0.0.12", "D@ngerous");
    connector.add_machine("10.0.0.13", "dangerous");

    let pinger = Arc::new(FakePinger::new());
    pinger.set_reachable("10.0.0.11");
    pinger.set_reachable("10.0.0.12");
    pinger.set_reachable("10.0.0.13");

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        Arc::clone(&connector) as Arc<dyn ShellConnector>,
        pinger,
        vec![endpoint("domain-1"), endpoint("domain-2")],
        WorkflowConfig::fast(),
    );

    let mut request = RunRequest::new("box1");
    request.esx_reboot = true;
    let outcome = workflow.run(&request).await.unwrap();

    assert_eq!(outcome.endpoint_name, "domain-2");
    assert_eq!(outcome.hosts, vec!["ESX-01", "ESX-02"]);
    assert_eq!(
        outcome.vms,
        vec!["BOX1-VDI-01", "BOX1-VDI-02", "BOX1-MGMT"]
    );
    assert_eq!(outcome.remote_results.len(), 3);
    for (name, result) in &outcome.remote_results {
        assert!(result.is_ok(), "{} 配置失败", name);
    }

    // 阶段顺序：关机 → 进维护 → 重启 → 出维护 → 开机
    let events = session.events();
    let last_off = events
        .iter()
        .rposition(|e| e.starts_with("power_off:"))
        .unwrap();
    let first_enter = events
        .iter()
        .position(|e| e.starts_with("enter_maintenance:"))
        .unwrap();
    let first_reboot = events.iter().position(|e| e.starts_with("reboot:")).unwrap();
    let first_exit = events
        .iter()
        .position(|e| e.starts_with("exit_maintenance:"))
        .unwrap();
    let first_on = events
        .iter()
        .position(|e| e.starts_with("power_on:"))
        .unwrap();
    assert!(last_off < first_enter);
    assert!(first_enter < first_reboot);
    assert!(first_reboot < first_exit);
    assert!(first_exit < first_on);

    assert_eq!(session.count_events("power_off:"), 3);
    assert_eq!(session.count_events("power_on:"), 3);
    assert_eq!(session.count_events("enter_maintenance:"), 2);
    assert_eq!(session.count_events("exit_maintenance:"), 2);
    assert_eq!(session.count_events("reboot:"), 2);

    // 未勾选刷新时不得下发 axinstall
    for address in ["10.0.0.11", "10.0.0.12", "10.0.0.13"] {
        let commands = connector.commands(address);
        assert!(!commands.iter().any(|c| c.contains("axinstall")));
        let dexit = commands.iter().position(|c| c.contains("dexit")).unwrap();
        let config = commands
            .iter()
            .position(|c| c.contains("adiosx config"))
            .unwrap();
        assert!(dexit < config);
    }
}

#[tokio::test]
async fn test_zero_vm_topology_aborts() {
    let mut session = FakeSession::new();
    session.add_folder("folder-9", "BOX9", None);
    session.add_compute_resource("folder-9", "cr-9", "ESX-91");
    let session = Arc::new(session);

    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::clone(&session));

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        Arc::new(FakeConnector::new()),
        Arc::new(FakePinger::new()),
        vec![endpoint("domain-1")],
        WorkflowConfig::fast(),
    );

    let mut request = RunRequest::new("BOX9");
    request.esx_reboot = true;
    let result = workflow.run(&request).await;

    assert!(matches!(result, Err(OrchestratorError::EmptyTopology(_))));
    assert_eq!(session.count_events("power_off:"), 0);
    assert_eq!(session.count_events("enter_maintenance:"), 0);
}

#[tokio::test]
async fn test_system_not_found_in_any_domain() {
    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::new(FakeSession::new()));
    provider.add_session("domain-2", Arc::new(FakeSession::new()));

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        Arc::new(FakeConnector::new()),
        Arc::new(FakePinger::new()),
        vec![endpoint("domain-1"), endpoint("domain-2")],
        WorkflowConfig::fast(),
    );

    let request = RunRequest::new("NOSUCHBOX");
    let result = workflow.run(&request).await;
    assert!(matches!(result, Err(OrchestratorError::NotFound(_))));
}

#[tokio::test]
async fn test_first_matching_domain_wins() {
    let session_a = Arc::new(box1_session());
    let session_b = Arc::new(box1_session());

    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::clone(&session_a));
    provider.add_session("domain-2", Arc::clone(&session_b));

    let connector = Arc::new(FakeConnector::new());
    for address in ["10.0.0.11", "10.0.0.12", "10.0.0.13"] {
        connector.add_machine(address, "dangerous");
    }
    let pinger = Arc::new(FakePinger::new());
    for address in ["10.0.0.11", "10.0.0.12", "10.0.0.13"] {
        pinger.set_reachable(address);
    }

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        connector,
        pinger,
        vec![endpoint("domain-1"), endpoint("domain-2")],
        WorkflowConfig::fast(),
    );

    let mut request = RunRequest::new("BOX1");
    request.vm_reboot = true;
    let outcome = workflow.run(&request).await.unwrap();

    assert_eq!(outcome.endpoint_name, "domain-1");
    // 第二个管理域不应被操作
    assert!(session_b.events().is_empty());
}

#[tokio::test]
async fn test_update_requires_release() {
    let session = Arc::new(box1_session());
    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::clone(&session));

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        Arc::new(FakeConnector::new()),
        Arc::new(FakePinger::new()),
        vec![endpoint("domain-1")],
        WorkflowConfig::fast(),
    );

    let mut request = RunRequest::new("BOX1");
    request.update_adios = true;
    let result = workflow.run(&request).await;
    assert!(matches!(result, Err(OrchestratorError::ConfigError(_))));
    // 校验在任何管理域操作之前发生
    assert!(session.events().is_empty());
}

#[tokio::test]
async fn test_power_off_is_idempotent() {
    let mut session = FakeSession::new();
    session.add_vm("cr-1", "vm-1", "BOX1-VDI-01", None);
    let vm = VmRef {
        id: "vm-1".to_string(),
        name: "BOX1-VDI-01".to_string(),
    };

    let config = WorkflowConfig::fast();
    let power = PowerController::new(&session, config.task_poll_interval);

    power.power_off(&vm).await.unwrap();
    power.power_off(&vm).await.unwrap();
    assert_eq!(session.count_events("power_off:"), 1);

    power.power_on(&vm).await.unwrap();
    power.power_on(&vm).await.unwrap();
    assert_eq!(session.count_events("power_on:"), 1);
}

#[tokio::test]
async fn test_maintenance_is_idempotent() {
    let mut session = FakeSession::new();
    session.add_compute_resource("folder-1", "cr-1", "ESX-01");
    let host = HostRef {
        id: "cr-1".to_string(),
        name: "ESX-01".to_string(),
    };

    let config = WorkflowConfig::fast();
    let maintenance = MaintenanceController::new(
        &session,
        config.maintenance_task_timeout_secs,
        config.maintenance_poll_interval,
    );

    maintenance.enter(&host).await.unwrap();
    maintenance.enter(&host).await.unwrap();
    assert_eq!(session.count_events("enter_maintenance:"), 1);

    maintenance.exit(&host).await.unwrap();
    maintenance.exit(&host).await.unwrap();
    assert_eq!(session.count_events("exit_maintenance:"), 1);
}

#[tokio::test]
async fn test_reboot_waits_for_reconnect() {
    let mut session = FakeSession::new();
    session.add_compute_resource("folder-1", "cr-1", "ESX-01");
    // 失联 1 次采样，回连阶段第三次采样才成功（大小写混排）
    session.script_connection_states(
        "ESX-01",
        &["notResponding", "notResponding", "notresponding", "Connected"],
    );

    let config = WorkflowConfig::fast();
    let reboot = RebootController::new(
        &session,
        config.reboot_poll_interval,
        config.reboot_phase_deadline,
    );

    let host = HostRef {
        id: "cr-1".to_string(),
        name: "ESX-01".to_string(),
    };
    reboot.reboot_and_wait(&host).await.unwrap();

    assert_eq!(session.count_events("reboot:"), 1);
    assert_eq!(session.count_events("host_state:"), 4);
}

#[tokio::test]
async fn test_reboot_reconnect_timeout() {
    let mut session = FakeSession::new();
    session.add_compute_resource("folder-1", "cr-1", "ESX-01");
    let states: Vec<&str> = std::iter::repeat("notResponding").take(500).collect();
    session.script_connection_states("ESX-01", &states);

    let config = WorkflowConfig::fast();
    let reboot = RebootController::new(
        &session,
        config.reboot_poll_interval,
        config.reboot_phase_deadline,
    );

    let host = HostRef {
        id: "cr-1".to_string(),
        name: "ESX-01".to_string(),
    };
    let result = reboot.reboot_and_wait(&host).await;
    assert!(matches!(result, Err(OrchestratorError::Timeout(_))));
}

#[tokio::test]
async fn test_credential_probe_order_and_null_address() {
    let connector = FakeConnector::new();
    connector.add_machine("10.0.0.11", "D@ngerous");
    connector.add_machine("10.0.0.12", "dangerous");

    let config = WorkflowConfig::fast();
    let prober = CredentialProber::new(&connector, &config);

    let addresses = vec![
        VmAddress {
            name: "VDI-01".to_string(),
            address: Some("10.0.0.11".to_string()),
        },
        VmAddress {
            name: "VDI-02".to_string(),
            address: Some("10.0.0.12".to_string()),
        },
        VmAddress {
            name: "VDI-03".to_string(),
            address: None,
        },
    ];
    let credentials = prober.probe_all(&addresses).await;

    // 结果与输入顺序一一对应
    assert_eq!(credentials.len(), 3);
    assert_eq!(credentials[0].host_name, "VDI-01");
    assert_eq!(credentials[0].password.as_deref(), Some("D@ngerous"));
    assert_eq!(credentials[1].password.as_deref(), Some("dangerous"));
    assert!(!credentials[2].is_usable());
    assert!(credentials[2].address.is_none());

    // 候选密码按固定顺序尝试，命中即停
    let attempts: Vec<_> = connector
        .attempts()
        .into_iter()
        .filter(|(address, _)| address == "10.0.0.11")
        .map(|(_, password)| password)
        .collect();
    assert_eq!(attempts, vec!["dangerous", "D@ngerous"]);
}

#[tokio::test]
async fn test_credential_probe_all_rejected() {
    let connector = FakeConnector::new();
    connector.add_machine("10.0.0.11", "something-else");

    let config = WorkflowConfig::fast();
    let prober = CredentialProber::new(&connector, &config);

    let addresses = vec![VmAddress {
        name: "VDI-01".to_string(),
        address: Some("10.0.0.11".to_string()),
    }];
    let credentials = prober.probe_all(&addresses).await;

    assert!(!credentials[0].is_usable());
    assert!(credentials[0].username.is_none());
    // 三个候选密码都应被尝试过
    assert_eq!(connector.attempts().len(), 3);
}

#[tokio::test]
async fn test_datastore_folder_skipped() {
    let mut session = FakeSession::new();
    session.add_folder("folder-ds", "BOX1", Some("DatastoreFolder"));
    session.add_folder("folder-1", "BOX1-System", Some("Root"));

    let folder = find_folder_by_name(&session, "BOX1").await.unwrap().unwrap();
    assert_eq!(folder.id, "folder-1");
}

#[tokio::test]
async fn test_fallback_matches_by_vm_name() {
    let mut session = FakeSession::new();
    session.add_root_compute_resource("cr-1", "ESX-01");
    session.add_root_compute_resource("cr-2", "ESX-02");
    session.add_vm("cr-1", "vm-1", "BOX2-VDI-01", Some("10.0.0.21"));
    session.add_vm("cr-1", "vm-2", "BOX2-VDI-02", None);
    session.add_vm("cr-2", "vm-3", "OTHER-VM", None);

    let topology = match_compute_resources(&session, "BOX2").await.unwrap();

    // 命中的计算资源整体入选，未命中的被排除
    assert_eq!(topology.hosts.len(), 1);
    assert_eq!(topology.hosts[0].name, "ESX-01");
    assert_eq!(topology.vms.len(), 2);
    assert!(session
        .events()
        .iter()
        .all(|e| !e.starts_with("power_off:")));
}

#[tokio::test]
async fn test_vm_only_reboot_skips_hosts() {
    let session = Arc::new(box1_session());
    let mut provider = FakeProvider::new();
    provider.add_session("domain-1", Arc::clone(&session));

    let connector = Arc::new(FakeConnector::new());
    for address in ["10.0.0.11", "10.0.0.12", "10.0.0.13"] {
        connector.add_machine(address, "dangerous");
    }
    let pinger = Arc::new(FakePinger::new());
    for address in ["10.0.0.11", "10.0.0.12", "10.0.0.13"] {
        pinger.set_reachable(address);
    }

    let workflow = HostWorkflow::new(
        Arc::new(provider),
        connector,
        pinger,
        vec![endpoint("domain-1")],
        WorkflowConfig::fast(),
    );

    let mut request = RunRequest::new("BOX1");
    request.vm_reboot = true;
    let outcome = workflow.run(&request).await.unwrap();

    assert_eq!(outcome.remote_results.len(), 3);
    assert_eq!(session.count_events("power_off:"), 3);
    assert_eq!(session.count_events("power_on:"), 3);
    // 仅 VM 路径不碰主机
    assert_eq!(session.count_events("enter_maintenance:"), 0);
    assert_eq!(session.count_events("reboot:"), 0);
    assert_eq!(session.count_events("exit_maintenance:"), 0);
}

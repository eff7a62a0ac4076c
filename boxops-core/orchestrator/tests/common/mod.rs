//! 测试用的假实现
//!
//! 假管理域会话/假 shell/假 ping，全部在内存里按脚本应答，
//! 并记录调用序列供测试断言各阶段的顺序与次数。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use boxops_orchestrator::config::ManagementEndpoint;
use boxops_orchestrator::error::{OrchestratorError, Result};
use boxops_orchestrator::readiness::Pinger;
use boxops_orchestrator::session::{
    ComputeResourceRef, FolderRef, HostRef, HostState, InventoryEntity, ManagementSession,
    PowerState, SessionProvider, TaskHandle, TaskStatus, VmRef,
};
use boxops_orchestrator::shell::{RemoteShell, ShellConnector, ShellOutput};
use boxops_ssh_executor::SshError;

/// 假管理域会话的内部状态
#[derive(Default)]
struct SessionState {
    /// 虚拟机电源状态（键 = 虚拟机 ID）
    vm_power: HashMap<String, PowerState>,
    /// 主机维护状态（键 = 主机 ID）
    maintenance: HashMap<String, bool>,
    /// 脚本化的连接状态（键 = 主机名子串，逐次弹出，弹空后回落 "connected"）
    connection_script: HashMap<String, VecDeque<String>>,
    /// 按顺序记录的所有操作
    events: Vec<String>,
}

/// 假管理域会话
#[derive(Default)]
pub struct FakeSession {
    root: Vec<InventoryEntity>,
    folder_children: HashMap<String, Vec<InventoryEntity>>,
    cr_vms: HashMap<String, Vec<VmRef>>,
    hosts: Vec<HostRef>,
    vm_addresses: HashMap<String, Option<String>>,
    state: Mutex<SessionState>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在根视图中放一个文件夹
    pub fn add_folder(&mut self, id: &str, name: &str, parent_name: Option<&str>) {
        self.root.push(InventoryEntity::Folder(FolderRef {
            id: id.to_string(),
            name: name.to_string(),
            parent_name: parent_name.map(str::to_string),
        }));
        self.folder_children.entry(id.to_string()).or_default();
    }

    /// 在文件夹下放一个计算资源，并注册其全域主机视图别名
    pub fn add_compute_resource(&mut self, folder_id: &str, cr_id: &str, name: &str) {
        self.folder_children
            .entry(folder_id.to_string())
            .or_default()
            .push(InventoryEntity::ComputeResource(ComputeResourceRef {
                id: cr_id.to_string(),
                name: name.to_string(),
            }));
        self.cr_vms.entry(cr_id.to_string()).or_default();
        self.hosts.push(HostRef {
            id: format!("host-{}", cr_id),
            name: format!("{}.lab.local", name),
        });
    }

    /// 在根视图中直接放一个计算资源（回退扫描路径用）
    pub fn add_root_compute_resource(&mut self, cr_id: &str, name: &str) {
        self.root
            .push(InventoryEntity::ComputeResource(ComputeResourceRef {
                id: cr_id.to_string(),
                name: name.to_string(),
            }));
        self.cr_vms.entry(cr_id.to_string()).or_default();
        self.hosts.push(HostRef {
            id: format!("host-{}", cr_id),
            name: format!("{}.lab.local", name),
        });
    }

    /// 在计算资源下放一台虚拟机
    pub fn add_vm(&mut self, cr_id: &str, vm_id: &str, name: &str, address: Option<&str>) {
        self.cr_vms
            .entry(cr_id.to_string())
            .or_default()
            .push(VmRef {
                id: vm_id.to_string(),
                name: name.to_string(),
            });
        self.vm_addresses
            .insert(vm_id.to_string(), address.map(str::to_string));
        self.state
            .lock()
            .unwrap()
            .vm_power
            .insert(vm_id.to_string(), PowerState::PoweredOn);
    }

    /// 为名字包含 key 的主机预置连接状态应答序列
    pub fn script_connection_states(&mut self, key: &str, states: &[&str]) {
        self.state.lock().unwrap().connection_script.insert(
            key.to_string(),
            states.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// 直接设置虚拟机电源状态
    pub fn set_vm_power(&self, vm_id: &str, state: PowerState) {
        self.state
            .lock()
            .unwrap()
            .vm_power
            .insert(vm_id.to_string(), state);
    }

    /// 取出调用记录
    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    /// 统计前缀匹配的调用次数
    pub fn count_events(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn record(&self, event: String) {
        self.state.lock().unwrap().events.push(event);
    }

    fn pop_connection_state(&self, host_name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let key = state
            .connection_script
            .keys()
            .find(|key| host_name.contains(key.as_str()))
            .cloned();
        match key {
            Some(key) => state
                .connection_script
                .get_mut(&key)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| "connected".to_string()),
            None => "connected".to_string(),
        }
    }
}

#[async_trait]
impl ManagementSession for FakeSession {
    async fn root_view(&self) -> Result<Vec<InventoryEntity>> {
        Ok(self.root.clone())
    }

    async fn folder_view(&self, folder: &FolderRef) -> Result<Vec<InventoryEntity>> {
        Ok(self
            .folder_children
            .get(&folder.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn host_view(&self) -> Result<Vec<HostRef>> {
        Ok(self.hosts.clone())
    }

    async fn compute_resource_vms(&self, cr: &ComputeResourceRef) -> Result<Vec<VmRef>> {
        Ok(self.cr_vms.get(&cr.id).cloned().unwrap_or_default())
    }

    async fn host_vms(&self, _host: &HostRef) -> Result<Vec<VmRef>> {
        Ok(Vec::new())
    }

    async fn vm_power_state(&self, vm: &VmRef) -> Result<PowerState> {
        self.state
            .lock()
            .unwrap()
            .vm_power
            .get(&vm.id)
            .copied()
            .ok_or_else(|| OrchestratorError::SessionError(format!("未知虚拟机 {}", vm.id)))
    }

    async fn vm_guest_address(&self, vm: &VmRef) -> Result<Option<String>> {
        Ok(self.vm_addresses.get(&vm.id).cloned().flatten())
    }

    async fn power_off_vm(&self, vm: &VmRef) -> Result<TaskHandle> {
        self.record(format!("power_off:{}", vm.name));
        self.set_vm_power(&vm.id, PowerState::PoweredOff);
        Ok(TaskHandle(format!("task-off-{}", vm.id)))
    }

    async fn power_on_vm(&self, vm: &VmRef) -> Result<TaskHandle> {
        self.record(format!("power_on:{}", vm.name));
        self.set_vm_power(&vm.id, PowerState::PoweredOn);
        Ok(TaskHandle(format!("task-on-{}", vm.id)))
    }

    async fn host_state(&self, host: &HostRef) -> Result<HostState> {
        self.record(format!("host_state:{}", host.name));
        let connection_state = self.pop_connection_state(&host.name);
        let in_maintenance = self
            .state
            .lock()
            .unwrap()
            .maintenance
            .get(&host.id)
            .copied()
            .unwrap_or(false);
        Ok(HostState {
            connection_state,
            power_state: "poweredOn".to_string(),
            in_maintenance,
        })
    }

    async fn enter_maintenance(&self, host: &HostRef, _timeout_secs: u32) -> Result<TaskHandle> {
        self.record(format!("enter_maintenance:{}", host.name));
        self.state
            .lock()
            .unwrap()
            .maintenance
            .insert(host.id.clone(), true);
        Ok(TaskHandle(format!("task-enter-{}", host.id)))
    }

    async fn exit_maintenance(&self, host: &HostRef, _timeout_secs: u32) -> Result<TaskHandle> {
        self.record(format!("exit_maintenance:{}", host.name));
        self.state
            .lock()
            .unwrap()
            .maintenance
            .insert(host.id.clone(), false);
        Ok(TaskHandle(format!("task-exit-{}", host.id)))
    }

    async fn reboot_host(&self, host: &HostRef) -> Result<()> {
        self.record(format!("reboot:{}", host.name));
        Ok(())
    }

    async fn task_status(&self, _task: &TaskHandle) -> Result<TaskStatus> {
        Ok(TaskStatus::Success)
    }
}

/// 按端点名返回预置会话的假 Provider
#[derive(Default)]
pub struct FakeProvider {
    sessions: HashMap<String, Arc<FakeSession>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&mut self, endpoint_name: &str, session: Arc<FakeSession>) {
        self.sessions.insert(endpoint_name.to_string(), session);
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    async fn connect(&self, endpoint: &ManagementEndpoint) -> Result<Arc<dyn ManagementSession>> {
        self.sessions
            .get(&endpoint.name)
            .map(|s| Arc::clone(s) as Arc<dyn ManagementSession>)
            .ok_or_else(|| {
                OrchestratorError::SessionError(format!("无法连接管理域 {}", endpoint.name))
            })
    }
}

/// 构造一个测试端点
pub fn endpoint(name: &str) -> ManagementEndpoint {
    ManagementEndpoint {
        name: name.to_string(),
        server: format!("vc-{}.lab", name),
        username: "administrator".to_string(),
        password: "secret".to_string(),
    }
}

/// 假 shell 的每台机器状态
struct HostMachine {
    /// 状态查询的当前应答
    state_line: String,
    /// 置 true 后状态永远停在当前值（用于超时路径）
    frozen: bool,
    /// 按顺序记录的命令
    commands: Vec<String>,
}

/// 假 shell 连接器
///
/// 密码核对通过后返回绑定到该地址状态机的假 shell。
/// 状态机按命令迁移：kill → Stopped，dexit → DNR，adiosx config → Ready。
#[derive(Default)]
pub struct FakeConnector {
    /// 地址 -> 可接受的密码
    passwords: Mutex<HashMap<String, String>>,
    machines: Arc<Mutex<HashMap<String, HostMachine>>>,
    /// 记录的探测尝试 (地址, 密码)
    attempts: Mutex<Vec<(String, String)>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一台机器及其正确密码
    pub fn add_machine(&self, address: &str, password: &str) {
        self.passwords
            .lock()
            .unwrap()
            .insert(address.to_string(), password.to_string());
        self.machines.lock().unwrap().insert(
            address.to_string(),
            HostMachine {
                state_line: "STATE: Running".to_string(),
                frozen: false,
                commands: Vec::new(),
            },
        );
    }

    /// 让某台机器的状态不再迁移
    pub fn freeze_state(&self, address: &str) {
        if let Some(machine) = self.machines.lock().unwrap().get_mut(address) {
            machine.frozen = true;
        }
    }

    /// 取出某台机器按顺序记录的命令
    pub fn commands(&self, address: &str) -> Vec<String> {
        self.machines
            .lock()
            .unwrap()
            .get(address)
            .map(|m| m.commands.clone())
            .unwrap_or_default()
    }

    /// 取出探测尝试记录
    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShellConnector for FakeConnector {
    async fn open(
        &self,
        address: &str,
        _username: &str,
        password: &str,
    ) -> Result<Box<dyn RemoteShell>> {
        self.attempts
            .lock()
            .unwrap()
            .push((address.to_string(), password.to_string()));

        let expected = self.passwords.lock().unwrap().get(address).cloned();
        match expected {
            Some(expected) if expected == password => Ok(Box::new(FakeShell {
                address: address.to_string(),
                machines: Arc::clone(&self.machines),
            })),
            Some(_) => Err(OrchestratorError::Ssh(SshError::AuthenticationError(
                format!("{} 密码错误", address),
            ))),
            None => Err(OrchestratorError::Ssh(SshError::ConnectionError(format!(
                "{} 不可达",
                address
            )))),
        }
    }
}

/// 绑定到单台机器状态机的假 shell
pub struct FakeShell {
    address: String,
    machines: Arc<Mutex<HashMap<String, HostMachine>>>,
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        let mut machines = self.machines.lock().unwrap();
        let machine = machines.get_mut(&self.address).ok_or_else(|| {
            OrchestratorError::SessionError(format!("{} 状态机不存在", self.address))
        })?;

        machine.commands.push(command.to_string());

        let stdout = if command.starts_with("axcli state") {
            format!("{}\n", machine.state_line)
        } else {
            if !machine.frozen {
                if command.starts_with("kill") {
                    machine.state_line = "STATE: Stopped".to_string();
                } else if command.starts_with("axcli dexit") {
                    machine.state_line = "STATE: DNR".to_string();
                } else if command.starts_with("axcli adiosx config") {
                    machine.state_line = "STATE: Ready".to_string();
                }
            }
            String::new()
        };

        Ok(ShellOutput {
            stdout,
            exit_code: Some(0),
        })
    }
}

/// 假 ping：只有预置为可达的地址返回 true
#[derive(Default)]
pub struct FakePinger {
    reachable: Mutex<HashSet<String>>,
}

impl FakePinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reachable(&self, address: &str) {
        self.reachable.lock().unwrap().insert(address.to_string());
    }
}

#[async_trait]
impl Pinger for FakePinger {
    async fn is_reachable(&self, address: &str) -> bool {
        self.reachable.lock().unwrap().contains(address)
    }
}

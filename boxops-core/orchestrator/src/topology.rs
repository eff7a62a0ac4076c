//! 拓扑解析器
//!
//! 给定目标机箱名和按优先级排列的管理域端点：
//! 1. 依次连接各管理域，在根视图中找名称包含目标名的组织文件夹
//!    （父容器名含 "datastore"/"storage" 的存储文件夹除外），
//!    递归收集其下全部主机与虚拟机；
//! 2. 没有文件夹命中时，退化为扫描全域计算资源，
//!    任一资源池虚拟机名包含目标名则整个计算资源连同其全部虚拟机入选；
//! 3. 第一个产生非空结果的管理域生效，后续管理域不再查询 ——
//!    目标名在多个管理域重名时第二个被静默忽略（已知并保留的行为）。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ManagementEndpoint;
use crate::error::{OrchestratorError, Result};
use crate::session::{
    ComputeResourceRef, FolderRef, HostRef, InventoryEntity, ManagementSession, SessionProvider,
    VmRef,
};

/// 一次解析得到的主机/虚拟机集合
///
/// 保持发现顺序，按对象 ID 去重。生命周期 = 一次工作流运行，从不持久化。
#[derive(Debug, Default)]
pub struct Topology {
    pub hosts: Vec<HostRef>,
    pub vms: Vec<VmRef>,
}

impl Topology {
    /// 是否完全为空（文件夹命中但无内容，或回退扫描无命中）
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.vms.is_empty()
    }

    fn add_host(&mut self, seen: &mut HashSet<String>, host: HostRef) {
        if seen.insert(format!("host:{}", host.id)) {
            self.hosts.push(host);
        }
    }

    fn add_vm(&mut self, seen: &mut HashSet<String>, vm: VmRef) {
        if seen.insert(format!("vm:{}", vm.id)) {
            self.vms.push(vm);
        }
    }
}

/// 解析结果：拓扑 + 命中它的管理域会话
///
/// 会话随结果一起交还给调用方：后续所有阶段都必须通过同一个管理域操作，
/// 主机/虚拟机句柄只在该域内有意义。
pub struct ResolvedTopology {
    pub endpoint_name: String,
    pub session: Arc<dyn ManagementSession>,
    pub topology: Topology,
}

/// 虚拟机地址映射（在关机前采集，贯穿整个工作流）
#[derive(Debug, Clone)]
pub struct VmAddress {
    pub name: String,
    pub address: Option<String>,
}

/// 拓扑解析器
pub struct TopologyResolver<'a> {
    provider: &'a dyn SessionProvider,
    endpoints: &'a [ManagementEndpoint],
}

impl<'a> TopologyResolver<'a> {
    pub fn new(provider: &'a dyn SessionProvider, endpoints: &'a [ManagementEndpoint]) -> Self {
        Self {
            provider,
            endpoints,
        }
    }

    /// 解析目标系统
    ///
    /// 所有管理域都未命中时返回 [`OrchestratorError::NotFound`]。
    pub async fn resolve(&self, system_name: &str) -> Result<ResolvedTopology> {
        for endpoint in self.endpoints {
            let session = match self.provider.connect(endpoint).await {
                Ok(session) => session,
                Err(e) => {
                    warn!("管理域 {} 连接失败，尝试下一个: {}", endpoint.name, e);
                    continue;
                }
            };

            if let Some(folder) = find_folder_by_name(session.as_ref(), system_name).await? {
                info!(
                    "在管理域 {} 中找到文件夹: {}",
                    endpoint.name, folder.name
                );
                let topology = collect_from_folder(session.as_ref(), &folder).await?;
                return Ok(ResolvedTopology {
                    endpoint_name: endpoint.name.clone(),
                    session,
                    topology,
                });
            }

            // 文件夹未命中，回退到按虚拟机名扫描计算资源
            let topology = match_compute_resources(session.as_ref(), system_name).await?;
            if !topology.hosts.is_empty() && !topology.vms.is_empty() {
                info!("在管理域 {} 中按虚拟机名匹配到目标", endpoint.name);
                return Ok(ResolvedTopology {
                    endpoint_name: endpoint.name.clone(),
                    session,
                    topology,
                });
            }

            info!("管理域 {} 中未找到 {}", endpoint.name, system_name);
        }

        Err(OrchestratorError::NotFound(system_name.to_string()))
    }
}

/// 在根视图中查找名称包含目标名的组织文件夹
///
/// 父容器名包含 "datastore" 或 "storage" 的文件夹属于存储层级，跳过。
pub async fn find_folder_by_name(
    session: &dyn ManagementSession,
    system_name: &str,
) -> Result<Option<FolderRef>> {
    let view = session.root_view().await?;

    for entity in view {
        if let InventoryEntity::Folder(folder) = entity {
            if !folder.name.contains(system_name) {
                continue;
            }

            if let Some(parent) = &folder.parent_name {
                let parent_lower = parent.to_lowercase();
                if parent_lower.contains("datastore") || parent_lower.contains("storage") {
                    info!(
                        "跳过存储文件夹: {} (父容器: {})",
                        folder.name, parent
                    );
                    continue;
                }
            }

            return Ok(Some(folder));
        }
    }

    Ok(None)
}

/// 递归收集文件夹之下的全部主机与虚拟机
///
/// 计算资源贡献其资源池虚拟机，裸主机贡献直属虚拟机，裸虚拟机直接入选，
/// 子文件夹递归处理。
pub async fn collect_from_folder(
    session: &dyn ManagementSession,
    folder: &FolderRef,
) -> Result<Topology> {
    let mut topology = Topology::default();
    let mut seen = HashSet::new();
    collect_folder_inner(session, folder, &mut topology, &mut seen).await?;

    info!(
        "文件夹 {} 下共发现 {} 台主机, {} 台虚拟机",
        folder.name,
        topology.hosts.len(),
        topology.vms.len()
    );
    Ok(topology)
}

/// 递归辅助（async 递归需要 Box 化）
fn collect_folder_inner<'a>(
    session: &'a dyn ManagementSession,
    folder: &'a FolderRef,
    topology: &'a mut Topology,
    seen: &'a mut HashSet<String>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let entities = session.folder_view(folder).await?;

        for entity in entities {
            match entity {
                InventoryEntity::ComputeResource(cr) => {
                    let vms = session.compute_resource_vms(&cr).await?;
                    topology.add_host(
                        seen,
                        HostRef {
                            id: cr.id.clone(),
                            name: cr.name.clone(),
                        },
                    );
                    for vm in vms {
                        topology.add_vm(seen, vm);
                    }
                }
                InventoryEntity::Host(host) => {
                    let vms = session.host_vms(&host).await?;
                    topology.add_host(seen, host);
                    for vm in vms {
                        topology.add_vm(seen, vm);
                    }
                }
                InventoryEntity::Vm(vm) => {
                    topology.add_vm(seen, vm);
                }
                InventoryEntity::Folder(sub) => {
                    collect_folder_inner(session, &sub, topology, seen).await?;
                }
            }
        }

        Ok(())
    })
}

/// 回退扫描：任一资源池虚拟机名包含目标名的计算资源整体入选
pub async fn match_compute_resources(
    session: &dyn ManagementSession,
    system_name: &str,
) -> Result<Topology> {
    let view = session.root_view().await?;
    let mut topology = Topology::default();
    let mut seen = HashSet::new();

    let mut matched: Vec<ComputeResourceRef> = Vec::new();
    for entity in &view {
        if let InventoryEntity::ComputeResource(cr) = entity {
            let vms = session.compute_resource_vms(cr).await?;
            if vms.iter().any(|vm| vm.name.contains(system_name)) {
                matched.push(cr.clone());
            }
        }
    }

    // 命中的计算资源连同其全部虚拟机入选（不只匹配到名字的那台）
    for cr in matched {
        let vms = session.compute_resource_vms(&cr).await?;
        topology.add_host(
            &mut seen,
            HostRef {
                id: cr.id.clone(),
                name: cr.name.clone(),
            },
        );
        for vm in vms {
            topology.add_vm(&mut seen, vm);
        }
    }

    Ok(topology)
}

/// 采集虚拟机客户机地址
///
/// 必须在关机前调用：关机后客户机地址不再上报。
/// 地址查询失败按未上报处理（None），不中断采集。
pub async fn collect_vm_addresses(
    session: &dyn ManagementSession,
    vms: &[VmRef],
) -> Vec<VmAddress> {
    info!("采集虚拟机客户机地址 ...");
    let mut addresses = Vec::with_capacity(vms.len());

    for vm in vms {
        let address = match session.vm_guest_address(vm).await {
            Ok(address) => address,
            Err(e) => {
                warn!("查询 {} 客户机地址失败: {}", vm.name, e);
                None
            }
        };
        addresses.push(VmAddress {
            name: vm.name.clone(),
            address,
        });
    }

    addresses
}

//! BoxOps 编排器
//!
//! 机箱级重启与恢复工作流的核心实现：跨管理域的拓扑发现、
//! 虚拟机电源控制、主机维护模式与重启、控制台就绪等待、
//! SSH 凭据探测以及远端调度器配置。
//!
//! 对外部系统的访问都经由 trait（[`session::ManagementSession`]、
//! [`shell::ShellConnector`]、[`readiness::Pinger`]），
//! 生产实现分别基于 REST 客户端、系统 ssh 与系统 ping。

pub mod config;
pub mod credentials;
pub mod error;
pub mod maintenance;
pub mod platform;
pub mod power;
pub mod readiness;
pub mod reboot;
pub mod remote;
pub mod session;
pub mod shell;
pub mod topology;
pub mod workflow;

pub use config::{ManagementEndpoint, WorkflowConfig};
pub use credentials::{Credential, CredentialProber};
pub use error::{OrchestratorError, Result};
pub use platform::{PlatformSession, PlatformSessionProvider};
pub use readiness::{Pinger, SystemPinger};
pub use remote::RemoteConfigurator;
pub use session::{ManagementSession, SessionProvider};
pub use shell::{RemoteShell, ShellConnector, ShellOutput, SshShellConnector};
pub use topology::{ResolvedTopology, Topology, TopologyResolver, VmAddress};
pub use workflow::{HostWorkflow, RunOutcome};

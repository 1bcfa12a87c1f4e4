mod config;
mod error;
mod exec;
mod layout;

pub use config::{AppConfig, DeployConfig, NotifyConfig, RemoteConfig, ReportConfig};
pub use error::{DeployError, RollbackStatus};
pub use exec::{run_remote, CommandOutput, ExitStatusPolicy, RemoteExecutor};
pub use layout::AppLayout;

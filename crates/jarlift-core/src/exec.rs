use serde::{Deserialize, Serialize};

use crate::DeployError;

/// Everything captured from one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// A channel that runs one shell command at a time on the remote host.
pub trait RemoteExecutor {
    /// Runs `command` to completion. Errors only when the command could not be
    /// issued or its output could not be read; a non-zero exit is reported in
    /// the returned [`CommandOutput`].
    fn execute(&mut self, command: &str) -> Result<CommandOutput, DeployError>;
}

impl<T: RemoteExecutor + ?Sized> RemoteExecutor for &mut T {
    fn execute(&mut self, command: &str) -> Result<CommandOutput, DeployError> {
        (**self).execute(command)
    }
}

/// How a non-zero remote exit status is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitStatusPolicy {
    /// Only standard output matters; the exit status is not inspected.
    #[default]
    Ignore,
    /// A non-zero exit status fails the command.
    Require,
}

impl ExitStatusPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Require => "require",
        }
    }

    pub fn apply(self, command: &str, output: CommandOutput) -> Result<String, DeployError> {
        if self == Self::Require && !output.success() {
            return Err(DeployError::execution(
                command,
                format!(
                    "exit status {} stderr='{}'",
                    output.exit_status,
                    output.stderr.trim()
                ),
            ));
        }
        Ok(output.stdout)
    }
}

/// Runs `command` and returns its standard output under `policy`.
pub fn run_remote<E: RemoteExecutor + ?Sized>(
    executor: &mut E,
    command: &str,
    policy: ExitStatusPolicy,
) -> Result<String, DeployError> {
    let output = executor.execute(command)?;
    policy.apply(command, output)
}

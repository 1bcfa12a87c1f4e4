use std::io::Read;
use std::net::TcpStream;

use jarlift_core::{CommandOutput, DeployError, ExitStatusPolicy, RemoteConfig, RemoteExecutor};
use ssh2::{ExtendedData, Session};
use tracing::{debug, info, warn};

/// Password-authenticated SSH session that runs one command per channel.
///
/// The host key is never checked against a known-hosts file, so first-time
/// hosts are accepted. The session is closed on [`SshSession::disconnect`] or
/// on drop, whichever comes first.
///
/// stdout and stderr share one channel window. Stderr is only read when the
/// exit-status policy needs it for error messages; under
/// [`ExitStatusPolicy::Ignore`] the channel is told to drop extended data so a
/// chatty stderr can never stall the stdout read. Under
/// [`ExitStatusPolicy::Require`] stderr is drained after stdout, which can
/// still stall if a command writes more stderr than one window before closing
/// stdout.
pub struct SshSession {
    host: String,
    port: u16,
    username: String,
    password: Option<String>,
    policy: ExitStatusPolicy,
    session: Option<Session>,
}

impl SshSession {
    pub fn new(remote: &RemoteConfig) -> Self {
        Self {
            host: remote.host.clone(),
            port: remote.port,
            username: remote.username.clone(),
            password: remote.password.clone(),
            policy: ExitStatusPolicy::default(),
            session: None,
        }
    }

    pub fn with_exit_status_policy(mut self, policy: ExitStatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether commands capture stderr or let the channel discard it.
    pub fn captures_stderr(&self) -> bool {
        self.policy == ExitStatusPolicy::Require
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn connect(&mut self) -> Result<(), DeployError> {
        if self.session.is_some() {
            return Ok(());
        }
        let Some(password) = self.password.as_deref() else {
            return Err(self.connection_error("no password configured"));
        };

        info!(
            host = %self.host,
            port = self.port,
            user = %self.username,
            exit_status = self.policy.as_str(),
            "connecting"
        );
        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .map_err(|err| self.connection_error(format!("tcp connect failed: {err}")))?;

        let mut session =
            Session::new().map_err(|err| self.connection_error(format!("ssh init: {err}")))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|err| self.connection_error(format!("handshake failed: {err}")))?;
        session
            .userauth_password(&self.username, password)
            .map_err(|err| self.connection_error(format!("authentication failed: {err}")))?;
        if !session.authenticated() {
            return Err(self.connection_error("authentication rejected"));
        }

        self.session = Some(session);
        Ok(())
    }

    /// Best-effort close. Safe before `connect`, after a failed `connect`, and
    /// when called more than once.
    pub fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Err(err) = session.disconnect(None, "jarlift session closed", None) {
            warn!(host = %self.host, error = %err, "ssh disconnect failed");
        } else {
            info!(host = %self.host, "disconnected");
        }
    }

    fn connection_error(&self, reason: impl Into<String>) -> DeployError {
        DeployError::Connection {
            host: self.host.clone(),
            port: self.port,
            reason: reason.into(),
        }
    }
}

impl RemoteExecutor for SshSession {
    fn execute(&mut self, command: &str) -> Result<CommandOutput, DeployError> {
        let channel_error = |reason: String| DeployError::Execution {
            command: command.to_string(),
            reason,
        };
        let capture_stderr = self.captures_stderr();
        let Some(session) = self.session.as_ref() else {
            return Err(channel_error("session is not connected".to_string()));
        };

        debug!(command, "exec");
        let mut channel = session
            .channel_session()
            .map_err(|err| channel_error(format!("failed to open channel: {err}")))?;
        if !capture_stderr {
            channel
                .handle_extended_data(ExtendedData::Ignore)
                .map_err(|err| channel_error(format!("failed to configure stderr: {err}")))?;
        }
        channel
            .exec(command)
            .map_err(|err| channel_error(format!("failed to start command: {err}")))?;

        let mut stdout = Vec::new();
        channel
            .read_to_end(&mut stdout)
            .map_err(|err| channel_error(format!("failed reading stdout: {err}")))?;
        let mut stderr = Vec::new();
        if capture_stderr {
            channel
                .stderr()
                .read_to_end(&mut stderr)
                .map_err(|err| channel_error(format!("failed reading stderr: {err}")))?;
        }
        channel
            .wait_close()
            .map_err(|err| channel_error(format!("failed closing channel: {err}")))?;
        let exit_status = channel
            .exit_status()
            .map_err(|err| channel_error(format!("failed reading exit status: {err}")))?;

        let stdout = String::from_utf8(stdout)
            .map_err(|_| channel_error("command produced non-UTF-8 output".to_string()))?;
        debug!(command, exit_status, bytes = stdout.len(), "exec finished");

        Ok(CommandOutput {
            stdout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        })
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

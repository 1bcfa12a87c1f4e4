use jarlift_core::{
    run_remote, AppConfig, AppLayout, DeployError, ExitStatusPolicy, RemoteExecutor,
    RollbackStatus,
};
use tracing::{debug, info, warn};

use crate::{UpdateOutcome, UpdateState, UpdateStatus, UpdateStep};

/// Check, conditionally update, re-check.
///
/// Without `rollback_on_failure` a failed step or a failed re-check leaves the
/// remote application in whatever state the last command produced: the backup
/// may exist and the live jar may already be replaced.
#[derive(Debug, Clone)]
pub struct UpdateSequencer {
    layout: AppLayout,
    expected_version: String,
    policy: ExitStatusPolicy,
    rollback_on_failure: bool,
}

impl UpdateSequencer {
    pub fn new(app: &AppConfig) -> Self {
        Self {
            layout: AppLayout::new(app),
            expected_version: app.expected_version.clone(),
            policy: app.exit_status,
            rollback_on_failure: app.rollback_on_failure,
        }
    }

    pub fn expected_version(&self) -> &str {
        &self.expected_version
    }

    /// Installed version as reported by the application, whitespace-trimmed.
    pub fn read_version(&self, executor: &mut dyn RemoteExecutor) -> Result<String, DeployError> {
        let raw = run_remote(executor, &self.layout.version_command(), self.policy)?;
        Ok(raw.trim().to_string())
    }

    /// True when the installed version equals the expected string exactly.
    pub fn get_version(&self, executor: &mut dyn RemoteExecutor) -> Result<bool, DeployError> {
        Ok(self.read_version(executor)? == self.expected_version)
    }

    pub fn step_command(&self, step: UpdateStep) -> String {
        match step {
            UpdateStep::Backup => self.layout.backup_command(),
            UpdateStep::Decompress => self.layout.decompress_command(),
            UpdateStep::Install => self.layout.install_command(),
        }
    }

    /// Backup, decompress, install. Stops at the first failing step.
    pub fn update(&self, executor: &mut dyn RemoteExecutor) -> Result<(), DeployError> {
        self.apply_steps(executor).map_err(|(_, err)| err)
    }

    pub fn run(&self, executor: &mut dyn RemoteExecutor) -> Result<UpdateOutcome, DeployError> {
        let mut states = Vec::new();
        enter(&mut states, UpdateState::Checking);
        let current = self.read_version(executor)?;
        if current == self.expected_version {
            info!(version = %current, "installed version is current");
            enter(&mut states, UpdateState::Done);
            return Ok(self.outcome(UpdateStatus::AlreadyCurrent, states));
        }

        info!(
            observed = %current,
            expected = %self.expected_version,
            "installed version is out of date, updating"
        );
        enter(&mut states, UpdateState::Updating);
        if let Err((step, err)) = self.apply_steps(executor) {
            if !self.rollback_on_failure || step == UpdateStep::Backup {
                return Err(err);
            }
            let rollback = self.restore(executor);
            return Err(DeployError::UpdateAborted {
                source: Box::new(err),
                rollback,
            });
        }

        enter(&mut states, UpdateState::Verifying);
        let observed = self.read_version(executor)?;
        if observed == self.expected_version {
            info!(version = %observed, "update verified");
            enter(&mut states, UpdateState::Done);
            return Ok(self.outcome(UpdateStatus::Updated, states));
        }

        warn!(
            observed = %observed,
            expected = %self.expected_version,
            "update failed verification"
        );
        let rollback = if self.rollback_on_failure {
            self.restore(executor)
        } else {
            RollbackStatus::NotAttempted
        };
        enter(&mut states, UpdateState::Failed);
        Ok(self.outcome(
            UpdateStatus::VerificationFailed { observed, rollback },
            states,
        ))
    }

    fn apply_steps(
        &self,
        executor: &mut dyn RemoteExecutor,
    ) -> Result<(), (UpdateStep, DeployError)> {
        for step in UpdateStep::ORDER {
            info!(step = step.as_str(), "update step");
            run_remote(executor, &self.step_command(step), self.policy)
                .map_err(|err| (step, err))?;
        }
        Ok(())
    }

    fn restore(&self, executor: &mut dyn RemoteExecutor) -> RollbackStatus {
        let backup = self.layout.backup_jar_path();
        match run_remote(executor, &self.layout.restore_command(), self.policy) {
            Ok(_) => {
                info!(backup = %backup, "restored previous jar");
                RollbackStatus::Restored
            }
            Err(err) => {
                warn!(backup = %backup, error = %err, "rollback failed");
                RollbackStatus::Failed(err.to_string())
            }
        }
    }

    fn outcome(&self, status: UpdateStatus, states: Vec<UpdateState>) -> UpdateOutcome {
        UpdateOutcome {
            status,
            states,
            expected_version: self.expected_version.clone(),
        }
    }
}

fn enter(states: &mut Vec<UpdateState>, state: UpdateState) {
    debug!(state = state.as_str(), "update state");
    states.push(state);
}

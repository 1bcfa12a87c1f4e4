use jarlift_core::{DeployError, RollbackStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Checking,
    Updating,
    Verifying,
    Done,
    Failed,
}

impl UpdateState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Updating => "updating",
            Self::Verifying => "verifying",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// One mutating remote step of an update, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    Backup,
    Decompress,
    Install,
}

impl UpdateStep {
    pub const ORDER: [UpdateStep; 3] = [Self::Backup, Self::Decompress, Self::Install];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Decompress => "decompress",
            Self::Install => "install",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The installed version already matched; nothing was changed.
    AlreadyCurrent,
    /// The update ran and the post-update check matched.
    Updated,
    /// The update ran but the post-update check still reported `observed`.
    VerificationFailed {
        observed: String,
        rollback: RollbackStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub status: UpdateStatus,
    /// Every state entered, starting with `Checking`.
    pub states: Vec<UpdateState>,
    pub expected_version: String,
}

impl UpdateOutcome {
    pub fn final_state(&self) -> UpdateState {
        self.states.last().copied().unwrap_or(UpdateState::Checking)
    }

    pub fn is_success(&self) -> bool {
        self.final_state() == UpdateState::Done
    }

    /// Turns a failed verification into [`DeployError::VersionMismatch`].
    pub fn verified(self) -> Result<Self, DeployError> {
        match &self.status {
            UpdateStatus::VerificationFailed { observed, .. } => {
                Err(DeployError::VersionMismatch {
                    expected: self.expected_version.clone(),
                    observed: observed.clone(),
                })
            }
            _ => Ok(self),
        }
    }
}

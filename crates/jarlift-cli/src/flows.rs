use std::time::Instant;

use anyhow::{bail, Context, Result};
use jarlift_core::{CommandOutput, DeployConfig, DeployError, RemoteExecutor};
use jarlift_remote::SshSession;
use jarlift_report::ReportBuilder;
use jarlift_updater::{UpdateOutcome, UpdateSequencer, UpdateStatus};

use crate::render::{format_elapsed, TerminalRenderer};

/// Announces each remote command and its result before handing it back.
pub(crate) struct StatusExecutor<'a, E: RemoteExecutor + ?Sized> {
    inner: &'a mut E,
    renderer: TerminalRenderer,
}

impl<'a, E: RemoteExecutor + ?Sized> StatusExecutor<'a, E> {
    pub(crate) fn new(inner: &'a mut E, renderer: TerminalRenderer) -> Self {
        Self { inner, renderer }
    }
}

impl<E: RemoteExecutor + ?Sized> RemoteExecutor for StatusExecutor<'_, E> {
    fn execute(&mut self, command: &str) -> Result<CommandOutput, DeployError> {
        self.renderer.print_command(command);
        let spinner = self.renderer.start_spinner(command);
        let result = self.inner.execute(command);
        let elapsed = spinner.finish();

        match &result {
            Ok(output) if output.success() => self.renderer.print_status(
                "ok",
                &format!("ok ({})", format_elapsed(elapsed)),
            ),
            Ok(output) => self.renderer.print_status(
                "warn",
                &format!(
                    "exit status {} ({})",
                    output.exit_status,
                    format_elapsed(elapsed)
                ),
            ),
            Err(err) => self.renderer.print_status("err", &format!("failed: {err}")),
        }
        result
    }
}

/// Opens the SSH session, runs `body` against it, and always closes it.
pub(crate) fn with_session<T>(
    config: &DeployConfig,
    renderer: TerminalRenderer,
    body: impl FnOnce(&mut dyn RemoteExecutor) -> Result<T>,
) -> Result<T> {
    let mut session =
        SshSession::new(&config.remote).with_exit_status_policy(config.app.exit_status);
    with_session_using(
        &mut session,
        SshSession::connect,
        SshSession::disconnect,
        config,
        renderer,
        body,
    )
}

/// `disconnect` runs exactly once, whether `connect` or `body` failed or not.
pub(crate) fn with_session_using<S, T, Connect, Disconnect>(
    session: &mut S,
    connect: Connect,
    disconnect: Disconnect,
    config: &DeployConfig,
    renderer: TerminalRenderer,
    body: impl FnOnce(&mut dyn RemoteExecutor) -> Result<T>,
) -> Result<T>
where
    S: RemoteExecutor,
    Connect: FnOnce(&mut S) -> Result<(), DeployError>,
    Disconnect: FnOnce(&mut S),
{
    let started_at = Instant::now();
    if let Err(err) = connect(session) {
        disconnect(session);
        return Err(err.into());
    }
    renderer.print_status(
        "ok",
        &format!(
            "connected to {}@{}:{} in {}",
            config.remote.username,
            config.remote.host,
            config.remote.port,
            format_elapsed(started_at.elapsed())
        ),
    );

    let result = {
        let mut executor = StatusExecutor::new(&mut *session, renderer);
        body(&mut executor)
    };
    disconnect(session);
    result
}

pub(crate) fn timed<T>(
    renderer: TerminalRenderer,
    phase: &str,
    body: impl FnOnce() -> Result<T>,
) -> Result<T> {
    renderer.print_section(phase);
    let started_at = Instant::now();
    let result = body();
    let verdict = if result.is_ok() { "finished" } else { "failed" };
    renderer.print_status(
        "step",
        &format!("{phase} {verdict} in {}", format_elapsed(started_at.elapsed())),
    );
    result
}

pub(crate) fn update_phase(
    config: &DeployConfig,
    executor: &mut dyn RemoteExecutor,
    renderer: TerminalRenderer,
) -> Result<UpdateOutcome> {
    let sequencer = UpdateSequencer::new(&config.app);
    let outcome = sequencer.run(executor)?;

    match &outcome.status {
        UpdateStatus::AlreadyCurrent => renderer.print_status(
            "ok",
            &format!("version is current: {}", outcome.expected_version),
        ),
        UpdateStatus::Updated => renderer.print_status(
            "ok",
            &format!("updated: version is now {}", outcome.expected_version),
        ),
        UpdateStatus::VerificationFailed { observed, rollback } => renderer.print_status(
            "err",
            &format!("update failed: version is still '{observed}' (rollback {rollback})"),
        ),
    }

    let outcome = outcome.verified().context("update failed")?;
    Ok(outcome)
}

pub(crate) fn report_phase(
    config: &DeployConfig,
    executor: &mut dyn RemoteExecutor,
    renderer: TerminalRenderer,
) -> Result<String> {
    let builder = ReportBuilder::new(&config.app, &config.report);
    let table = builder.generate(executor)?;
    if table.is_empty() {
        renderer.print_status("warn", "report query returned no rows");
    }
    let rendered = table.render();
    renderer.print_block(&rendered);
    Ok(rendered)
}

pub(crate) fn check_phase(
    config: &DeployConfig,
    executor: &mut dyn RemoteExecutor,
    renderer: TerminalRenderer,
) -> Result<()> {
    let sequencer = UpdateSequencer::new(&config.app);
    let installed = sequencer.read_version(executor)?;
    renderer.print_status("step", &format!("installed: {installed}"));
    renderer.print_status("step", &format!("expected: {}", sequencer.expected_version()));

    if installed != sequencer.expected_version() {
        bail!(
            "version-outdated: installed '{installed}' does not match expected '{}'",
            sequencer.expected_version()
        );
    }
    renderer.print_status("ok", "version is current");
    Ok(())
}

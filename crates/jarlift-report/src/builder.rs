use jarlift_core::{
    run_remote, AppConfig, AppLayout, DeployError, ExitStatusPolicy, RemoteExecutor,
    ReportConfig,
};
use tracing::{debug, info};

use crate::{EchoTokenParser, ReportTable, RowParser};

/// Runs the report query remotely and pivots its output.
pub struct ReportBuilder<P = EchoTokenParser> {
    query_command: String,
    policy: ExitStatusPolicy,
    parser: P,
}

impl ReportBuilder<EchoTokenParser> {
    pub fn new(app: &AppConfig, report: &ReportConfig) -> Self {
        Self::with_parser(app, report, EchoTokenParser)
    }
}

impl<P: RowParser> ReportBuilder<P> {
    pub fn with_parser(app: &AppConfig, report: &ReportConfig, parser: P) -> Self {
        Self {
            query_command: AppLayout::new(app).query_command(&report.query),
            policy: app.exit_status,
            parser,
        }
    }

    pub fn query_command(&self) -> &str {
        &self.query_command
    }

    pub fn generate(&self, executor: &mut dyn RemoteExecutor) -> Result<ReportTable, DeployError> {
        let raw = run_remote(executor, &self.query_command, self.policy)?;
        let rows = self.parser.parse(raw.trim())?;
        debug!(rows = rows.len(), "parsed report rows");

        let table = ReportTable::pivot(&rows)?;
        info!(
            students = table.row_labels().len(),
            classes = table.column_labels().len(),
            "report pivoted"
        );
        Ok(table)
    }
}

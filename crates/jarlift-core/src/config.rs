use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{DeployError, ExitStatusPolicy};

const DEFAULT_QUERY: &str = "
    SELECT
        students.name,
        students.age,
        classes.name AS class_name,
        grades.grade
    FROM students
    JOIN grades ON students.id = grades.student_id
    JOIN classes ON grades.class_id = classes.id
    ";

const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub remote: RemoteConfig,
    pub app: AppConfig,
    pub report: ReportConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workdir: String,
    pub exec: String,
    pub jar_name: String,
    pub expected_version: String,
    pub backup_label: String,
    pub exit_status: ExitStatusPolicy,
    pub rollback_on_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2222,
            username: "root".to_string(),
            password: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: "/opt/local/apps".to_string(),
            exec: "java -jar sql.jar".to_string(),
            jar_name: "sql.jar".to_string(),
            expected_version: "App version: 1.1".to_string(),
            backup_label: "1.0".to_string(),
            exit_status: ExitStatusPolicy::Ignore,
            rollback_on_failure: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
        }
    }
}

impl DeployConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse jarlift config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DeployError> {
        if self.remote.host.trim().is_empty() {
            return Err(invalid("remote.host must not be empty"));
        }
        if self.remote.port == 0 {
            return Err(invalid("remote.port must not be 0"));
        }
        if self.remote.username.trim().is_empty() {
            return Err(invalid("remote.username must not be empty"));
        }

        let app = &self.app;
        if !app.workdir.starts_with('/') {
            return Err(invalid(format!(
                "app.workdir must be an absolute path: '{}'",
                app.workdir
            )));
        }
        if app.exec.trim().is_empty() {
            return Err(invalid("app.exec must not be empty"));
        }
        if app.jar_name.contains('/') || !app.jar_name.ends_with(".jar") || app.jar_name == ".jar"
        {
            return Err(invalid(format!(
                "app.jar_name must be a bare '<name>.jar' file name: '{}'",
                app.jar_name
            )));
        }
        if app.expected_version.trim().is_empty() {
            return Err(invalid("app.expected_version must not be empty"));
        }
        if app.backup_label.trim().is_empty() || app.backup_label.contains('/') {
            return Err(invalid(format!(
                "app.backup_label must be a non-empty path segment: '{}'",
                app.backup_label
            )));
        }

        if self.report.query.trim().is_empty() {
            return Err(invalid("report.query must not be empty"));
        }
        if self.report.query.contains('\'') {
            return Err(invalid(
                "report.query must not contain single quotes: it is passed inside '...'",
            ));
        }

        if let Some(url) = &self.notify.webhook_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(invalid(format!(
                    "notify.webhook_url must be an http(s) URL: '{url}'"
                )));
            }
        }

        Ok(())
    }

    /// Copy safe to print: the password, when set, is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.remote.password.is_some() {
            copy.remote.password = Some(REDACTED.to_string());
        }
        copy
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize jarlift config")
    }
}

fn invalid(reason: impl Into<String>) -> DeployError {
    DeployError::Config(reason.into())
}

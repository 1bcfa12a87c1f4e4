use crate::AppConfig;

/// Remote paths and the exact shell commands derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    workdir: String,
    exec: String,
    jar_name: String,
    backup_label: String,
}

impl AppLayout {
    pub fn new(app: &AppConfig) -> Self {
        let trimmed = app.workdir.trim_end_matches('/');
        let workdir = if trimmed.is_empty() { "/" } else { trimmed };
        Self {
            workdir: workdir.to_string(),
            exec: app.exec.clone(),
            jar_name: app.jar_name.clone(),
            backup_label: app.backup_label.clone(),
        }
    }

    pub fn workdir(&self) -> &str {
        &self.workdir
    }

    pub fn jar_path(&self) -> String {
        join_path(&self.workdir, &self.jar_name)
    }

    pub fn versions_dir(&self) -> String {
        join_path(&self.workdir, "versions")
    }

    pub fn jar_stem(&self) -> &str {
        self.jar_name
            .strip_suffix(".jar")
            .unwrap_or(self.jar_name.as_str())
    }

    pub fn backup_jar_path(&self) -> String {
        join_path(
            &self.versions_dir(),
            &format!("{}@{}.jar", self.jar_stem(), self.backup_label),
        )
    }

    pub fn staged_archive_path(&self) -> String {
        join_path(&self.versions_dir(), &format!("{}.zst", self.jar_name))
    }

    pub fn staged_jar_path(&self) -> String {
        join_path(&self.versions_dir(), &self.jar_name)
    }

    pub fn version_command(&self) -> String {
        format!("cd {} && {} -version", self.workdir, self.exec)
    }

    pub fn backup_command(&self) -> String {
        format!("cp {} {}", self.jar_path(), self.backup_jar_path())
    }

    pub fn decompress_command(&self) -> String {
        format!("zstd -d {}", self.staged_archive_path())
    }

    pub fn install_command(&self) -> String {
        format!("cp {} {}", self.staged_jar_path(), self.jar_path())
    }

    pub fn restore_command(&self) -> String {
        format!("cp {} {}", self.backup_jar_path(), self.jar_path())
    }

    pub fn query_command(&self, query: &str) -> String {
        format!("cd {} && {} -query '{}'", self.workdir, self.exec, query)
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

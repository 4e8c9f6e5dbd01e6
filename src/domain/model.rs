use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 從 import 行解析出的候選模組名稱
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 套件管理器安裝用的發行名稱，可能與模組名稱不同
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "package", rename_all = "snake_case")]
pub enum Resolution {
    /// Fixed mapping from the override table.
    Override(PackageName),
    /// Canonical key of a distribution already installed locally.
    Installed(PackageName),
    NotFound,
}

impl Resolution {
    pub fn package(&self) -> Option<&PackageName> {
        match self {
            Resolution::Override(name) | Resolution::Installed(name) => Some(name),
            Resolution::NotFound => None,
        }
    }

    /// 找不到時退回使用模組名稱本身
    pub fn install_target(&self, module: &ModuleName) -> PackageName {
        self.package()
            .cloned()
            .unwrap_or_else(|| PackageName::new(module.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallOutcome {
    Installed {
        module: ModuleName,
        package: PackageName,
    },
    Failed {
        module: ModuleName,
        error: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    pub requirements_file: Option<PathBuf>,
    pub requirements_installed: Option<bool>,
    pub outcomes: Vec<InstallOutcome>,
}

impl InstallReport {
    pub fn installed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, InstallOutcome::Installed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.installed_count()
    }

    pub fn requirements_failed(&self) -> bool {
        self.requirements_installed == Some(false)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0 || self.requirements_failed()
    }

    pub fn failure_summary(&self) -> String {
        failure_summary(self.failed_count(), self.requirements_failed())
    }
}

/// e.g. `requirements.txt and 2 install(s) failed`.
pub fn failure_summary(failed: usize, requirements_failed: bool) -> String {
    match (requirements_failed, failed) {
        (true, 0) => "requirements.txt install failed".to_string(),
        (true, n) => format!("requirements.txt and {} install(s) failed", n),
        (false, n) => format!("{} install(s) failed", n),
    }
}

/// One module in a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlannedStep {
    Resolved {
        module: ModuleName,
        resolution: Resolution,
        package: PackageName,
    },
    /// 查詢失敗不影響其他模組
    LookupFailed { module: ModuleName, error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DryRunPlan {
    pub requirements_file: Option<PathBuf>,
    pub steps: Vec<PlannedStep>,
}

impl DryRunPlan {
    pub fn lookup_failures(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, PlannedStep::LookupFailed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The script ran; carries its exit code (`None` when the platform reports none).
    Completed { exit_code: Option<i32> },
    /// `--strict` and something failed to install, so the script was not started.
    InstallFailed {
        failed: usize,
        requirements_failed: bool,
    },
    /// Dry run: nothing installed, nothing executed.
    Planned(DryRunPlan),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub report: InstallReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_target_falls_back_to_module_name() {
        let module = ModuleName::from("requests");
        assert_eq!(
            Resolution::NotFound.install_target(&module),
            PackageName::from("requests")
        );
        assert_eq!(
            Resolution::Override(PackageName::from("Pillow")).install_target(&ModuleName::from("PIL")),
            PackageName::from("Pillow")
        );
    }

    #[test]
    fn test_report_counts() {
        let report = InstallReport {
            requirements_file: None,
            requirements_installed: None,
            outcomes: vec![
                InstallOutcome::Installed {
                    module: "requests".into(),
                    package: "requests".into(),
                },
                InstallOutcome::Failed {
                    module: "PIL".into(),
                    error: "boom".to_string(),
                },
            ],
        };
        assert_eq!(report.installed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_failed_requirements_counts_as_failure() {
        let report = InstallReport {
            requirements_file: Some(PathBuf::from("requirements.txt")),
            requirements_installed: Some(false),
            outcomes: vec![],
        };
        assert!(report.has_failures());
        assert!(report.requirements_failed());
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.failure_summary(), "requirements.txt install failed");
    }

    #[test]
    fn test_failure_summary_wording() {
        assert_eq!(failure_summary(2, false), "2 install(s) failed");
        assert_eq!(failure_summary(1, true), "requirements.txt and 1 install(s) failed");
    }

    #[test]
    fn test_plan_counts_lookup_failures() {
        let plan = DryRunPlan {
            requirements_file: None,
            steps: vec![
                PlannedStep::Resolved {
                    module: "PIL".into(),
                    resolution: Resolution::Override("Pillow".into()),
                    package: "Pillow".into(),
                },
                PlannedStep::LookupFailed {
                    module: "requests".into(),
                    error: "Failed to launch 'python3'".to_string(),
                },
            ],
        };
        assert_eq!(plan.lookup_failures(), 1);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["steps"][1]["status"], "lookup_failed");
        assert_eq!(json["steps"][0]["package"], "Pillow");
    }
}

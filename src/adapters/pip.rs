use crate::domain::model::PackageName;
use crate::domain::ports::{DistributionLookup, Installer};
use crate::utils::error::{ReqrunError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;
use tokio::sync::OnceCell;

/// Runs `<python> -m pip install ...` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    python: String,
    extra_args: Vec<String>,
}

impl PipInstaller {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            extra_args: Vec::new(),
        }
    }

    /// Appended to every `pip install` call (e.g. `--index-url`).
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn install_args(&self, targets: &[&str]) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
        args.extend(targets.iter().map(|t| t.to_string()));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    async fn pip(&self, target: &str, args: Vec<String>) -> Result<()> {
        tracing::debug!("{} {}", self.python, args.join(" "));

        let status = Command::new(&self.python)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ReqrunError::SpawnError {
                program: self.python.clone(),
                source,
            })?;

        check_status(target, status)
    }
}

fn check_status(target: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ReqrunError::InstallError {
            target: target.to_string(),
            code: status.code(),
        })
    }
}

#[async_trait]
impl Installer for PipInstaller {
    async fn install_requirements(&self, requirements: &Path) -> Result<()> {
        let path = requirements.to_string_lossy().into_owned();
        let args = self.install_args(&["-r", path.as_str()]);
        self.pip(&path, args).await
    }

    async fn install_package(&self, package: &PackageName, upgrade: bool) -> Result<()> {
        let args = if upgrade {
            self.install_args(&["--upgrade", package.as_str()])
        } else {
            self.install_args(&[package.as_str()])
        };
        self.pip(package.as_str(), args).await
    }
}

#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
}

/// Lower-cased project name with runs of characters other than letters, digits and `.`
/// collapsed to `-`. Dots are kept, so `zope_interface` and `zope.interface` differ.
pub fn distribution_key(name: &str) -> String {
    match Regex::new(r"[^A-Za-z0-9.]+") {
        Ok(re) => re.replace_all(name, "-").to_lowercase(),
        Err(_) => name.to_lowercase(),
    }
}

/// Parses `pip list --format=json` into the set of installed distribution keys.
pub fn parse_pip_list(json: &str) -> Result<HashSet<String>> {
    let entries: Vec<PipListEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|e| distribution_key(&e.name))
        .collect())
}

/// Installed-distribution lookup backed by a single `pip list` call, cached for the run.
pub struct PipDistributionLookup {
    python: String,
    installed: OnceCell<HashSet<String>>,
}

impl PipDistributionLookup {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            installed: OnceCell::new(),
        }
    }

    /// Lookup over a fixed listing, skipping the subprocess.
    pub fn from_listing(installed: HashSet<String>) -> Self {
        Self {
            python: String::new(),
            installed: OnceCell::new_with(Some(installed)),
        }
    }

    async fn load(&self) -> Result<HashSet<String>> {
        let output = Command::new(&self.python)
            .args(["-m", "pip", "list", "--format=json", "--disable-pip-version-check"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ReqrunError::SpawnError {
                program: self.python.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReqrunError::LookupError {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let installed = parse_pip_list(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!("{} distribution(s) installed", installed.len());
        Ok(installed)
    }
}

#[async_trait]
impl DistributionLookup for PipDistributionLookup {
    async fn find_installed(&self, name: &str) -> Result<Option<PackageName>> {
        let installed = self.installed.get_or_try_init(|| self.load()).await?;
        let key = distribution_key(name);
        Ok(installed.contains(&key).then(|| PackageName::new(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIP_LIST: &str = r#"[
        {"name": "Flask", "version": "3.0.3"},
        {"name": "typing_extensions", "version": "4.12.2"},
        {"name": "Pillow", "version": "10.4.0"},
        {"name": "zope.interface", "version": "6.4"}
    ]"#;

    #[test]
    fn test_distribution_key() {
        assert_eq!(distribution_key("Typing_Extensions"), "typing-extensions");
        assert_eq!(distribution_key("typing_extensions"), "typing-extensions");
        assert_eq!(distribution_key("zope.interface"), "zope.interface");
        assert_eq!(distribution_key("Flask"), "flask");
    }

    #[test]
    fn test_parse_pip_list() {
        let installed = parse_pip_list(PIP_LIST).unwrap();
        assert_eq!(installed.len(), 4);
        assert!(installed.contains("flask"));
        assert!(installed.contains("zope.interface"));
        assert!(parse_pip_list("not json").is_err());
    }

    #[tokio::test]
    async fn test_lookup_uses_exact_module_name() {
        let lookup = PipDistributionLookup::from_listing(parse_pip_list(PIP_LIST).unwrap());

        assert_eq!(
            lookup.find_installed("flask").await.unwrap(),
            Some(PackageName::from("flask"))
        );
        assert_eq!(
            lookup.find_installed("typing_extensions").await.unwrap(),
            Some(PackageName::from("typing-extensions"))
        );
        // 模組名稱 PIL 並不是發行名稱
        assert_eq!(lookup.find_installed("PIL").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_keeps_dots_significant() {
        let lookup = PipDistributionLookup::from_listing(parse_pip_list(PIP_LIST).unwrap());

        assert_eq!(
            lookup.find_installed("zope.interface").await.unwrap(),
            Some(PackageName::from("zope.interface"))
        );
        assert_eq!(lookup.find_installed("zope_interface").await.unwrap(), None);
    }

    #[test]
    fn test_install_args() {
        let installer = PipInstaller::new("python3")
            .with_extra_args(vec!["--index-url".to_string(), "https://mirror/simple".to_string()]);

        assert_eq!(
            installer.install_args(&["--upgrade", "requests"]),
            vec![
                "-m",
                "pip",
                "install",
                "--upgrade",
                "requests",
                "--index-url",
                "https://mirror/simple"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let installer = PipInstaller::new("/nonexistent/reqrun-python");
        let result = installer
            .install_package(&PackageName::from("requests"), true)
            .await;
        assert!(matches!(result, Err(ReqrunError::SpawnError { .. })));
    }
}

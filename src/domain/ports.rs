use crate::domain::model::PackageName;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// External package installer (pip in production).
#[async_trait]
pub trait Installer: Send + Sync {
    /// Batch install from a requirements file, passed through unmodified.
    async fn install_requirements(&self, requirements: &Path) -> Result<()>;
    async fn install_package(&self, package: &PackageName, upgrade: bool) -> Result<()>;
}

/// Query facility for distributions already installed in the environment.
#[async_trait]
pub trait DistributionLookup: Send + Sync {
    /// Returns the canonical key of the installed distribution named `name`, if any.
    async fn find_installed(&self, name: &str) -> Result<Option<PackageName>>;
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run_script(&self, script: &Path) -> Result<Option<i32>>;
}

pub trait ConfigProvider: Send + Sync {
    fn python(&self) -> &str;
    fn already_available(&self) -> Vec<String>;
    fn extra_stdlib(&self) -> Vec<String>;
    fn overrides(&self) -> HashMap<String, String>;
    fn use_default_overrides(&self) -> bool;
    fn pip_args(&self) -> Vec<String>;
}

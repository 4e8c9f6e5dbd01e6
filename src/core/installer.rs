use crate::core::resolver::PackageResolver;
use crate::domain::model::{InstallOutcome, InstallReport, ModuleName, PackageName, Resolution};
use crate::domain::ports::{DistributionLookup, Installer};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// `requirements.txt` next to the script, if it exists.
pub fn sibling_requirements(script: &Path) -> Option<PathBuf> {
    let dir = script.parent().unwrap_or_else(|| Path::new(""));
    let candidate = dir.join(REQUIREMENTS_FILE);
    candidate.is_file().then_some(candidate)
}

/// Best-effort installation: every failure is logged and recorded, nothing aborts the batch.
pub struct InstallSession<I: Installer, L: DistributionLookup> {
    installer: I,
    resolver: PackageResolver<L>,
}

impl<I: Installer, L: DistributionLookup> InstallSession<I, L> {
    pub fn new(installer: I, resolver: PackageResolver<L>) -> Self {
        Self {
            installer,
            resolver,
        }
    }

    pub fn resolver(&self) -> &PackageResolver<L> {
        &self.resolver
    }

    pub async fn install_all(&self, script: &Path, modules: &[ModuleName]) -> InstallReport {
        let mut report = InstallReport::default();

        if let Some(requirements) = sibling_requirements(script) {
            tracing::info!("📦 Installing from {}", requirements.display());
            let ok = match self.installer.install_requirements(&requirements).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("❌ Exception while installing dependencies: {}", e);
                    false
                }
            };
            report.requirements_file = Some(requirements);
            report.requirements_installed = Some(ok);
        }

        for module in modules {
            let outcome = match self.install_module(module).await {
                Ok(package) => InstallOutcome::Installed {
                    module: module.clone(),
                    package,
                },
                Err(e) => {
                    tracing::error!("❌ Error while installing module \"{}\": {}", module, e);
                    InstallOutcome::Failed {
                        module: module.clone(),
                        error: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Install finished: {} installed, {} failed",
            report.installed_count(),
            report.failed_count()
        );
        report
    }

    async fn install_module(&self, module: &ModuleName) -> Result<PackageName> {
        let resolution = self.resolver.resolve(module).await?;
        if resolution == Resolution::NotFound {
            tracing::warn!(
                "⚠️ No installed distribution named '{}', installing it under that name",
                module
            );
        }

        let package = resolution.install_target(module);
        self.installer.install_package(&package, true).await?;
        Ok(package)
    }
}

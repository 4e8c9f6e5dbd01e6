use crate::core::installer::{sibling_requirements, InstallSession};
use crate::core::scanner::ImportScanner;
use crate::domain::model::{
    DryRunPlan, InstallReport, ModuleName, PlannedStep, Resolution, RunOutcome, RunSummary,
};
use crate::domain::ports::{DistributionLookup, Installer, ScriptRunner};
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Refuse to run the script when any install failed.
    pub strict: bool,
    /// Scan and resolve only.
    pub dry_run: bool,
}

/// Result of the scan and install phases.
#[derive(Debug, Clone)]
pub enum Prepared {
    /// Installs are done and the script may be started.
    Ready(InstallReport),
    /// Nothing left to run (dry run, or `--strict` with failures).
    Finished(RunSummary),
}

/// Scan → install → run.
pub struct RunEngine<I: Installer, L: DistributionLookup, R: ScriptRunner> {
    scanner: ImportScanner,
    session: InstallSession<I, L>,
    runner: R,
    options: EngineOptions,
}

impl<I: Installer, L: DistributionLookup, R: ScriptRunner> RunEngine<I, L, R> {
    pub fn new(scanner: ImportScanner, session: InstallSession<I, L>, runner: R) -> Self {
        Self::new_with_options(scanner, session, runner, EngineOptions::default())
    }

    pub fn new_with_options(
        scanner: ImportScanner,
        session: InstallSession<I, L>,
        runner: R,
        options: EngineOptions,
    ) -> Self {
        Self {
            scanner,
            session,
            runner,
            options,
        }
    }

    pub async fn run(&self, script: &Path) -> Result<RunSummary> {
        match self.prepare(script).await? {
            Prepared::Finished(summary) => Ok(summary),
            Prepared::Ready(report) => self.execute(script, report).await,
        }
    }

    /// Scan and install. A missing script is an error here: nothing is installed.
    pub async fn prepare(&self, script: &Path) -> Result<Prepared> {
        let modules = self.scanner.scan_file(script)?;
        tracing::info!("🔍 {} candidate module(s) in {}", modules.len(), script.display());

        if self.options.dry_run {
            let plan = self.plan(script, &modules).await;
            print_plan(script, &plan);
            return Ok(Prepared::Finished(RunSummary {
                outcome: RunOutcome::Planned(plan),
                report: InstallReport::default(),
            }));
        }

        let report = self.session.install_all(script, &modules).await;

        if self.options.strict && report.has_failures() {
            tracing::error!(
                "❌ {}, not running {}",
                report.failure_summary(),
                script.display()
            );
            return Ok(Prepared::Finished(RunSummary {
                outcome: RunOutcome::InstallFailed {
                    failed: report.failed_count(),
                    requirements_failed: report.requirements_failed(),
                },
                report,
            }));
        }

        Ok(Prepared::Ready(report))
    }

    /// Runs the script and waits for it to exit.
    pub async fn execute(&self, script: &Path, report: InstallReport) -> Result<RunSummary> {
        tracing::info!("🚀 Running {}", script.display());
        let exit_code = self.runner.run_script(script).await?;
        tracing::debug!("Script exited with {:?}", exit_code);

        Ok(RunSummary {
            outcome: RunOutcome::Completed { exit_code },
            report,
        })
    }

    /// Resolves every module; a failed lookup is recorded for that module only.
    pub async fn plan(&self, script: &Path, modules: &[ModuleName]) -> DryRunPlan {
        let mut steps = Vec::with_capacity(modules.len());
        for module in modules {
            let step = match self.session.resolver().resolve(module).await {
                Ok(resolution) => PlannedStep::Resolved {
                    module: module.clone(),
                    package: resolution.install_target(module),
                    resolution,
                },
                Err(e) => {
                    tracing::warn!("⚠️ Lookup failed for \"{}\": {}", module, e);
                    PlannedStep::LookupFailed {
                        module: module.clone(),
                        error: e.to_string(),
                    }
                }
            };
            steps.push(step);
        }

        DryRunPlan {
            requirements_file: sibling_requirements(script),
            steps,
        }
    }
}

fn print_plan(script: &Path, plan: &DryRunPlan) {
    println!("🔍 Dry Run Analysis for {}:", script.display());

    match &plan.requirements_file {
        Some(path) => println!("  requirements: pip install -r {}", path.display()),
        None => println!("  requirements: (none)"),
    }

    if plan.steps.is_empty() {
        println!("  No third-party modules found");
    }

    for step in &plan.steps {
        match step {
            PlannedStep::Resolved {
                module,
                resolution,
                package,
            } => {
                let note = match resolution {
                    Resolution::Override(_) => "override",
                    Resolution::Installed(_) => "installed",
                    Resolution::NotFound => "not installed",
                };
                println!("  {} -> pip install --upgrade {} ({})", module, package, note);
            }
            PlannedStep::LookupFailed { module, error } => {
                println!("  {} -> lookup failed: {}", module, error);
            }
        }
    }
}

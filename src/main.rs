use clap::Parser;
use reqrun::app::{pip_engine, PipEngine};
use reqrun::core::engine::Prepared;
use reqrun::domain::model::failure_summary;
use reqrun::utils::error::ErrorSeverity;
use reqrun::utils::{logger, validation::Validate};
use reqrun::{CliConfig, EngineOptions, InstallReport, ReqrunError, RunOutcome, RunSummary};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

const EXIT_INSTALL_FAILED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let mut config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 載入設定檔並驗證
    if let Err(e) = config.load_config_file().and_then(|()| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return ExitCode::FAILURE;
    }

    let options = EngineOptions {
        strict: config.strict,
        dry_run: config.dry_run,
    };
    let engine = pip_engine(&config, options);
    let script = config.script_path();

    // 只在掃描與安裝階段攔截 Ctrl-C；腳本啟動後由腳本自行處理
    let prepared = tokio::select! {
        prepared = engine.prepare(&script) => prepared,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Stopped correctly");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    let result = match prepared {
        Ok(Prepared::Ready(report)) => wait_for_script(&engine, &script, report).await,
        Ok(Prepared::Finished(summary)) => Ok(summary),
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) => {
            if let Some(path) = &config.report {
                let written = match &summary.outcome {
                    RunOutcome::Planned(plan) => write_json(path, plan),
                    _ => write_json(path, &summary.report),
                };
                if let Err(e) = written {
                    tracing::error!("❌ Failed to write report to {}: {}", path, e);
                }
            }

            match summary.outcome {
                RunOutcome::Completed { exit_code } => {
                    tracing::info!("✅ {} finished ({:?})", config.file_to_run, exit_code);
                    exit_code
                        .and_then(|code| u8::try_from(code).ok())
                        .map(ExitCode::from)
                        .unwrap_or(ExitCode::FAILURE)
                }
                RunOutcome::InstallFailed {
                    failed,
                    requirements_failed,
                } => {
                    eprintln!(
                        "❌ {}, {} was not run",
                        failure_summary(failed, requirements_failed),
                        config.file_to_run
                    );
                    ExitCode::from(EXIT_INSTALL_FAILED)
                }
                RunOutcome::Planned(plan) => {
                    if plan.lookup_failures() > 0 {
                        tracing::warn!("⚠️ {} lookup(s) failed during dry run", plan.lookup_failures());
                    }
                    ExitCode::SUCCESS
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Exception: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            match e.severity() {
                ErrorSeverity::Low => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// The child shares the terminal's process group, so it receives Ctrl-C itself.
/// The signal is only absorbed here while the script finishes its own cleanup.
async fn wait_for_script(
    engine: &PipEngine,
    script: &Path,
    report: InstallReport,
) -> reqrun::Result<RunSummary> {
    let execute = engine.execute(script, report);
    tokio::pin!(execute);

    let mut interrupted = false;
    loop {
        tokio::select! {
            result = &mut execute => return result,
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                tracing::info!("Stopped correctly, waiting for {} to exit", script.display());
            }
        }
    }
}

fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), ReqrunError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    tracing::info!("📁 Report saved to: {}", path);
    Ok(())
}

use crate::config::toml_config::TomlConfig;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_module_name, validate_non_empty_string, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "reqrun")]
#[command(about = "Install the requirements of a Python file, then run it")]
pub struct CliConfig {
    /// The file you want to run
    pub file_to_run: String,

    /// Python interpreter used for pip and for running the file [default: python3]
    #[arg(long)]
    pub python: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Modules that are already available and must not be installed
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Start from an empty override table instead of the built-in one
    #[arg(long)]
    pub no_default_overrides: bool,

    /// Show what would be installed without installing or running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not run the file if any install failed, and exit non-zero
    #[arg(long)]
    pub strict: bool,

    /// Write the install report as JSON to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(skip)]
    pub overrides: HashMap<String, String>,

    #[arg(skip)]
    pub extra_stdlib: Vec<String>,

    #[arg(skip)]
    pub pip_args: Vec<String>,
}

impl CliConfig {
    /// 合併設定檔，命令列參數優先
    pub fn merge_file(&mut self, file: TomlConfig) {
        if self.python.is_none() {
            self.python = file.python;
        }
        if file.use_default_overrides == Some(false) {
            self.no_default_overrides = true;
        }
        for (module, package) in file.overrides {
            self.overrides.entry(module).or_insert(package);
        }
        self.skip.extend(file.already_available);
        self.extra_stdlib.extend(file.extra_stdlib);
        self.pip_args.extend(file.pip_args);
    }

    /// Loads and merges `--config` if given.
    pub fn load_config_file(&mut self) -> Result<()> {
        if let Some(path) = self.config.clone() {
            let file = TomlConfig::from_file(&path)?;
            file.validate()?;
            tracing::debug!("Loaded configuration from {}", path);
            self.merge_file(file);
        }
        Ok(())
    }

    pub fn script_path(&self) -> PathBuf {
        PathBuf::from(&self.file_to_run)
    }
}

impl ConfigProvider for CliConfig {
    fn python(&self) -> &str {
        self.python.as_deref().unwrap_or(DEFAULT_PYTHON)
    }

    fn already_available(&self) -> Vec<String> {
        self.skip.clone()
    }

    fn extra_stdlib(&self) -> Vec<String> {
        self.extra_stdlib.clone()
    }

    fn overrides(&self) -> HashMap<String, String> {
        self.overrides.clone()
    }

    fn use_default_overrides(&self) -> bool {
        !self.no_default_overrides
    }

    fn pip_args(&self) -> Vec<String> {
        self.pip_args.clone()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("file_to_run", &self.file_to_run)?;
        validate_non_empty_string("python", ConfigProvider::python(self))?;

        if let Some(report) = &self.report {
            validate_path("report", report)?;
        }

        for name in &self.skip {
            validate_module_name("skip", name)?;
        }

        Ok(())
    }
}

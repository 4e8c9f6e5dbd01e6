pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::TomlConfig;
pub use self::core::{
    engine::{EngineOptions, RunEngine},
    installer::InstallSession,
    resolver::{NameOverrides, PackageResolver},
    scanner::ImportScanner,
};
pub use domain::model::{InstallReport, ModuleName, PackageName, Resolution, RunOutcome, RunSummary};
pub use utils::error::{ReqrunError, Result};

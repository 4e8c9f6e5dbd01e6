pub mod engine;
pub mod installer;
pub mod resolver;
pub mod scanner;
pub mod stdlib;

pub use crate::domain::model::{InstallReport, ModuleName, PackageName, Resolution};
pub use crate::domain::ports::{ConfigProvider, DistributionLookup, Installer, ScriptRunner};
pub use crate::utils::error::Result;

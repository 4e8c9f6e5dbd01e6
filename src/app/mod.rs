// Application layer: wires the pip/python adapters into the engine from configuration.

use crate::adapters::{PipDistributionLookup, PipInstaller, PythonRunner};
use crate::core::engine::{EngineOptions, RunEngine};
use crate::core::installer::InstallSession;
use crate::core::resolver::{NameOverrides, PackageResolver};
use crate::core::scanner::ImportScanner;
use crate::core::ConfigProvider;

pub type PipEngine = RunEngine<PipInstaller, PipDistributionLookup, PythonRunner>;

pub fn name_overrides<C: ConfigProvider>(config: &C) -> NameOverrides {
    let mut overrides = if config.use_default_overrides() {
        NameOverrides::with_defaults()
    } else {
        NameOverrides::empty()
    };
    overrides.extend(config.overrides());
    overrides
}

pub fn pip_engine<C: ConfigProvider>(config: &C, options: EngineOptions) -> PipEngine {
    let python = config.python();

    let scanner = ImportScanner::new()
        .with_already_available(config.already_available())
        .with_extra_stdlib(config.extra_stdlib());

    let overrides = name_overrides(config);
    tracing::debug!("{} name override(s) active", overrides.len());

    let resolver = PackageResolver::new(overrides, PipDistributionLookup::new(python));
    let installer = PipInstaller::new(python).with_extra_args(config.pip_args());
    let session = InstallSession::new(installer, resolver);

    RunEngine::new_with_options(scanner, session, PythonRunner::new(python), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PackageName;
    use std::collections::HashMap;

    struct StaticConfig {
        defaults: bool,
        overrides: HashMap<String, String>,
    }

    impl ConfigProvider for StaticConfig {
        fn python(&self) -> &str {
            "python3"
        }

        fn already_available(&self) -> Vec<String> {
            vec![]
        }

        fn extra_stdlib(&self) -> Vec<String> {
            vec![]
        }

        fn overrides(&self) -> HashMap<String, String> {
            self.overrides.clone()
        }

        fn use_default_overrides(&self) -> bool {
            self.defaults
        }

        fn pip_args(&self) -> Vec<String> {
            vec![]
        }
    }

    #[test]
    fn test_name_overrides_from_config() {
        let config = StaticConfig {
            defaults: true,
            overrides: HashMap::from([("PIL".to_string(), "pillow-simd".to_string())]),
        };
        let overrides = name_overrides(&config);
        assert_eq!(overrides.get("PIL"), Some(&PackageName::from("pillow-simd")));
        assert_eq!(overrides.get("yaml"), Some(&PackageName::from("PyYAML")));

        let config = StaticConfig {
            defaults: false,
            overrides: HashMap::new(),
        };
        assert!(name_overrides(&config).is_empty());
    }
}

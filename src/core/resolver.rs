use crate::domain::model::{ModuleName, PackageName, Resolution};
use crate::domain::ports::DistributionLookup;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Import names whose distribution is published under a different name.
pub const DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("PIL", "Pillow"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("sklearn", "scikit-learn"),
    ("yaml", "PyYAML"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameOverrides {
    entries: HashMap<String, PackageName>,
}

impl NameOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut overrides = Self::empty();
        for (module, package) in DEFAULT_OVERRIDES {
            overrides.insert(*module, *package);
        }
        overrides
    }

    /// Adds or replaces the mapping for `module`.
    pub fn insert(&mut self, module: impl Into<String>, package: impl Into<String>) {
        self.entries
            .insert(module.into(), PackageName::new(package.into()));
    }

    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (module, package) in entries {
            self.insert(module, package);
        }
    }

    pub fn get(&self, module: &str) -> Option<&PackageName> {
        self.entries.get(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct PackageResolver<L: DistributionLookup> {
    overrides: NameOverrides,
    lookup: L,
}

impl<L: DistributionLookup> PackageResolver<L> {
    pub fn new(overrides: NameOverrides, lookup: L) -> Self {
        Self { overrides, lookup }
    }

    /// Overrides win; otherwise the locally installed distribution under the exact
    /// module name. No remote index is consulted.
    pub async fn resolve(&self, module: &ModuleName) -> Result<Resolution> {
        if let Some(package) = self.overrides.get(module.as_str()) {
            tracing::debug!("Override: {} -> {}", module, package);
            return Ok(Resolution::Override(package.clone()));
        }

        match self.lookup.find_installed(module.as_str()).await? {
            Some(package) => {
                tracing::debug!("Installed distribution for {}: {}", module, package);
                Ok(Resolution::Installed(package))
            }
            None => Ok(Resolution::NotFound),
        }
    }
}

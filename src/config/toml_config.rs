use crate::utils::error::{ReqrunError, Result};
use crate::utils::validation::{
    validate_module_name, validate_non_empty_string, validate_package_name, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 選用的 TOML 設定檔，所有欄位皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub python: Option<String>,
    pub use_default_overrides: Option<bool>,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
    #[serde(default)]
    pub already_available: Vec<String>,
    #[serde(default)]
    pub extra_stdlib: Vec<String>,
    #[serde(default)]
    pub pip_args: Vec<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReqrunError::ConfigError {
                message: format!("Config file not found: {}", path.as_ref().display()),
            },
            _ => ReqrunError::IoError(e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReqrunError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PIP_INDEX_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReqrunError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(python) = &self.python {
            validate_non_empty_string("python", python)?;
        }

        for (module, package) in &self.overrides {
            validate_module_name("overrides", module)?;
            validate_package_name(&format!("overrides.{}", module), package)?;
        }

        for name in &self.already_available {
            validate_module_name("already_available", name)?;
        }

        for name in &self.extra_stdlib {
            validate_module_name("extra_stdlib", name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
python = "python3.12"
use_default_overrides = false
already_available = ["mylib"]
extra_stdlib = ["_vendored"]
pip_args = ["--index-url", "https://pypi.example.com/simple"]

[overrides]
cv2 = "opencv-python-headless"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.python.as_deref(), Some("python3.12"));
        assert_eq!(config.use_default_overrides, Some(false));
        assert_eq!(
            config.overrides.get("cv2").map(String::as_str),
            Some("opencv-python-headless")
        );
        assert_eq!(config.already_available, vec!["mylib"]);
        assert_eq!(config.pip_args.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.python.is_none());
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REQRUN_TEST_INDEX", "https://mirror.example.com/simple");

        let toml_content = r#"
pip_args = ["--index-url", "${REQRUN_TEST_INDEX}"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.pip_args[1], "https://mirror.example.com/simple");

        std::env::remove_var("REQRUN_TEST_INDEX");
    }

    #[test]
    fn test_unset_env_var_is_left_alone() {
        let config =
            TomlConfig::from_toml_str(r#"python = "${REQRUN_TEST_SURELY_UNSET}""#).unwrap();
        assert_eq!(config.python.as_deref(), Some("${REQRUN_TEST_SURELY_UNSET}"));
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[overrides]
"os.path" = "something"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[overrides]
yaml = ""
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(TomlConfig::from_toml_str("pyhton = \"python3\"").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[overrides]\nattr = \"attrs\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.overrides.get("attr").map(String::as_str), Some("attrs"));
    }

    #[test]
    fn test_missing_config_file() {
        let result = TomlConfig::from_file("/no/such/reqrun.toml");
        assert!(matches!(result, Err(ReqrunError::ConfigError { .. })));
    }
}

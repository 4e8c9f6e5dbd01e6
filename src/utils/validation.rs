use crate::utils::error::{ReqrunError, Result};
use regex::Regex;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReqrunError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReqrunError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReqrunError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 模組名稱必須是合法的 Python 識別字 (不含點號)
pub fn validate_module_name(field_name: &str, name: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| ReqrunError::ConfigError {
        message: format!("Invalid identifier pattern: {}", e),
    })?;

    if !re.is_match(name) {
        return Err(ReqrunError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Module name must be a single Python identifier".to_string(),
        });
    }
    Ok(())
}

pub fn validate_package_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    if name.chars().any(char::is_whitespace) || name.starts_with('-') {
        return Err(ReqrunError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Package name cannot contain whitespace or start with '-'".to_string(),
        });
    }
    Ok(())
}

use crate::core::form_store::FormState;
use crate::utils::error::{HealixError, Result};
use std::path::Path;

/// Loads prefilled form values from a `.json` or `.toml` file.
///
/// Keys may be camelCase (`studyTitle`) or snake_case (`study_title`);
/// missing keys stay empty.
pub fn load_form<P: AsRef<Path>>(path: P) -> Result<FormState> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => toml::from_str(&content).map_err(|e| HealixError::ConfigError {
            message: format!("form file {}: {}", path.display(), e),
        }),
        _ => Err(HealixError::InvalidConfigValueError {
            field: "form".to_string(),
            value: path.display().to_string(),
            reason: "form file must end in .json or .toml".to_string(),
        }),
    }
}

use async_trait::async_trait;
use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::{env, fs};
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Error loading config: {0}")]
    ConfigError(String),
}

#[async_trait]
pub trait DexConfigLoader {
    type SectionType;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

pub trait DexConfigLoaderSync {
    type SectionType;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

pub async fn load_from_file<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = tokio::fs::read_to_string(file_name).await?;
    let contents = expand_vars(&contents);
    let config: T = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_from_file_sync<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = fs::read_to_string(file_name)?;
    let contents = expand_vars(&contents);
    let config: T = toml::from_str(&contents)?;
    Ok(config)
}

/// Replaces `${NAME}` with the value of the environment variable `NAME`.
/// Unset variables are left untouched.
pub(crate) fn expand_vars(raw_config: &str) -> String {
    let Ok(re) = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}") else {
        return raw_config.to_string();
    };
    re.replace_all(raw_config, |caps: &Captures| match env::var(&caps[1]) {
        Ok(val) => val,
        Err(_) => caps[0].to_string(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_vars() {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| "${CARGO_MANIFEST_DIR}".to_string());
        let expanded = expand_vars("dir = \"${CARGO_MANIFEST_DIR}\"\nother = \"${DEX_ENGINE_SURELY_UNSET_VAR}\"");
        assert_eq!(expanded, format!("dir = \"{manifest_dir}\"\nother = \"${{DEX_ENGINE_SURELY_UNSET_VAR}}\""));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<toml::Value, _> = load_from_file_sync("/nonexistent/dex-engine.toml".to_string());
        assert!(matches!(result, Err(LoadConfigError::IoError(_))));
    }
}

//! Configuration file loading
//!
//! `.toml` files are parsed with `toml`; every other extension is treated as
//! YAML.

use super::schema::BaseConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Load a configuration file without validating it
///
/// # Errors
/// [`Error::ConfigNotFound`] when the file does not exist and
/// [`Error::ConfigParsing`] on syntax errors or invalid field values.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BaseConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::ConfigNotFound { path: path.to_path_buf() });
    }
    let text = fs::read_to_string(path).map_err(|e| Error::ConfigParsing {
        path: path.to_path_buf(),
        message: format!("failed to read file: {e}"),
    })?;
    parse_config(&text, ConfigFormat::from_path(path)).map_err(|message| Error::ConfigParsing {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse configuration text in the given format
pub fn parse_config(text: &str, format: ConfigFormat) -> std::result::Result<BaseConfig, String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "training:\n  duration: 3 epochs\n  batch_size: 8\noptimizer:\n  optimizer: Adam\nlr_scheduler: {}\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.training.duration, TimeValue::epochs(3));
        assert_eq!(config.training.batch_size, 8);
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
[training]
duration = "2 epochs"
gradient_accumulation = 4

[optimizer]
optimizer = "AdamW"

[lr_scheduler]
warmup = { number = 100, unit = "iterations" }
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.training.duration, TimeValue::epochs(2));
        assert_eq!(config.training.gradient_accumulation, TimeValue::steps(4));
        assert_eq!(config.lr_scheduler.warmup, TimeValue::iterations(100));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/reloj.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
        assert_eq!(err.code(), "E301");
    }

    #[test]
    fn test_invalid_time_value_reported_with_path() {
        let file = write_config(
            ".yaml",
            "training:\n  duration: -5\noptimizer:\n  optimizer: Adam\nlr_scheduler: {}\n",
        );
        let err = load_config(file.path()).unwrap_err();
        match &err {
            Error::ConfigParsing { path, message } => {
                assert_eq!(path, file.path());
                assert!(message.contains("duration"), "{message}");
                assert!(message.contains("negative"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let file = write_config(".yaml", "training: [unclosed\n");
        assert!(matches!(load_config(file.path()), Err(Error::ConfigParsing { .. })));
    }
}

//! Loading of JSON configuration files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Error, Result};

/// Read and deserialize a JSON configuration file.
///
/// Fields missing from the file fall back to the target type's serde defaults.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(Error::config(format!(
            "configuration file {} is empty",
            path.display()
        )));
    }
    debug!("loaded configuration from {}", path.display());
    parse_json(&text)
}

/// Deserialize a JSON configuration document held in memory.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("halo-config-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_parse_json_partial_document_uses_defaults() {
        let sample: Sample = parse_json(r#"{ "name": "left" }"#).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "left".to_string(),
                count: 0
            }
        );
    }

    #[test]
    fn test_parse_json_rejects_malformed_input() {
        let err = parse_json::<Sample>("{ name: ").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_load_json_reads_file() {
        let path = temp_path("read");
        fs::write(&path, r#"{ "name": "stage", "count": 7 }"#).unwrap();
        let sample: Sample = load_json(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(sample.count, 7);
        assert_eq!(sample.name, "stage");
    }

    #[test]
    fn test_load_json_empty_file_is_config_error() {
        let path = temp_path("empty");
        fs::write(&path, "  \n").unwrap();
        let err = load_json::<Sample>(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_json_missing_file_is_io_error() {
        let err = load_json::<Sample>(temp_path("missing-never-written")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

use crate::error::{MaveError, MaveResult};
use crate::io::DEFAULT_NULL_VALUES;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

/// Ingestion settings. Every field has a default, so an empty TOML document
/// is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Cell values read as null, compared case-insensitively after trimming.
    /// Empty cells are always null.
    pub null_values: Vec<String>,
    pub score_column: String,
    /// Refuse scores tables without `score_column`.
    pub require_score_column: bool,
    /// Check `hgvs_pro` variants against the (translated) target.
    pub validate_protein: bool,
    /// Threads of the job worker pool; 0 lets the pool pick.
    pub worker_threads: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            score_column: "score".to_string(),
            require_score_column: false,
            validate_protein: true,
            worker_threads: 0,
        }
    }
}

impl IngestConfig {
    pub fn is_null(&self, cell: &str) -> bool {
        crate::io::is_null(cell, &self.null_values)
    }
}

impl FromStr for IngestConfig {
    type Err = MaveError;

    fn from_str(s: &str) -> MaveResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl TryFrom<&Path> for IngestConfig {
    type Error = MaveError;

    fn try_from(path: &Path) -> MaveResult<Self> {
        let toml_str = read_to_string(path)?;
        toml_str.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config: IngestConfig = "".parse().unwrap();
        assert_eq!(config, IngestConfig::default());
        assert!(config.validate_protein);
        assert!(!config.require_score_column);
    }

    #[test]
    fn partial_override() {
        let config: IngestConfig = r#"
            null_values = ["missing"]
            require_score_column = true
            worker_threads = 4
        "#
        .parse()
        .unwrap();
        assert_eq!(config.null_values, vec!["missing".to_string()]);
        assert_eq!(config.score_column, "score");
        assert!(config.require_score_column);
        assert_eq!(config.worker_threads, 4);
        assert!(config.is_null("MISSING"));
        assert!(config.is_null("  "));
        assert!(!config.is_null("NA"));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = "scor_column = 'x'".parse::<IngestConfig>().unwrap_err();
        assert!(matches!(err, MaveError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let path =
            std::env::temp_dir().join(format!("mavedb_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "validate_protein = false\n").unwrap();
        let config = IngestConfig::try_from(path.as_path()).unwrap();
        assert!(!config.validate_protein);
        std::fs::remove_file(&path).unwrap();
    }
}

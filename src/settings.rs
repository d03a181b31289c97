//! Run settings.
//!
//! Values are resolved in three layers: built-in defaults, an optional YAML
//! file, then explicit command-line values. Every layer except the defaults
//! is a [`PartialSettings`] whose `None` fields fall through to the layer
//! below.

use crate::error::BenchError;
use bench_core::LayoutKind;
use bench_generator::record::{DEFAULT_MAX_AGE, DEFAULT_MIN_AGE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PEOPLE_COUNT: u64 = 99_000;
pub const DEFAULT_COMPANY_COUNT: u64 = 1_000;
pub const DEFAULT_COLLECTION: &str = "lab2_big_data";
pub const DEFAULT_SEED: u64 = 42;
/// Largest accepted `max_age`.
pub const AGE_LIMIT: u32 = 150;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchSettings {
    pub people_count: u64,
    pub company_count: u64,
    /// Explicit batch size; `None` uses the layout's default.
    pub batch_size: Option<usize>,
    pub collection: String,
    pub seed: u64,
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            people_count: DEFAULT_PEOPLE_COUNT,
            company_count: DEFAULT_COMPANY_COUNT,
            batch_size: None,
            collection: DEFAULT_COLLECTION.to_string(),
            seed: DEFAULT_SEED,
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

/// A settings layer where every value is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    pub people_count: Option<u64>,
    pub company_count: Option<u64>,
    pub batch_size: Option<usize>,
    pub collection: Option<String>,
    pub seed: Option<u64>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
}

impl PartialSettings {
    /// Load a settings layer from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, BenchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
            .map_err(|e| BenchError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

impl BenchSettings {
    /// Apply `layer` on top of `self`.
    pub fn merge(mut self, layer: PartialSettings) -> Self {
        if let Some(v) = layer.people_count {
            self.people_count = v;
        }
        if let Some(v) = layer.company_count {
            self.company_count = v;
        }
        if layer.batch_size.is_some() {
            self.batch_size = layer.batch_size;
        }
        if let Some(v) = layer.collection {
            self.collection = v;
        }
        if let Some(v) = layer.seed {
            self.seed = v;
        }
        if let Some(v) = layer.min_age {
            self.min_age = v;
        }
        if let Some(v) = layer.max_age {
            self.max_age = v;
        }
        self
    }

    /// Resolve defaults, then the file layer, then the command-line layer.
    pub fn resolve(
        file: Option<PartialSettings>,
        cli: PartialSettings,
    ) -> Result<Self, BenchError> {
        let settings = Self::default().merge(file.unwrap_or_default()).merge(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.company_count == 0 {
            return Err(BenchError::InvalidArgument(
                "company count must be at least 1".to_string(),
            ));
        }
        if self.batch_size == Some(0) {
            return Err(BenchError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.min_age > self.max_age {
            return Err(BenchError::Config(format!(
                "min age {} is greater than max age {}",
                self.min_age, self.max_age
            )));
        }
        if self.max_age > AGE_LIMIT {
            return Err(BenchError::Config(format!(
                "max age {} is above the limit of {AGE_LIMIT}",
                self.max_age
            )));
        }
        if self.collection.trim().is_empty() {
            return Err(BenchError::Config(
                "collection name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn batch_size_for(&self, layout: LayoutKind) -> usize {
        self.batch_size
            .unwrap_or_else(|| layout.default_batch_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = BenchSettings::resolve(None, PartialSettings::default()).unwrap();
        assert_eq!(settings.people_count, 99_000);
        assert_eq!(settings.company_count, 1_000);
        assert_eq!(settings.collection, "lab2_big_data");
        assert_eq!(settings.batch_size_for(LayoutKind::Referenced), 2_000);
        assert_eq!(settings.batch_size_for(LayoutKind::EmbeddedSingle), 2_000);
        assert_eq!(settings.batch_size_for(LayoutKind::EmbeddedArray), 100);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = PartialSettings::from_yaml_str(
            "people_count: 500\ncompany_count: 5\nbatch_size: 50\n",
        )
        .unwrap();
        let cli = PartialSettings {
            people_count: Some(10),
            ..Default::default()
        };

        let settings = BenchSettings::resolve(Some(file), cli).unwrap();
        assert_eq!(settings.people_count, 10);
        assert_eq!(settings.company_count, 5);
        assert_eq!(settings.batch_size_for(LayoutKind::EmbeddedArray), 50);
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "collection: other\nseed: 7\nmin_age: 20\nmax_age: 40").unwrap();

        let layer = PartialSettings::from_yaml_file(file.path()).unwrap();
        assert_eq!(layer.collection.as_deref(), Some("other"));
        assert_eq!(layer.seed, Some(7));
        assert_eq!(layer.people_count, None);
    }

    #[test]
    fn test_unknown_yaml_key_rejected() {
        assert!(PartialSettings::from_yaml_str("peoplecount: 3").is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PartialSettings::from_yaml_file(Path::new("/nonexistent/bench.yaml"));
        assert!(matches!(err, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let zero_companies = PartialSettings {
            company_count: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            BenchSettings::resolve(None, zero_companies),
            Err(BenchError::InvalidArgument(_))
        ));

        let zero_batch = PartialSettings {
            batch_size: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            BenchSettings::resolve(None, zero_batch),
            Err(BenchError::Config(_))
        ));

        let inverted_ages = PartialSettings {
            min_age: Some(50),
            max_age: Some(40),
            ..Default::default()
        };
        assert!(matches!(
            BenchSettings::resolve(None, inverted_ages),
            Err(BenchError::Config(_))
        ));

        let huge_age = PartialSettings {
            max_age: Some(u32::MAX),
            ..Default::default()
        };
        assert!(matches!(
            BenchSettings::resolve(None, huge_age),
            Err(BenchError::Config(_))
        ));

        let oldest = PartialSettings {
            max_age: Some(AGE_LIMIT),
            ..Default::default()
        };
        assert!(BenchSettings::resolve(None, oldest).is_ok());
    }
}

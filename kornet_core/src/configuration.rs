//! Settings for loading reference data and making networks
use std::fs;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::entity::EntityKind;

#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// KEGG data directory, holding `ko/` and `ko_info.txt`
    #[builder(default = "PathBuf::from(\"KEGG\")")]
    pub kegg_dir: PathBuf,
    /// ModelSEED Biochemistry directory, holding `reactions.tsv` and `compounds.tsv`
    #[builder(default = "PathBuf::from(\"ModelSEED\")")]
    pub modelseed_dir: PathBuf,
    /// Whether annotated entities are genes or gene clusters
    #[builder(default = "EntityKind::Gene")]
    pub entity_kind: EntityKind,
    /// Replace a network already in the store
    #[builder(default = "false")]
    pub overwrite_existing_network: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            kegg_dir: PathBuf::from("KEGG"),
            modelseed_dir: PathBuf::from("ModelSEED"),
            entity_kind: EntityKind::Gene,
            overwrite_existing_network: false,
        }
    }
}

impl Configuration {
    /// Read a configuration from a JSON file; missing keys take their default values
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigurationError> {
        let text = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(ConfigurationError::UnableToRead(format!("{:?}", err))),
        };
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Unable to read configuration file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse configuration")]
    UnableToParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = ConfigurationBuilder::default()
            .kegg_dir(PathBuf::from("/data/KEGG"))
            .build()
            .unwrap();
        assert_eq!(config.kegg_dir, PathBuf::from("/data/KEGG"));
        assert_eq!(config.modelseed_dir, Configuration::default().modelseed_dir);
        assert!(!config.overwrite_existing_network);
    }

    #[test]
    fn read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"modelseed_dir": "/refs/ModelSEED", "entity_kind": "GeneCluster", "overwrite_existing_network": true}"#,
        )
        .unwrap();
        let config = Configuration::read_json(&path).unwrap();
        assert_eq!(config.kegg_dir, PathBuf::from("KEGG"));
        assert_eq!(config.modelseed_dir, PathBuf::from("/refs/ModelSEED"));
        assert_eq!(config.entity_kind, EntityKind::GeneCluster);
        assert!(config.overwrite_existing_network);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Configuration::read_json(&path),
            Err(ConfigurationError::UnableToParse(_))
        ));
        assert!(matches!(
            Configuration::read_json(dir.path().join("missing.json")),
            Err(ConfigurationError::UnableToRead(_))
        ));
    }
}

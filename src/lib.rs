use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

pub mod datasets;

pub use datasets::{
    build_dataset, Batch, DataSet, DatasetBuilder, DatasetError, TagDataSplits, TagDatasetParams, TagVocabulary,
};

/// Anything that can be written to and restored from a ron string
pub trait Config: Send + Sync {
    fn config(&self) -> Result<String>;
    fn load_config(&mut self, config: &str) -> Result<()>;
}

impl<T: Serialize + DeserializeOwned + Send + Sync> Config for T {
    fn config(&self) -> Result<String> {
        ron::to_string(self).context("Failed to serialize config")
    }
    fn load_config(&mut self, config: &str) -> Result<()> {
        *self = ron::from_str(config).context(format!("Failed to load context {}", config))?;
        Ok(())
    }
}

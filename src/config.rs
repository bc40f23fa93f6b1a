//! Paging configuration
//!
//! Static tuning knobs for a paging session, loadable from YAML or JSON.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `max_size` value meaning "no limit"
pub const MAX_SIZE_UNBOUNDED: usize = usize::MAX;

/// Tuning knobs for a paging session
///
/// Only `page_size` is required; every other field defaults from it.
///
/// ```yaml
/// page_size: 20
/// initial_size: 60
/// prefetch_distance: 10
/// max_size: 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagingConfig")]
pub struct PagingConfig {
    /// Items requested by each append load
    pub page_size: usize,
    /// Items requested by the refresh load
    pub initial_size: usize,
    /// How close to the end of the list an access must be to trigger an append
    pub prefetch_distance: usize,
    /// Upper bound on items held by a collector (not enforced by the fetcher)
    pub max_size: usize,
}

#[derive(Deserialize)]
struct RawPagingConfig {
    page_size: usize,
    #[serde(default)]
    initial_size: Option<usize>,
    #[serde(default)]
    prefetch_distance: Option<usize>,
    #[serde(default)]
    max_size: Option<usize>,
}

impl From<RawPagingConfig> for PagingConfig {
    fn from(raw: RawPagingConfig) -> Self {
        Self {
            page_size: raw.page_size,
            initial_size: raw.initial_size.unwrap_or(raw.page_size),
            prefetch_distance: raw.prefetch_distance.unwrap_or(raw.page_size),
            max_size: raw.max_size.unwrap_or(MAX_SIZE_UNBOUNDED),
        }
    }
}

impl PagingConfig {
    /// Create a config with the given page size and derived defaults
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            initial_size: page_size,
            prefetch_distance: page_size,
            max_size: MAX_SIZE_UNBOUNDED,
        }
    }

    /// Set the refresh load size
    #[must_use]
    pub fn with_initial_size(mut self, size: usize) -> Self {
        self.initial_size = size;
        self
    }

    /// Set the prefetch distance
    #[must_use]
    pub fn with_prefetch_distance(mut self, distance: usize) -> Self {
        self.prefetch_distance = distance;
        self
    }

    /// Set the max size
    #[must_use]
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Check every knob is usable
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.initial_size == 0 {
            return Err(Error::invalid_value(
                "initial_size",
                "must be greater than 0",
            ));
        }
        if self.prefetch_distance == 0 {
            return Err(Error::invalid_value(
                "prefetch_distance",
                "must be greater than 0",
            ));
        }
        if self.max_size == 0 {
            return Err(Error::invalid_value("max_size", "must be greater than 0"));
        }
        if self.max_size < self.page_size || self.max_size < self.initial_size {
            return Err(Error::invalid_value(
                "max_size",
                format!(
                    "must be at least page_size ({}) and initial_size ({})",
                    self.page_size, self.initial_size
                ),
            ));
        }
        Ok(())
    }

    /// Whether an access to item `index` in a list of `item_count` items
    /// is close enough to the end to warrant an append
    pub fn should_prefetch(&self, index: usize, item_count: usize) -> bool {
        index.saturating_add(self.prefetch_distance) >= item_count
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the format from its extension
    ///
    /// `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self::new(20)
    }
}

//! Site and versioning configuration

use crate::models::{NodeId, UNSAVED_ID};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of archived versions kept per item
const DEFAULT_MAX_VERSIONS_PER_ITEM: usize = 100;

/// Configuration of one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Root node; language roots are its direct children
    pub root_item_id: NodeId,

    /// Start page, defaults to the root when absent
    #[serde(default)]
    pub start_page_id: Option<NodeId>,

    #[serde(default)]
    pub versioning: VersioningConfig,
}

/// Version retention settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersioningConfig {
    /// Archived versions kept per item, `0` keeps all of them
    pub max_versions_per_item: usize,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            max_versions_per_item: DEFAULT_MAX_VERSIONS_PER_ITEM,
        }
    }
}

impl SiteConfig {
    pub fn new(root_item_id: NodeId) -> Self {
        Self {
            root_item_id,
            start_page_id: None,
            versioning: VersioningConfig::default(),
        }
    }

    pub fn start_page_id(&self) -> NodeId {
        self.start_page_id.unwrap_or(self.root_item_id)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.root_item_id == UNSAVED_ID {
            return Err("root_item_id must reference a saved node".to_string());
        }

        if self.start_page_id == Some(UNSAVED_ID) {
            return Err("start_page_id must reference a saved node".to_string());
        }

        Ok(())
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site config {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse site config {}", path.display()))?;
        config.validate().map_err(|reason| {
            anyhow::anyhow!("Invalid site config {}: {}", path.display(), reason)
        })?;
        Ok(config)
    }
}

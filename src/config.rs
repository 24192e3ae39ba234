//! Grid configuration.
//!
//! Widths are in display units (pixels in the browser front end). A config file
//! is sparse TOML; any key left out keeps its default:
//!
//! ```toml
//! default_column_width = 120
//! min_column_width = 40
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Width given to new columns and to every column after `set_data`.
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

/// Floor applied to every stored column width.
pub const MIN_COLUMN_WIDTH: u32 = 30;

/// Width settings shared by the grid and the resize session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub default_column_width: u32,
    pub min_column_width: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_column_width: DEFAULT_COLUMN_WIDTH,
            min_column_width: MIN_COLUMN_WIDTH,
        }
    }
}

impl GridConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded grid config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Reject settings that would break the positive-width invariant.
    pub fn validate(&self) -> Result<()> {
        if self.min_column_width == 0 {
            return Err(GridError::InvalidConfig(
                "min_column_width must be positive".into(),
            ));
        }
        if self.default_column_width < self.min_column_width {
            return Err(GridError::InvalidConfig(format!(
                "default_column_width {} is below min_column_width {}",
                self.default_column_width, self.min_column_width
            )));
        }
        Ok(())
    }

    /// Apply the width floor.
    #[must_use]
    pub fn clamp_width(&self, width: u32) -> u32 {
        width.max(self.min_column_width)
    }
}

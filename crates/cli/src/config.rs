//! Operator profile stored in `~/.config/sgctl/config.json`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Saved defaults; command-line flags and environment take precedence
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Profile {
    pub gateway_url: Option<String>,
    pub environment: Option<String>,
    pub attack_route: Option<String>,
    /// Target used by `attack` when `--target` is omitted
    pub default_target: Option<String>,
}

impl Profile {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// A missing file yields the empty profile
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse profile")
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize profile")?;
        std::fs::write(path, content).context("Failed to write profile")?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("sgctl").join("config.json"))
    }
}

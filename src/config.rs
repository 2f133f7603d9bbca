use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// default directory creation mode, owner-only
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// archive configuration, optionally stored in framepack.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// bounds enforced while reading and writing frames
    #[serde(default)]
    pub limits: Limits,
    /// mode for directories created during unpack
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,
}

fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

/// size and nesting bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// longest entry name in bytes, not counting the directory marker
    pub max_name_len: usize,
    /// most decimal digits accepted in a length field
    pub max_len_digits: usize,
    /// deepest directory nesting accepted by pack and unpack
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // NAME_MAX on linux
            max_name_len: 255,
            // u64::MAX has 20 digits
            max_len_digits: 20,
            max_depth: 4096,
        }
    }
}

//! Minicom configuration emission.
//!
//! Once a rate is selected this collaborator renders the classic minicom
//! configuration block, optionally persists it to a named profile, and
//! optionally launches minicom on it. None of this affects the detection
//! result itself.

use crate::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::info;

/// Directory minicom reads named profiles from.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/minicom";

/// A renderable minicom profile: the detected rate plus the fixed 8N1,
/// no-flow-control framing.
#[derive(Debug, Clone)]
pub struct MinicomProfile {
    pub port: String,
    pub baud_rate: u32,
}

impl MinicomProfile {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
        }
    }

    /// Render the fixed-format configuration block.
    pub fn render(&self) -> String {
        let mut config = String::new();
        let rule = "#".repeat(72);
        config.push_str(&rule);
        config.push('\n');
        config.push_str("# Minicom configuration file - use \"minicom -s\" to change parameters.\n");
        config.push_str(&format!("pu port             {}\n", self.port));
        config.push_str(&format!("pu baudrate         {}\n", self.baud_rate));
        config.push_str("pu bits             8\n");
        config.push_str("pu parity           N\n");
        config.push_str("pu stopbits         1\n");
        config.push_str("pu rtscts           No\n");
        config.push_str(&rule);
        config.push('\n');
        config
    }

    /// Persist the profile as `minirc.<name>` under the default directory.
    pub fn save(&self, name: &str) -> Result<PathBuf, AppError> {
        self.save_in(Path::new(DEFAULT_CONFIG_DIR), name)
    }

    /// Persist the profile as `minirc.<name>` under `dir`.
    pub fn save_in(&self, dir: &Path, name: &str) -> Result<PathBuf, AppError> {
        let path = dir.join(format!("minirc.{name}"));
        fs::write(&path, self.render()).map_err(|source| AppError::ConfigWrite {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "saved minicom configuration");
        Ok(path)
    }
}

/// Launch minicom on a named profile and wait for it to exit.
pub fn launch(name: &str) -> Result<ExitStatus, AppError> {
    info!(name, "launching minicom");
    Command::new("minicom")
        .arg(name)
        .status()
        .map_err(AppError::Io)
}

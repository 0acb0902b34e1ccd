use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::session_log::RenderOptions;

/// Agent streamed when none is given.
pub const DEFAULT_AGENT: &str = "main";
/// Lines shown before following.
pub const DEFAULT_TAIL: usize = 20;
/// Environment variable that relocates the state directory.
pub const STATE_DIR_ENV: &str = "OPENCLAW_STATE_DIR";

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub state_dir: PathBuf,
    pub agent: String,
    pub follow: bool,
    pub tail: usize,
    pub render: RenderOptions,
}

impl Config {
    pub fn is_default_agent(&self) -> bool {
        self.agent == DEFAULT_AGENT
    }
}

/// State directory: explicit override, then `$OPENCLAW_STATE_DIR`, then
/// `~/.openclaw`.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    state_dir_from(std::env::var(STATE_DIR_ENV).ok())
}

fn state_dir_from(env_value: Option<String>) -> Result<PathBuf> {
    match env_value {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => {
            let home = dirs::home_dir().context("cannot determine home directory")?;
            Ok(home.join(".openclaw"))
        }
    }
}

/// Colour only on a terminal, and never when `NO_COLOR` is set.
pub fn color_enabled(disabled_by_flag: bool, stdout_is_terminal: bool) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !disabled_by_flag && !no_color_env && stdout_is_terminal
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sync::SyncConfig;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub debounce_ms: Option<u64>,
    pub origin: Option<String>,
    pub trace_log: Option<PathBuf>,
    pub verbose: bool,
    pub pretty: bool,
    pub perf: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            origin: other.origin.clone().or_else(|| self.origin.clone()),
            trace_log: other.trace_log.clone().or_else(|| self.trace_log.clone()),
            verbose: self.verbose || other.verbose,
            pretty: self.pretty || other.pretty,
            perf: self.perf || other.perf,
        }
    }

    /// Controller settings, falling back to the defaults for unset flags.
    pub fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::default();
        if let Some(debounce_ms) = self.debounce_ms {
            config = config.with_debounce_ms(debounce_ms);
        }
        if let Some(origin) = &self.origin {
            config = config.with_origin(origin.clone());
        }
        config
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("notesync").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("notesync")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("notesync").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("notesync").join("config");
        }
    }

    PathBuf::from(".notesyncrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".notesyncrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# notesync defaults (saved with --save)".to_string());
    if let Some(debounce_ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {debounce_ms}"));
    }
    if let Some(origin) = &flags.origin {
        lines.push(format!("--origin {origin}"));
    }
    if let Some(path) = &flags.trace_log {
        lines.push(format!("--trace-log {}", path.display()));
    }
    if flags.verbose {
        lines.push("--verbose".to_string());
    }
    if flags.pretty {
        lines.push("--pretty".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the persistable flags out of raw arguments.
///
/// Unknown tokens and malformed values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--verbose" || token == "-v" {
            flags.verbose = true;
        } else if token == "--pretty" {
            flags.pretty = true;
        } else if token == "--perf" {
            flags.perf = true;
        } else if token == "--debounce-ms" {
            if let Some(next) = tokens.get(i + 1) {
                flags.debounce_ms = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--debounce-ms=") {
            flags.debounce_ms = value.parse().ok();
        } else if token == "--origin" {
            if let Some(next) = tokens.get(i + 1) {
                flags.origin = Some(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--origin=") {
            flags.origin = Some(value.to_string());
        } else if token == "--trace-log" {
            if let Some(next) = tokens.get(i + 1) {
                flags.trace_log = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--trace-log=") {
            flags.trace_log = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

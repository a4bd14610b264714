use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "base_url")]
    pub base: Option<String>,
    pub collection_file: Option<String>,
    pub wantlist_file: Option<String>,
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub preferences: Option<String>,
    pub top_genres: Option<usize>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

const APP_DIR: &str = ".recordshelf";

impl ConfigFile {
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

// HOME on unix, the profile variables on windows
fn home_dir() -> Option<PathBuf> {
    if let Some(home) = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        return Some(PathBuf::from(home));
    }
    match (env::var_os("HOMEDRIVE"), env::var_os("HOMEPATH")) {
        (Some(drive), Some(path)) => Some(PathBuf::from(drive).join(path)),
        _ => None,
    }
}

/// `~/.recordshelf`, home of the config and preference files.
pub(crate) fn app_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => Some(""),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => Some(&rest[1..]),
        _ => None,
    };
    match (rest, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).display().to_string()
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if allow_missing {
                return Ok(ConfigFile::default());
            }
            return Err(format!("config file not found '{}'", path.display()));
        }
        Err(e) => return Err(format!("failed to read config '{}': {e}", path.display())),
    };
    ConfigFile::from_yaml(&contents)
        .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))
}

fn default_config_yaml() -> String {
    r#"# recordshelf config
#
# Location (default):
#   ~/.recordshelf/config.yml

# Where collection.json and wantlist.json live: an http(s) URL or a directory
base: .
# collection_file: collection.json
# wantlist_file: wantlist.json

# HTTP
timeout: 10
workers: 2

# Preferences (theme and last view)
# preferences: ~/.recordshelf/preferences.yml

# Stats: genres shown before the rest is folded into "Other"
top_genres: 10

# Output (optional)
# output: ./records.html
# output_format: html
no_color: false
"#
    .to_string()
}

/// Writes the commented default config unless a file is already there.
pub fn ensure_default_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!("failed to create config directory '{}': {e}", parent.display())
        })?;
    }
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))
}

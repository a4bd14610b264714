use std::collections::BTreeMap;
use std::path::PathBuf;

pub const THEME_KEY: &str = "records.theme";
pub const VIEW_KEY: &str = "records.view";

/// Local key-value storage for the two user preferences.
///
/// Neither operation can fail from the caller's point of view: an unreadable
/// store reads as empty and a failed write only lasts for the session.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

// a flat YAML map on disk. the in-memory copy is authoritative for the session,
// so values survive a failed write until the process exits.
#[derive(Clone, Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    pub fn open(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_yaml::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    tracing::debug!("ignoring unreadable preferences '{}': {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::debug!("failed to read preferences '{}': {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn flush(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!(
                    "failed to create preferences directory '{}': {e}",
                    parent.display()
                )
            })?;
        }
        let contents = serde_yaml::to_string(&self.values)
            .map_err(|e| format!("failed to encode preferences: {e}"))?;
        std::fs::write(&self.path, contents).map_err(|e| {
            format!(
                "failed to write preferences '{}': {e}",
                self.path.display()
            )
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            tracing::debug!("{e}");
        }
    }
}

pub fn default_preferences_path() -> Option<PathBuf> {
    crate::config::app_dir().map(|dir| dir.join("preferences.yml"))
}

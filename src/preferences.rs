use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::core::{restrict_file_permissions, unique_file_suffix, write_atomically};

/// Client-local UI preferences. Kept apart from the backend-owned settings.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
}

#[derive(Debug, Clone)]
pub struct PreferencesFile {
    path: PathBuf,
}

impl PreferencesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means defaults. A corrupt one is moved aside and
    /// defaults are returned.
    pub fn load(&self) -> Result<UiPreferences, String> {
        if !self.path.exists() {
            return Ok(UiPreferences::default());
        }
        restrict_file_permissions(&self.path);

        let content = fs::read_to_string(&self.path)
            .map_err(|error| format!("Failed to read preferences: {error}"))?;
        match serde_json::from_str::<UiPreferences>(&content) {
            Ok(preferences) => Ok(preferences),
            Err(error) => {
                let backup_path = self
                    .path
                    .with_extension(format!("corrupt-{}.json", unique_file_suffix()));
                if let Err(rename_error) = fs::rename(&self.path, &backup_path) {
                    log::warn!("failed to back up corrupt preferences file: {rename_error}");
                } else {
                    log::warn!(
                        "moved corrupt preferences file to {}",
                        backup_path.to_string_lossy()
                    );
                }
                log::warn!("preferences parse failed, starting fresh: {error}");
                Ok(UiPreferences::default())
            }
        }
    }

    pub fn save(&self, preferences: &UiPreferences) -> Result<(), String> {
        let content = serde_json::to_string_pretty(preferences)
            .map_err(|error| format!("Failed to serialize preferences: {error}"))?;
        write_atomically(&self.path, &content)
    }
}

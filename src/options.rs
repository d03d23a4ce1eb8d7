use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::consts::{DEFAULT_NOTIFICATION_TITLE, PAGE_SIZE, PUSH_FEED_CAP};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientOptions {
    pub page_size: usize,
    pub push_feed_cap: usize,
    /// Seconds between automatic feed refreshes while connected. 0 disables.
    pub auto_refresh_secs: u64,
    /// Where the sidebar preference lives. `None` keeps it in memory only.
    pub preferences_path: Option<PathBuf>,
    pub notification_title: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            push_feed_cap: PUSH_FEED_CAP,
            auto_refresh_secs: 0,
            preferences_path: None,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
        }
    }
}

impl ClientOptions {
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|error| format!("Failed to read client options: {error}"))?;
        let options = serde_json::from_str::<ClientOptions>(&content)
            .map_err(|error| format!("Failed to parse client options: {error}"))?;
        Ok(options.normalized())
    }

    pub fn normalized(mut self) -> Self {
        self.page_size = self.page_size.max(1);
        self.push_feed_cap = self.push_feed_cap.max(1);
        if self.notification_title.trim().is_empty() {
            self.notification_title = DEFAULT_NOTIFICATION_TITLE.to_string();
        }
        self
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = ClientOptions::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(options, ClientOptions::default());
        assert_eq!(options.page_size, 10);
        assert_eq!(options.push_feed_cap, 100);
        assert_eq!(options.auto_refresh_interval(), None);
    }

    #[test]
    fn partial_file_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(
            &path,
            r#"{"page_size": 0, "auto_refresh_secs": 30, "notification_title": "  "}"#,
        )
        .unwrap();

        let options = ClientOptions::load(&path).unwrap();
        assert_eq!(options.page_size, 1);
        assert_eq!(options.push_feed_cap, 100);
        assert_eq!(options.auto_refresh_interval(), Some(Duration::from_secs(30)));
        assert_eq!(options.notification_title, "New message");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, "{not json").unwrap();
        let error = ClientOptions::load(&path).unwrap_err();
        assert!(error.starts_with("Failed to parse client options"));
    }
}

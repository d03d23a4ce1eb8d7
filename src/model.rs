use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub message: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, alias = "date")]
    pub timestamp: String,
    #[serde(default, alias = "appid", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub id: String,
    pub name: String,
    pub server_url: String,
    pub token: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub last_used: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    pub enable_autostart: bool,
    pub minimize_to_tray: bool,
    pub silent_start: bool,
    pub enable_notifications: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionInfo {
    pub server_url: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SavedConfig {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub server_url: String,
    pub config_name: Option<String>,
    pub current_config_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiFlags {
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub has_more_messages: bool,
}

impl Default for UiFlags {
    fn default() -> Self {
        Self {
            loading: false,
            loading_more: false,
            error: None,
            has_more_messages: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Messages,
    Servers,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Messages, Page::Servers, Page::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Messages => "messages",
            Page::Servers => "servers",
            Page::Settings => "settings",
        }
    }
}

/// Contents of the add/edit configuration dialog. `edit_id` is set while an
/// existing configuration is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigModal {
    pub open: bool,
    pub edit_id: Option<String>,
    pub name: String,
    pub server_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    pub page: Page,
    pub sidebar_collapsed: bool,
    pub config_modal: ConfigModal,
}

/// Everything the UI shows. Owned by [`crate::store::StateStore`]; the
/// backend is the durable copy of configs, settings and message history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub connection: ConnectionState,
    pub feed: Vec<Message>,
    pub configs: Vec<ServerConfig>,
    pub settings: AppSettings,
    pub flags: UiFlags,
    pub shell: ShellState,
    /// Bumped whenever the feed is replaced wholesale. Fetches capture it
    /// before suspending and drop their result if it moved meanwhile.
    pub(crate) feed_version: u64,
    /// Bumped on disconnect. A connect that returns after the bump is stale.
    pub(crate) connection_version: u64,
}

impl AppState {
    pub fn feed_ids(&self) -> Vec<i64> {
        self.feed.iter().map(|message| message.id).collect()
    }

    pub fn can_load_more(&self) -> bool {
        self.connection.connected && !self.flags.loading_more && self.flags.has_more_messages
    }

    pub fn config(&self, id: &str) -> Option<&ServerConfig> {
        self.configs.iter().find(|config| config.id == id)
    }

    pub(crate) fn bump_feed_version(&mut self) -> u64 {
        self.feed_version = self.feed_version.wrapping_add(1);
        self.feed_version
    }

    pub(crate) fn bump_connection_version(&mut self) -> u64 {
        self.connection_version = self.connection_version.wrapping_add(1);
        self.connection_version
    }

    pub(crate) fn merge(&mut self, patch: StatePatch) {
        if let Some(loading) = patch.loading {
            self.flags.loading = loading;
        }
        if let Some(loading_more) = patch.loading_more {
            self.flags.loading_more = loading_more;
        }
        if let Some(error) = patch.error {
            self.flags.error = error;
        }
        if let Some(has_more) = patch.has_more_messages {
            self.flags.has_more_messages = has_more;
        }
    }
}

/// Partial update of the transient UI flags. Only fields that are `Some` are
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub loading: Option<bool>,
    pub loading_more: Option<bool>,
    pub error: Option<Option<String>>,
    pub has_more_messages: Option<bool>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn loading_more(mut self, loading_more: bool) -> Self {
        self.loading_more = Some(loading_more);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn has_more_messages(mut self, has_more: bool) -> Self {
        self.has_more_messages = Some(has_more);
        self
    }
}

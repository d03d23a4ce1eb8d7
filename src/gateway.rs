use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ClientError, GatewayError},
    model::{AppSettings, ConnectionInfo, Message, SavedConfig, ServerConfig},
};

/// `{success, data, error}` wrapper returned by every backend call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Envelope<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::fail(error.to_string()),
        }
    }
}

pub type GatewayResult<T> = Result<Envelope<T>, GatewayError>;

/// Labels used when a call fails: the generic message shown when the backend
/// reports failure without text, and the prefix for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Disconnect,
    FetchMessages,
    LoadMore,
    DeleteMessage,
    SaveConfig,
    UpdateConfig,
    DeleteConfig,
    LoadConfigs,
    SetDefaultConfig,
    GetDefaultConfig,
    GetAppSettings,
    UpdateAppSettings,
    ToggleAutostart,
    SendNotification,
}

impl Operation {
    pub fn fallback(self) -> &'static str {
        match self {
            Operation::Connect => "Connection failed",
            Operation::Disconnect => "Disconnect failed",
            Operation::FetchMessages => "Failed to fetch messages",
            Operation::LoadMore => "Failed to load more messages",
            Operation::DeleteMessage => "Delete failed",
            Operation::SaveConfig => "Failed to save configuration",
            Operation::UpdateConfig => "Failed to update configuration",
            Operation::DeleteConfig => "Failed to delete configuration",
            Operation::LoadConfigs => "Failed to load configurations",
            Operation::SetDefaultConfig => "Failed to set default configuration",
            Operation::GetDefaultConfig => "Failed to load default configuration",
            Operation::GetAppSettings => "Failed to load settings",
            Operation::UpdateAppSettings => "Failed to save settings",
            Operation::ToggleAutostart => "Failed to change autostart",
            Operation::SendNotification => "Failed to send notification",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Connect => "Connection",
            Operation::Disconnect => "Disconnect",
            Operation::FetchMessages => "Fetch messages",
            Operation::LoadMore => "Load more",
            Operation::DeleteMessage => "Delete message",
            Operation::SaveConfig => "Save configuration",
            Operation::UpdateConfig => "Update configuration",
            Operation::DeleteConfig => "Delete configuration",
            Operation::LoadConfigs => "Load configurations",
            Operation::SetDefaultConfig => "Set default configuration",
            Operation::GetDefaultConfig => "Default configuration",
            Operation::GetAppSettings => "Load settings",
            Operation::UpdateAppSettings => "Save settings",
            Operation::ToggleAutostart => "Autostart",
            Operation::SendNotification => "Notification",
        }
    }
}

/// Collapse a gateway outcome into the client error taxonomy.
pub fn settle<T>(
    operation: Operation,
    outcome: GatewayResult<T>,
) -> Result<Option<T>, ClientError> {
    match outcome {
        Ok(envelope) if envelope.success => Ok(envelope.data),
        Ok(envelope) => Err(ClientError::Backend(
            envelope
                .error
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| operation.fallback().to_string()),
        )),
        Err(error) => Err(ClientError::Transport(format!(
            "{} error: {error}",
            operation.label()
        ))),
    }
}

/// The native side of the application: durable storage, the real connection
/// to the Gotify server and OS integration.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn connect(&self, server_url: &str, token: &str) -> GatewayResult<ConnectionInfo>;

    async fn disconnect(&self) -> GatewayResult<()>;

    async fn fetch_messages(
        &self,
        since: Option<String>,
        limit: usize,
        offset: usize,
    ) -> GatewayResult<Vec<Message>>;

    async fn delete_message(&self, message_id: i64) -> GatewayResult<()>;

    async fn save_config(&self, config: &ServerConfig) -> GatewayResult<SavedConfig>;

    async fn update_config(
        &self,
        id: &str,
        name: &str,
        server_url: &str,
        token: &str,
    ) -> GatewayResult<()>;

    async fn delete_config(&self, id: &str) -> GatewayResult<()>;

    async fn get_configs(&self) -> GatewayResult<Vec<ServerConfig>>;

    async fn get_default_config(&self) -> GatewayResult<Option<ServerConfig>>;

    async fn set_default_config(&self, id: &str) -> GatewayResult<()>;

    async fn get_app_settings(&self) -> GatewayResult<AppSettings>;

    async fn update_app_settings(&self, settings: &AppSettings) -> GatewayResult<()>;

    async fn toggle_autostart(&self, enabled: bool) -> GatewayResult<()>;

    async fn send_notification(&self, title: &str, body: &str) -> GatewayResult<()>;

    /// One-directional event stream for `event`. Payloads are raw JSON; the
    /// subscriber decodes them.
    fn subscribe(
        &self,
        event: &str,
    ) -> Result<BoxStream<'static, serde_json::Value>, GatewayError>;
}

/// Blocking yes/no prompt shown before destructive actions.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way. Useful for headless shells.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirm for FixedAnswer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

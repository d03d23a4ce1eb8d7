use serde::{Deserialize, Serialize};

use crate::{
    app::Controller,
    configs::ConfigDraft,
    error::ClientError,
    model::{AppSettings, Page},
};

/// Everything the rendered view can trigger. Buttons in generated markup
/// carry the kebab-case tag in `data-action` and the target in `data-id`;
/// form submissions arrive as JSON with their field values.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    Connect { server_url: String, token: String },
    Disconnect,
    RefreshMessages,
    LoadMoreMessages,
    DeleteMessage { id: i64 },
    UseConfig { id: String },
    SetDefaultConfig { id: String },
    EditConfig { id: String },
    DeleteConfig { id: String },
    ShowAddConfigModal,
    CloseConfigModal,
    SaveConfigFromModal {
        name: String,
        server_url: String,
        token: String,
    },
    SaveAppSettings { settings: AppSettings },
    SwitchPage { page: Page },
    ToggleSidebar,
    DismissError,
}

impl Action {
    /// Build an action from a clicked element's `data-action` / `data-id`.
    pub fn from_element(action: &str, data_id: Option<&str>) -> Result<Action, String> {
        let id = || {
            data_id
                .map(str::to_string)
                .ok_or_else(|| format!("{action} requires a data-id"))
        };

        match action {
            "disconnect" => Ok(Action::Disconnect),
            "refresh-messages" => Ok(Action::RefreshMessages),
            "load-more-messages" => Ok(Action::LoadMoreMessages),
            "show-add-config-modal" => Ok(Action::ShowAddConfigModal),
            "close-config-modal" => Ok(Action::CloseConfigModal),
            "toggle-sidebar" => Ok(Action::ToggleSidebar),
            "dismiss-error" => Ok(Action::DismissError),
            "delete-message" => {
                let raw = id()?;
                raw.parse::<i64>()
                    .map(|id| Action::DeleteMessage { id })
                    .map_err(|error| format!("invalid message id {raw:?}: {error}"))
            }
            "use-config" => Ok(Action::UseConfig { id: id()? }),
            "set-default-config" => Ok(Action::SetDefaultConfig { id: id()? }),
            "edit-config" => Ok(Action::EditConfig { id: id()? }),
            "delete-config" => Ok(Action::DeleteConfig { id: id()? }),
            "switch-page" => serde_json::from_value::<Page>(serde_json::Value::String(id()?))
                .map(|page| Action::SwitchPage { page })
                .map_err(|error| format!("invalid page: {error}")),
            other => Err(format!("Unknown action: {other}")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Connect { .. } => "connect",
            Action::Disconnect => "disconnect",
            Action::RefreshMessages => "refresh-messages",
            Action::LoadMoreMessages => "load-more-messages",
            Action::DeleteMessage { .. } => "delete-message",
            Action::UseConfig { .. } => "use-config",
            Action::SetDefaultConfig { .. } => "set-default-config",
            Action::EditConfig { .. } => "edit-config",
            Action::DeleteConfig { .. } => "delete-config",
            Action::ShowAddConfigModal => "show-add-config-modal",
            Action::CloseConfigModal => "close-config-modal",
            Action::SaveConfigFromModal { .. } => "save-config-from-modal",
            Action::SaveAppSettings { .. } => "save-app-settings",
            Action::SwitchPage { .. } => "switch-page",
            Action::ToggleSidebar => "toggle-sidebar",
            Action::DismissError => "dismiss-error",
        }
    }
}

impl Controller {
    /// Run the handler for `action`. A declined confirmation is not an error.
    pub async fn dispatch(&self, action: Action) -> Result<(), ClientError> {
        log::debug!("dispatch {}", action.name());
        let result = match action {
            Action::Connect { server_url, token } => {
                self.connect(&server_url, &token, None, None).await
            }
            Action::Disconnect => self.disconnect().await,
            Action::RefreshMessages => self.refresh_messages().await,
            Action::LoadMoreMessages => self.load_more().await,
            Action::DeleteMessage { id } => self.delete_message(id).await,
            Action::UseConfig { id } => self.use_config(&id).await,
            Action::SetDefaultConfig { id } => self.set_default_config(&id).await,
            Action::EditConfig { id } => {
                self.edit_config(&id);
                Ok(())
            }
            Action::DeleteConfig { id } => self.delete_config(&id).await,
            Action::ShowAddConfigModal => {
                self.show_add_config_modal();
                Ok(())
            }
            Action::CloseConfigModal => {
                self.close_config_modal();
                Ok(())
            }
            Action::SaveConfigFromModal {
                name,
                server_url,
                token,
            } => {
                self.save_config_from_modal(ConfigDraft {
                    name,
                    server_url,
                    token,
                    is_default: false,
                })
                .await
            }
            Action::SaveAppSettings { settings } => self.update_app_settings(settings).await,
            Action::SwitchPage { page } => {
                self.switch_page(page);
                Ok(())
            }
            Action::ToggleSidebar => {
                self.toggle_sidebar();
                Ok(())
            }
            Action::DismissError => {
                self.dismiss_error();
                Ok(())
            }
        };

        match result {
            Err(ClientError::UserAbort) => Ok(()),
            other => other,
        }
    }
}

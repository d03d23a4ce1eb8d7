use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app::Controller,
    consts::CONFIRM_DELETE_CONFIG,
    error::ClientError,
    gateway::{settle, Operation},
    model::ServerConfig,
    settings::{prefixed, validate_config_name, validate_server_url, validate_token},
};

/// Fields entered for a new or edited server configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ConfigDraft {
    pub name: String,
    pub server_url: String,
    pub token: String,
    #[serde(default)]
    pub is_default: bool,
}

impl ConfigDraft {
    /// Trimmed copy, or the first validation failure (name, URL, token).
    pub fn validated(&self) -> Result<ConfigDraft, ClientError> {
        Ok(ConfigDraft {
            name: validate_config_name(&self.name)?,
            server_url: validate_server_url(&self.server_url)?,
            token: validate_token(&self.token)?,
            is_default: self.is_default,
        })
    }
}

impl Controller {
    /// Replace the local list with the backend's.
    pub async fn load_configs(&self) -> Result<(), ClientError> {
        let outcome = self.gateway.get_configs().await;
        match settle(Operation::LoadConfigs, outcome) {
            Ok(configs) => {
                let configs = configs.unwrap_or_default();
                log::debug!("loaded {} configurations", configs.len());
                self.store.commit(|state| state.configs = configs);
                Ok(())
            }
            Err(error) => {
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Store a new configuration; returns the id the backend assigned.
    pub async fn save_config(&self, draft: &ConfigDraft) -> Result<String, ClientError> {
        let (id, follow_up) = self.store_config(draft).await?;
        follow_up.map(|()| id)
    }

    /// Create the configuration, then mark it default if asked and reload
    /// the list. The outer error means nothing was stored; the inner one
    /// reports a failure after the configuration was saved.
    pub(crate) async fn store_config(
        &self,
        draft: &ConfigDraft,
    ) -> Result<(String, Result<(), ClientError>), ClientError> {
        let draft = match draft.validated() {
            Ok(draft) => draft,
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };

        self.begin();
        let config = ServerConfig {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            server_url: draft.server_url,
            token: draft.token,
            is_default: draft.is_default,
            last_used: None,
        };
        let outcome = self.gateway.save_config(&config).await;
        let id = match settle(Operation::SaveConfig, outcome) {
            Ok(saved) => saved.map(|saved| saved.id).unwrap_or(config.id),
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };
        log::info!("saved configuration {} ({id})", config.name);

        let promoted = if config.is_default {
            let outcome = self.gateway.set_default_config(&id).await;
            settle(Operation::SetDefaultConfig, outcome)
                .map(|_| ())
                .map_err(|error| prefixed(error, "Configuration saved, but setting it as default failed"))
        } else {
            Ok(())
        };

        self.finish();
        let reloaded = self.load_configs().await;
        if let Err(error) = &promoted {
            log::warn!("configuration {id}: {error}");
            self.report(error);
        }
        Ok((id, promoted.and(reloaded)))
    }

    pub async fn update_config(&self, id: &str, draft: &ConfigDraft) -> Result<(), ClientError> {
        let draft = match draft.validated() {
            Ok(draft) => draft,
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };

        self.begin();
        let outcome = self
            .gateway
            .update_config(id, &draft.name, &draft.server_url, &draft.token)
            .await;
        if let Err(error) = settle(Operation::UpdateConfig, outcome) {
            self.report(&error);
            return Err(error);
        }
        log::info!("updated configuration {id}");
        self.finish();
        self.load_configs().await
    }

    pub async fn delete_config(&self, id: &str) -> Result<(), ClientError> {
        if !self.confirm.confirm(CONFIRM_DELETE_CONFIG).await {
            log::debug!("delete of configuration {id} cancelled");
            return Err(ClientError::UserAbort);
        }

        self.begin();
        let outcome = self.gateway.delete_config(id).await;
        if let Err(error) = settle(Operation::DeleteConfig, outcome) {
            self.report(&error);
            return Err(error);
        }
        self.store.commit(|state| {
            state.configs.retain(|config| config.id != id);
            state.flags.loading = false;
        });
        log::info!("deleted configuration {id}");
        self.load_configs().await
    }

    pub async fn set_default_config(&self, id: &str) -> Result<(), ClientError> {
        self.begin();
        let outcome = self.gateway.set_default_config(id).await;
        if let Err(error) = settle(Operation::SetDefaultConfig, outcome) {
            self.report(&error);
            return Err(error);
        }
        log::info!("default configuration is now {id}");
        self.finish();
        self.load_configs().await
    }
}

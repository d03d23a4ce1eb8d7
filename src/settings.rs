use crate::{
    app::Controller,
    consts::{ERR_NAME_REQUIRED, ERR_TOKEN_REQUIRED, ERR_URL_INVALID, ERR_URL_REQUIRED},
    error::ClientError,
    gateway::{settle, Operation},
    model::AppSettings,
};

/// Trimmed server URL, accepted only with an http or https scheme.
pub fn validate_server_url(input: &str) -> Result<String, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(ERR_URL_REQUIRED.to_string()));
    }

    let url = reqwest::Url::parse(trimmed)
        .map_err(|_| ClientError::Validation(ERR_URL_INVALID.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(trimmed.to_string()),
        _ => Err(ClientError::Validation(ERR_URL_INVALID.to_string())),
    }
}

pub fn validate_token(input: &str) -> Result<String, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(ERR_TOKEN_REQUIRED.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_config_name(input: &str) -> Result<String, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(ERR_NAME_REQUIRED.to_string()));
    }
    Ok(trimmed.to_string())
}

/// URL first, then token, so the banner names the first missing field.
pub fn validate_connect_input(server_url: &str, token: &str) -> Result<(String, String), ClientError> {
    let server_url = validate_server_url(server_url)?;
    let token = validate_token(token)?;
    Ok((server_url, token))
}

pub(crate) fn prefixed(error: ClientError, prefix: &str) -> ClientError {
    let wrap = |text: String| {
        if text.starts_with(prefix) {
            text
        } else {
            format!("{prefix}: {text}")
        }
    };
    match error {
        ClientError::Validation(text) => ClientError::Validation(wrap(text)),
        ClientError::Backend(text) => ClientError::Backend(wrap(text)),
        ClientError::Transport(text) => ClientError::Transport(wrap(text)),
        ClientError::UserAbort => ClientError::UserAbort,
    }
}

impl Controller {
    pub async fn load_app_settings(&self) -> Result<(), ClientError> {
        let outcome = self.gateway.get_app_settings().await;
        match settle(Operation::GetAppSettings, outcome) {
            Ok(settings) => {
                let settings = settings.unwrap_or_default();
                log::debug!("settings loaded: {settings:?}");
                self.store.commit(|state| state.settings = settings);
                Ok(())
            }
            Err(error) => {
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Persist `settings`, then apply the autostart flag. The two failures
    /// produce different banners; the local copy follows the backend as soon
    /// as the settings themselves are stored.
    pub async fn update_app_settings(&self, settings: AppSettings) -> Result<(), ClientError> {
        self.begin();

        let outcome = self.gateway.update_app_settings(&settings).await;
        if let Err(error) = settle(Operation::UpdateAppSettings, outcome) {
            let error = prefixed(error, "Failed to save settings");
            self.report(&error);
            return Err(error);
        }
        self.store.commit(|state| state.settings = settings);

        let outcome = self.gateway.toggle_autostart(settings.enable_autostart).await;
        if let Err(error) = settle(Operation::ToggleAutostart, outcome) {
            let error = prefixed(error, "Settings saved, but autostart failed");
            self.report(&error);
            return Err(error);
        }

        log::info!(
            "settings saved (autostart={}, notifications={})",
            settings.enable_autostart,
            settings.enable_notifications
        );
        self.finish();
        Ok(())
    }
}

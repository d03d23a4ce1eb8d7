use crate::{
    app::Controller,
    error::ClientError,
    gateway::{settle, Operation},
    model::{ConnectionState, Page},
    settings::validate_connect_input,
};

impl Controller {
    /// Connect to `server_url` and load the first page of messages.
    ///
    /// `config_name` and `config_id` describe the stored configuration being
    /// used, if any. A second call while one is in flight is ignored.
    pub async fn connect(
        &self,
        server_url: &str,
        token: &str,
        config_name: Option<&str>,
        config_id: Option<&str>,
    ) -> Result<(), ClientError> {
        let (server_url, token) = match validate_connect_input(server_url, token) {
            Ok(input) => input,
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };

        let Ok(_in_flight) = self.connect_guard.try_lock() else {
            log::debug!("connect to {server_url} ignored: another connect is in flight");
            return Ok(());
        };

        self.begin();
        let generation = self.store.read(|state| state.connection_version);
        log::info!("connecting to {server_url}");
        let outcome = self.gateway.connect(&server_url, &token).await;
        let info = match settle(Operation::Connect, outcome) {
            Ok(info) => info.unwrap_or_default(),
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };
        log::info!(
            "connected to {} (server version {})",
            info.server_url.as_deref().unwrap_or(&server_url),
            info.version.as_deref().unwrap_or("unknown")
        );

        let current = self.store.commit(|state| {
            if state.connection_version != generation {
                return false;
            }
            state.connection = ConnectionState {
                connected: true,
                server_url: server_url.clone(),
                config_name: config_name.map(str::to_string),
                current_config_id: config_id.map(str::to_string),
            };
            state.flags.loading = false;
            true
        });
        if !current {
            log::debug!("connect to {server_url} finished after a disconnect, dropping it");
            return Ok(());
        }

        self.refresh_messages().await
    }

    /// Drop the connection. Any fetch still in flight is discarded when it
    /// returns.
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.begin();
        let outcome = self.gateway.disconnect().await;
        if let Err(error) = settle(Operation::Disconnect, outcome) {
            self.report(&error);
            return Err(error);
        }

        self.store.commit(|state| {
            state.connection = ConnectionState::default();
            state.feed.clear();
            state.bump_feed_version();
            state.bump_connection_version();
            state.flags.loading = false;
            state.flags.loading_more = false;
            state.flags.has_more_messages = true;
        });
        log::info!("disconnected");
        Ok(())
    }

    /// Connect with the backend's default configuration, if one exists.
    /// Lookup failures are logged and leave the banner untouched.
    pub async fn auto_connect_default(&self) -> Result<(), ClientError> {
        let outcome = self.gateway.get_default_config().await;
        let default = match settle(Operation::GetDefaultConfig, outcome) {
            Ok(default) => default.flatten(),
            Err(error) => {
                log::warn!("default configuration lookup failed: {error}");
                return Err(error);
            }
        };

        let Some(config) = default else {
            log::debug!("no default configuration, staying disconnected");
            return Ok(());
        };
        log::info!("auto-connecting with default configuration {}", config.name);
        self.connect(
            &config.server_url,
            &config.token,
            Some(&config.name),
            Some(&config.id),
        )
        .await
    }

    /// Switch to the feed, connect with a stored configuration and make it
    /// the default once connected and the first page is in.
    pub async fn use_config(&self, id: &str) -> Result<(), ClientError> {
        let Some(config) = self.store.read(|state| state.config(id).cloned()) else {
            log::debug!("use_config: unknown configuration {id}");
            return Ok(());
        };

        self.switch_page(Page::Messages);
        let connected = self
            .connect(
                &config.server_url,
                &config.token,
                Some(&config.name),
                Some(&config.id),
            )
            .await;

        let now_current = self.store.read(|state| {
            state.connection.connected && state.connection.current_config_id.as_deref() == Some(id)
        });
        if connected.is_ok() && now_current {
            self.set_default_config(id).await?;
        }
        connected
    }
}

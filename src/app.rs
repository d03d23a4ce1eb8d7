use std::sync::Arc;
use tokio::{sync::Mutex as AsyncMutex, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    error::ClientError,
    gateway::{BackendGateway, Confirm},
    model::{AppState, StatePatch},
    options::ClientOptions,
    preferences::PreferencesFile,
    render::Dom,
    store::StateStore,
};

/// Owns the store and the backend handles. Every user-facing operation is a
/// method on this type; see `connection`, `messages`, `configs`, `settings`
/// and `ui_shell`.
pub struct Controller {
    pub(crate) gateway: Arc<dyn BackendGateway>,
    pub(crate) confirm: Arc<dyn Confirm>,
    pub(crate) store: Arc<StateStore>,
    pub(crate) options: ClientOptions,
    pub(crate) preferences: Option<PreferencesFile>,
    pub(crate) connect_guard: AsyncMutex<()>,
}

/// Background tasks started by [`Controller::bootstrap`].
#[derive(Debug)]
pub struct Startup {
    pub listener: Option<JoinHandle<()>>,
    pub refresher: Option<JoinHandle<()>>,
}

impl Startup {
    pub fn abort(&self) {
        for handle in [&self.listener, &self.refresher].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Controller {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        confirm: Arc<dyn Confirm>,
        options: ClientOptions,
    ) -> Self {
        let store = Arc::new(StateStore::new(AppState::default(), Dom::with_structure()));
        Self::with_store(gateway, confirm, store, options)
    }

    pub fn with_store(
        gateway: Arc<dyn BackendGateway>,
        confirm: Arc<dyn Confirm>,
        store: Arc<StateStore>,
        options: ClientOptions,
    ) -> Self {
        let options = options.normalized();
        let preferences = options.preferences_path.clone().map(PreferencesFile::new);
        Self {
            gateway,
            confirm,
            store,
            options,
            preferences,
            connect_guard: AsyncMutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn state(&self) -> AppState {
        self.store.snapshot()
    }

    /// Clear `loading` and show the banner for `error`. Silent errors only
    /// clear the flag.
    pub(crate) fn report(&self, error: &ClientError) {
        let mut patch = StatePatch::new().loading(false);
        if let Some(banner) = error.banner() {
            log::warn!("{banner}");
            patch = patch.error(banner);
        }
        self.store.update(patch);
    }

    pub(crate) fn begin(&self) {
        self.store
            .update(StatePatch::new().loading(true).clear_error());
    }

    pub(crate) fn finish(&self) {
        self.store.update(StatePatch::new().loading(false));
    }

    /// Startup sequence: first paint, local preferences, configs and settings
    /// from the backend, the push listener, then the default configuration.
    pub async fn bootstrap(self: &Arc<Self>) -> Startup {
        self.store.render();
        self.restore_preferences();

        if let Err(error) = self.load_configs().await {
            log::warn!("startup: failed to load configurations: {error}");
        }
        if let Err(error) = self.load_app_settings().await {
            log::warn!("startup: failed to load settings: {error}");
        }

        let listener = match self.spawn_message_listener() {
            Ok(handle) => Some(handle),
            Err(error) => {
                log::warn!("startup: push listener not started: {error}");
                None
            }
        };

        if let Err(error) = self.auto_connect_default().await {
            log::warn!("startup: auto-connect failed: {error}");
        }

        Startup {
            listener,
            refresher: self.spawn_auto_refresh(),
        }
    }

    /// Re-fetch the first page on a fixed interval while connected.
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let period = self.options.auto_refresh_interval()?;
        let controller = Arc::clone(self);
        log::info!("auto refresh every {}s", period.as_secs());
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                interval.tick().await;
                let idle = controller
                    .store
                    .read(|state| state.connection.connected && !state.flags.loading);
                if !idle {
                    continue;
                }
                if let Err(error) = controller.refresh_messages().await {
                    log::debug!("auto refresh failed: {error}");
                }
            }
        }))
    }
}

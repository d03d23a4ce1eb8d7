use async_trait::async_trait;
use futures_util::{stream::BoxStream, StreamExt};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    app::Controller,
    error::GatewayError,
    gateway::{BackendGateway, Envelope, FixedAnswer, GatewayResult},
    model::{AppSettings, ConnectionInfo, Message, SavedConfig, ServerConfig},
    options::ClientOptions,
};

pub(crate) const SERVER_URL: &str = "https://push.example.com";
pub(crate) const TOKEN: &str = "C1ient-T0ken";

pub(crate) fn message(id: i64) -> Message {
    Message {
        id,
        title: Some(format!("Title {id}")),
        message: format!("Body {id}"),
        priority: 5,
        timestamp: "2024-07-01T10:00:00Z".to_string(),
        app_id: Some(1),
        extras: None,
    }
}

pub(crate) fn messages(ids: impl IntoIterator<Item = i64>) -> Vec<Message> {
    ids.into_iter().map(message).collect()
}

pub(crate) fn config(id: &str, last_used: Option<&str>) -> ServerConfig {
    ServerConfig {
        id: id.to_string(),
        name: format!("Server {id}"),
        server_url: format!("https://{id}.example.com"),
        token: format!("token-{id}"),
        is_default: false,
        last_used: last_used.map(str::to_string),
    }
}

/// In-memory backend. Calls are recorded by name; responses come from the
/// scripted queues first and from the in-memory data otherwise.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) server_messages: Mutex<Vec<Message>>,
    pub(crate) fetch_script: Mutex<VecDeque<GatewayResult<Vec<Message>>>>,
    pub(crate) connect_script: Mutex<VecDeque<GatewayResult<ConnectionInfo>>>,
    pub(crate) configs: Mutex<Vec<ServerConfig>>,
    pub(crate) saved_id_override: Mutex<Option<String>>,
    pub(crate) settings: Mutex<AppSettings>,
    pub(crate) set_default_error: Mutex<Option<String>>,
    pub(crate) settings_error: Mutex<Option<String>>,
    pub(crate) autostart_error: Mutex<Option<String>>,
    pub(crate) notification_error: Mutex<Option<GatewayError>>,
    pub(crate) notifications: Mutex<Vec<(String, String)>>,
    pub(crate) autostart: Mutex<Option<bool>>,
    holds: Mutex<HashMap<&'static str, oneshot::Receiver<()>>>,
    push_tx: Mutex<Option<mpsc::UnboundedSender<serde_json::Value>>>,
    push_rx: Mutex<Option<mpsc::UnboundedReceiver<serde_json::Value>>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Self::default();
        *gateway.push_tx.lock().unwrap() = Some(tx);
        *gateway.push_rx.lock().unwrap() = Some(rx);
        Arc::new(gateway)
    }

    pub(crate) fn with_server_messages(self: Arc<Self>, ids: impl IntoIterator<Item = i64>) -> Arc<Self> {
        *self.server_messages.lock().unwrap() = messages(ids);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    pub(crate) fn script_fetch(&self, outcome: GatewayResult<Vec<Message>>) {
        self.fetch_script.lock().unwrap().push_back(outcome);
    }

    pub(crate) fn script_connect(&self, outcome: GatewayResult<ConnectionInfo>) {
        self.connect_script.lock().unwrap().push_back(outcome);
    }

    /// The next call named `name` waits until the returned sender fires.
    pub(crate) fn hold(&self, name: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert(name, rx);
        tx
    }

    pub(crate) fn push(&self, payload: serde_json::Value) {
        if let Some(tx) = self.push_tx.lock().unwrap().as_ref() {
            let _ = tx.send(payload);
        }
    }

    async fn enter(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name.to_string());
        let hold = self.holds.lock().unwrap().remove(name);
        if let Some(rx) = hold {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn connect(&self, server_url: &str, _token: &str) -> GatewayResult<ConnectionInfo> {
        self.enter("connect").await;
        if let Some(outcome) = self.connect_script.lock().unwrap().pop_front() {
            return outcome;
        }
        Ok(Envelope::ok(ConnectionInfo {
            server_url: Some(server_url.to_string()),
            version: Some("2.4.0".to_string()),
        }))
    }

    async fn disconnect(&self) -> GatewayResult<()> {
        self.enter("disconnect").await;
        Ok(Envelope::empty())
    }

    async fn fetch_messages(
        &self,
        _since: Option<String>,
        limit: usize,
        offset: usize,
    ) -> GatewayResult<Vec<Message>> {
        self.enter("fetch_messages").await;
        if let Some(outcome) = self.fetch_script.lock().unwrap().pop_front() {
            return outcome;
        }
        let server = self.server_messages.lock().unwrap();
        let page = server.iter().skip(offset).take(limit).cloned().collect();
        Ok(Envelope::ok(page))
    }

    async fn delete_message(&self, message_id: i64) -> GatewayResult<()> {
        self.enter("delete_message").await;
        self.server_messages
            .lock()
            .unwrap()
            .retain(|message| message.id != message_id);
        Ok(Envelope::empty())
    }

    async fn save_config(&self, config: &ServerConfig) -> GatewayResult<SavedConfig> {
        self.enter("save_config").await;
        let mut stored = config.clone();
        if let Some(id) = self.saved_id_override.lock().unwrap().clone() {
            stored.id = id;
        }
        let id = stored.id.clone();
        self.configs.lock().unwrap().push(stored);
        Ok(Envelope::ok(SavedConfig { id }))
    }

    async fn update_config(
        &self,
        id: &str,
        name: &str,
        server_url: &str,
        token: &str,
    ) -> GatewayResult<()> {
        self.enter("update_config").await;
        let mut configs = self.configs.lock().unwrap();
        match configs.iter_mut().find(|config| config.id == id) {
            Some(config) => {
                config.name = name.to_string();
                config.server_url = server_url.to_string();
                config.token = token.to_string();
                Ok(Envelope::empty())
            }
            None => Ok(Envelope::fail(format!("Config {id} not found"))),
        }
    }

    async fn delete_config(&self, id: &str) -> GatewayResult<()> {
        self.enter("delete_config").await;
        self.configs.lock().unwrap().retain(|config| config.id != id);
        Ok(Envelope::empty())
    }

    async fn get_configs(&self) -> GatewayResult<Vec<ServerConfig>> {
        self.enter("get_configs").await;
        Ok(Envelope::ok(self.configs.lock().unwrap().clone()))
    }

    async fn get_default_config(&self) -> GatewayResult<Option<ServerConfig>> {
        self.enter("get_default_config").await;
        let configs = self.configs.lock().unwrap();
        Ok(Envelope::ok(
            configs.iter().find(|config| config.is_default).cloned(),
        ))
    }

    async fn set_default_config(&self, id: &str) -> GatewayResult<()> {
        self.enter("set_default_config").await;
        if let Some(error) = self.set_default_error.lock().unwrap().clone() {
            return Ok(Envelope::fail(error));
        }
        let mut configs = self.configs.lock().unwrap();
        if !configs.iter().any(|config| config.id == id) {
            return Ok(Envelope::fail(format!("Config {id} not found")));
        }
        for config in configs.iter_mut() {
            config.is_default = config.id == id;
            if config.id == id {
                config.last_used = Some("2024-07-01T12:00:00Z".to_string());
            }
        }
        Ok(Envelope::empty())
    }

    async fn get_app_settings(&self) -> GatewayResult<AppSettings> {
        self.enter("get_app_settings").await;
        Ok(Envelope::ok(*self.settings.lock().unwrap()))
    }

    async fn update_app_settings(&self, settings: &AppSettings) -> GatewayResult<()> {
        self.enter("update_app_settings").await;
        if let Some(error) = self.settings_error.lock().unwrap().clone() {
            return Ok(Envelope::fail(error));
        }
        *self.settings.lock().unwrap() = *settings;
        Ok(Envelope::empty())
    }

    async fn toggle_autostart(&self, enabled: bool) -> GatewayResult<()> {
        self.enter("toggle_autostart").await;
        if let Some(error) = self.autostart_error.lock().unwrap().clone() {
            return Ok(Envelope::fail(error));
        }
        *self.autostart.lock().unwrap() = Some(enabled);
        Ok(Envelope::empty())
    }

    async fn send_notification(&self, title: &str, body: &str) -> GatewayResult<()> {
        self.enter("send_notification").await;
        if let Some(error) = self.notification_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(Envelope::empty())
    }

    fn subscribe(
        &self,
        event: &str,
    ) -> Result<BoxStream<'static, serde_json::Value>, GatewayError> {
        self.calls.lock().unwrap().push(format!("subscribe:{event}"));
        let rx = self
            .push_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| GatewayError::Subscribe("already subscribed".to_string()))?;
        Ok(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|payload| (payload, rx))
        })
        .boxed())
    }
}

pub(crate) fn controller_with(
    gateway: Arc<FakeGateway>,
    confirm: bool,
    options: ClientOptions,
) -> Arc<Controller> {
    Arc::new(Controller::new(gateway, Arc::new(FixedAnswer(confirm)), options))
}

pub(crate) fn controller(gateway: Arc<FakeGateway>) -> Arc<Controller> {
    controller_with(gateway, true, ClientOptions::default())
}

/// Controller connected to [`SERVER_URL`] with the first page loaded and
/// the call log cleared.
pub(crate) async fn connected(gateway: Arc<FakeGateway>) -> Arc<Controller> {
    let controller = controller(gateway.clone());
    controller
        .connect(SERVER_URL, TOKEN, None, None)
        .await
        .expect("connect");
    gateway.calls.lock().unwrap().clear();
    controller
}

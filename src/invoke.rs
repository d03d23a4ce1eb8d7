use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    error::GatewayError,
    gateway::{BackendGateway, Envelope, GatewayResult},
    model::{AppSettings, ConnectionInfo, Message, SavedConfig, ServerConfig},
};

/// Command-name plus JSON-arguments transport spoken by the desktop backend.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, GatewayError>;

    fn listen(&self, event: &str) -> Result<BoxStream<'static, Value>, GatewayError>;
}

/// [`BackendGateway`] over an [`Invoker`]. Every response is decoded as an
/// [`Envelope`].
pub struct InvokeGateway<I> {
    invoker: I,
}

impl<I: Invoker> InvokeGateway<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    async fn call<T: DeserializeOwned>(&self, command: &str, args: Value) -> GatewayResult<T> {
        log::debug!("invoke {command}");
        let response = self.invoker.invoke(command, args).await?;
        serde_json::from_value::<Envelope<T>>(response)
            .map_err(|error| GatewayError::Decode(format!("{command}: {error}")))
    }

    /// For commands whose `data` is irrelevant; any payload is discarded.
    async fn call_unit(&self, command: &str, args: Value) -> GatewayResult<()> {
        let envelope = self.call::<Value>(command, args).await?;
        Ok(Envelope {
            success: envelope.success,
            data: None,
            error: envelope.error,
        })
    }
}

#[async_trait]
impl<I: Invoker> BackendGateway for InvokeGateway<I> {
    async fn connect(&self, server_url: &str, token: &str) -> GatewayResult<ConnectionInfo> {
        self.call(
            "connect_to_gotify",
            json!({ "req": { "server_url": server_url, "token": token } }),
        )
        .await
    }

    async fn disconnect(&self) -> GatewayResult<()> {
        self.call_unit("disconnect_gotify", json!({})).await
    }

    async fn fetch_messages(
        &self,
        since: Option<String>,
        limit: usize,
        offset: usize,
    ) -> GatewayResult<Vec<Message>> {
        self.call(
            "fetch_messages",
            json!({ "since": since, "limit": limit, "offset": offset }),
        )
        .await
    }

    async fn delete_message(&self, message_id: i64) -> GatewayResult<()> {
        self.call_unit("delete_message", json!({ "messageId": message_id }))
            .await
    }

    async fn save_config(&self, config: &ServerConfig) -> GatewayResult<SavedConfig> {
        self.call("save_config", json!({ "config": config })).await
    }

    async fn update_config(
        &self,
        id: &str,
        name: &str,
        server_url: &str,
        token: &str,
    ) -> GatewayResult<()> {
        self.call_unit(
            "update_config",
            json!({ "id": id, "name": name, "serverUrl": server_url, "token": token }),
        )
        .await
    }

    async fn delete_config(&self, id: &str) -> GatewayResult<()> {
        self.call_unit("delete_config", json!({ "id": id })).await
    }

    async fn get_configs(&self) -> GatewayResult<Vec<ServerConfig>> {
        self.call("get_configs", json!({})).await
    }

    async fn get_default_config(&self) -> GatewayResult<Option<ServerConfig>> {
        self.call("get_default_config", json!({})).await
    }

    async fn set_default_config(&self, id: &str) -> GatewayResult<()> {
        self.call_unit("set_default_config", json!({ "id": id })).await
    }

    async fn get_app_settings(&self) -> GatewayResult<AppSettings> {
        self.call("get_app_settings", json!({})).await
    }

    async fn update_app_settings(&self, settings: &AppSettings) -> GatewayResult<()> {
        self.call_unit("update_app_settings", json!({ "settings": settings }))
            .await
    }

    async fn toggle_autostart(&self, enabled: bool) -> GatewayResult<()> {
        self.call_unit("toggle_autostart", json!({ "enabled": enabled }))
            .await
    }

    async fn send_notification(&self, title: &str, body: &str) -> GatewayResult<()> {
        self.call_unit("send_notification", json!({ "title": title, "body": body }))
            .await
    }

    fn subscribe(&self, event: &str) -> Result<BoxStream<'static, Value>, GatewayError> {
        self.invoker.listen(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::{collections::HashMap, sync::Mutex};

    #[derive(Default)]
    struct ScriptedInvoker {
        sent: Mutex<Vec<(String, Value)>>,
        responses: Mutex<HashMap<String, Value>>,
    }

    impl ScriptedInvoker {
        fn respond(self, command: &str, response: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(command.to_string(), response);
            self
        }

        fn last(&self) -> (String, Value) {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Invoker for ScriptedInvoker {
        async fn invoke(&self, command: &str, args: Value) -> Result<Value, GatewayError> {
            self.sent.lock().unwrap().push((command.to_string(), args));
            self.responses
                .lock()
                .unwrap()
                .get(command)
                .cloned()
                .ok_or_else(|| GatewayError::Invoke(format!("command {command} not found")))
        }

        fn listen(&self, event: &str) -> Result<BoxStream<'static, Value>, GatewayError> {
            let payload = json!({ "id": 1, "message": event });
            Ok(futures_util::stream::iter(vec![payload]).boxed())
        }
    }

    #[tokio::test]
    async fn connect_wraps_arguments_in_req() {
        let gateway = InvokeGateway::new(ScriptedInvoker::default().respond(
            "connect_to_gotify",
            json!({"success": true, "data": {"server_url": "https://push.example.com", "version": "2.4.0"}}),
        ));

        let envelope = gateway.connect("https://push.example.com", "abc").await.unwrap();
        assert_eq!(envelope.data.unwrap().version.as_deref(), Some("2.4.0"));
        assert_eq!(
            gateway.invoker().last(),
            (
                "connect_to_gotify".to_string(),
                json!({"req": {"server_url": "https://push.example.com", "token": "abc"}})
            )
        );
    }

    #[tokio::test]
    async fn camel_case_argument_names() {
        let gateway = InvokeGateway::new(
            ScriptedInvoker::default()
                .respond("delete_message", json!({"success": true, "data": {"deleted": 5}}))
                .respond("update_config", json!({"success": false, "error": "Config not found"})),
        );

        let deleted = gateway.delete_message(5).await.unwrap();
        assert!(deleted.success);
        assert_eq!(gateway.invoker().last().1, json!({"messageId": 5}));

        let updated = gateway
            .update_config("c1", "Home", "https://push.example.com", "abc")
            .await
            .unwrap();
        assert_eq!(updated.error.as_deref(), Some("Config not found"));
        assert_eq!(
            gateway.invoker().last().1,
            json!({"id": "c1", "name": "Home", "serverUrl": "https://push.example.com", "token": "abc"})
        );
    }

    #[tokio::test]
    async fn fetch_passes_null_since_and_decodes_page() {
        let gateway = InvokeGateway::new(ScriptedInvoker::default().respond(
            "fetch_messages",
            json!({"success": true, "data": [
                {"id": 2, "message": "b", "date": "2024-07-01T10:00:00Z", "appid": 1},
                {"id": 1, "title": "a", "message": "a", "priority": 4}
            ]}),
        ));

        let page = gateway.fetch_messages(None, 10, 20).await.unwrap().data.unwrap();
        assert_eq!(page.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(
            gateway.invoker().last().1,
            json!({"since": null, "limit": 10, "offset": 20})
        );
    }

    #[tokio::test]
    async fn malformed_response_is_a_decode_error() {
        let gateway = InvokeGateway::new(
            ScriptedInvoker::default().respond("get_configs", json!({"success": true, "data": "nope"})),
        );
        assert!(matches!(
            gateway.get_configs().await,
            Err(GatewayError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn missing_command_is_a_transport_error() {
        let gateway = InvokeGateway::new(ScriptedInvoker::default());
        assert_eq!(
            gateway.toggle_autostart(true).await,
            Err(GatewayError::Invoke("command toggle_autostart not found".to_string()))
        );
    }

    #[tokio::test]
    async fn subscribe_forwards_to_listen() {
        let gateway = InvokeGateway::new(ScriptedInvoker::default());
        let mut events = gateway.subscribe("new-message").unwrap();
        assert_eq!(events.next().await, Some(json!({"id": 1, "message": "new-message"})));
    }
}

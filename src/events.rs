use futures_util::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    app::Controller,
    consts::NEW_MESSAGE_EVENT,
    core::truncate_message,
    error::GatewayError,
    model::Message,
};

fn decode_pushed(payload: serde_json::Value) -> Result<Message, String> {
    let preview = truncate_message(&payload.to_string(), 200);
    serde_json::from_value::<Message>(payload)
        .map_err(|error| format!("failed to parse pushed message: {error}; payload={preview}"))
}

impl Controller {
    /// Subscribe to pushed messages and apply them until the channel closes.
    pub fn spawn_message_listener(self: &Arc<Self>) -> Result<JoinHandle<()>, GatewayError> {
        let mut events = self.gateway.subscribe(NEW_MESSAGE_EVENT)?;
        let controller = Arc::clone(self);
        log::info!("listening for {NEW_MESSAGE_EVENT} events");

        Ok(tokio::spawn(async move {
            while let Some(payload) = events.next().await {
                controller.handle_pushed(payload);
            }
            log::info!("{NEW_MESSAGE_EVENT} channel closed");
        }))
    }

    /// Apply one pushed payload. The notification for a new message runs
    /// on its own task so the feed keeps up with the channel.
    pub(crate) fn handle_pushed(self: &Arc<Self>, payload: serde_json::Value) {
        let message = match decode_pushed(payload) {
            Ok(message) => message,
            Err(error) => {
                log::warn!("{error}");
                return;
            }
        };

        let notify = message.clone();
        if self.apply_pushed(message) {
            let controller = Arc::clone(self);
            tokio::spawn(async move { controller.maybe_notify(&notify).await });
        }
    }
}

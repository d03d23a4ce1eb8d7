use crate::{
    app::Controller,
    gateway::{settle, Operation},
    model::Message,
};

/// Title shown for `message`: its own, or `fallback` when it has none.
pub(crate) fn notification_title<'a>(message: &'a Message, fallback: &'a str) -> &'a str {
    match message.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title,
        _ => fallback,
    }
}

impl Controller {
    /// Ask the backend to show a desktop notification for `message` when
    /// notifications are enabled. Failures are only logged.
    pub(crate) async fn maybe_notify(&self, message: &Message) {
        let enabled = self
            .store
            .read(|state| state.settings.enable_notifications);
        if !enabled {
            return;
        }

        let title = notification_title(message, &self.options.notification_title);
        let outcome = self.gateway.send_notification(title, &message.message).await;
        if let Err(error) = settle(Operation::SendNotification, outcome) {
            log::warn!("failed to show notification for message {}: {error}", message.id);
        }
    }
}

use crate::{
    app::Controller,
    consts::CONFIRM_DELETE_MESSAGE,
    core::truncate_message,
    error::ClientError,
    gateway::{settle, Operation},
    model::{AppState, Message},
};

/// Put a pushed message at the head of the feed. A message already present
/// is moved instead of duplicated. Returns whether the id was new.
pub(crate) fn insert_pushed(state: &mut AppState, message: Message, cap: usize) -> bool {
    let existed = match state.feed.iter().position(|cached| cached.id == message.id) {
        Some(position) => {
            state.feed.remove(position);
            true
        }
        None => false,
    };
    state.feed.insert(0, message);
    if state.feed.len() > cap {
        state.feed.truncate(cap);
    }
    !existed
}

/// Append a page, skipping ids the feed already holds.
fn append_page(state: &mut AppState, page: Vec<Message>) -> usize {
    let before = state.feed.len();
    for message in page {
        if !state.feed.iter().any(|cached| cached.id == message.id) {
            state.feed.push(message);
        }
    }
    state.feed.len() - before
}

impl Controller {
    /// Replace the feed with the newest page. No-op while disconnected.
    pub async fn refresh_messages(&self) -> Result<(), ClientError> {
        let page_size = self.options.page_size;
        let Some(version) = self.store.commit(|state| {
            if !state.connection.connected {
                return None;
            }
            state.flags.loading = true;
            state.flags.error = None;
            Some(state.bump_feed_version())
        }) else {
            return Ok(());
        };

        let outcome = self.gateway.fetch_messages(None, page_size, 0).await;
        let settled = settle(Operation::FetchMessages, outcome);
        self.store.commit(|state| {
            if state.feed_version != version {
                log::debug!("dropping stale first page (feed changed while fetching)");
                return settled.map(|_| ());
            }
            state.flags.loading = false;
            match settled {
                Ok(page) => {
                    let page = page.unwrap_or_default();
                    log::debug!("fetched {} messages", page.len());
                    state.flags.has_more_messages = page.len() >= page_size;
                    state.feed = page;
                    Ok(())
                }
                Err(error) => {
                    state.flags.error = error.banner();
                    Err(error)
                }
            }
        })
    }

    /// Fetch the page after the current feed and append it.
    pub async fn load_more(&self) -> Result<(), ClientError> {
        let page_size = self.options.page_size;
        let Some((version, offset)) = self.store.commit(|state| {
            if !state.can_load_more() {
                return None;
            }
            state.flags.loading_more = true;
            state.flags.error = None;
            Some((state.feed_version, state.feed.len()))
        }) else {
            return Ok(());
        };

        let outcome = self.gateway.fetch_messages(None, page_size, offset).await;
        let settled = settle(Operation::LoadMore, outcome);
        self.store.commit(|state| {
            state.flags.loading_more = false;
            if state.feed_version != version {
                log::debug!("dropping stale page at offset {offset}");
                return settled.map(|_| ());
            }
            match settled {
                Ok(page) => {
                    let page = page.unwrap_or_default();
                    state.flags.has_more_messages = page.len() >= page_size;
                    let added = append_page(state, page);
                    log::debug!("appended {added} messages at offset {offset}");
                    Ok(())
                }
                Err(error) => {
                    state.flags.error = error.banner();
                    Err(error)
                }
            }
        })
    }

    /// Delete one message after confirmation. Ids not in the feed are
    /// still sent to the backend; the feed is simply left as is.
    pub async fn delete_message(&self, message_id: i64) -> Result<(), ClientError> {
        if !self.confirm.confirm(CONFIRM_DELETE_MESSAGE).await {
            log::debug!("delete of message {message_id} cancelled");
            return Err(ClientError::UserAbort);
        }

        self.begin();
        let outcome = self.gateway.delete_message(message_id).await;
        if let Err(error) = settle(Operation::DeleteMessage, outcome) {
            self.report(&error);
            return Err(error);
        }

        self.store.commit(|state| {
            state.feed.retain(|message| message.id != message_id);
            state.flags.loading = false;
        });
        log::info!("deleted message {message_id}");
        Ok(())
    }

    /// Apply a pushed message to the feed. Returns whether it was new.
    pub(crate) fn apply_pushed(&self, message: Message) -> bool {
        let cap = self.options.push_feed_cap;
        log::debug!(
            "message pushed id={} title={}",
            message.id,
            truncate_message(message.title.as_deref().unwrap_or_default(), 60)
        );
        self.store.commit(|state| insert_pushed(state, message, cap))
    }
}

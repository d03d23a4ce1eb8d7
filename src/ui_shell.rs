use crate::{
    app::Controller,
    configs::ConfigDraft,
    error::ClientError,
    model::{ConfigModal, Page},
    preferences::UiPreferences,
};

impl Controller {
    pub fn switch_page(&self, page: Page) {
        self.store.commit(|state| state.shell.page = page);
    }

    /// Flip the sidebar and remember the choice. A failed write is logged;
    /// the in-memory flag still changes.
    pub fn toggle_sidebar(&self) {
        let collapsed = self.store.commit(|state| {
            state.shell.sidebar_collapsed = !state.shell.sidebar_collapsed;
            state.shell.sidebar_collapsed
        });

        let Some(file) = self.preferences.as_ref() else {
            return;
        };
        let preferences = UiPreferences {
            sidebar_collapsed: collapsed,
        };
        if let Err(error) = file.save(&preferences) {
            log::warn!("failed to persist sidebar state to {}: {error}", file.path().display());
        }
    }

    pub(crate) fn restore_preferences(&self) {
        let Some(file) = self.preferences.as_ref() else {
            return;
        };
        match file.load() {
            Ok(preferences) => self
                .store
                .commit(|state| state.shell.sidebar_collapsed = preferences.sidebar_collapsed),
            Err(error) => log::warn!("failed to read UI preferences: {error}"),
        }
    }

    pub fn show_add_config_modal(&self) {
        self.store.commit(|state| {
            state.shell.config_modal = ConfigModal {
                open: true,
                ..ConfigModal::default()
            }
        });
    }

    /// Open the dialog prefilled with a stored configuration.
    pub fn edit_config(&self, id: &str) {
        self.store.commit(|state| {
            let Some(config) = state.config(id).cloned() else {
                log::debug!("edit_config: unknown configuration {id}");
                return;
            };
            state.shell.config_modal = ConfigModal {
                open: true,
                edit_id: Some(config.id),
                name: config.name,
                server_url: config.server_url,
                token: config.token,
            };
        });
    }

    pub fn close_config_modal(&self) {
        self.store
            .commit(|state| state.shell.config_modal = ConfigModal::default());
    }

    /// Submit the dialog: update when editing, otherwise create. The dialog
    /// stays open with the entered values unless the configuration was
    /// stored.
    pub async fn save_config_from_modal(&self, draft: ConfigDraft) -> Result<(), ClientError> {
        let edit_id = self.store.commit(|state| {
            let modal = &mut state.shell.config_modal;
            modal.name = draft.name.clone();
            modal.server_url = draft.server_url.clone();
            modal.token = draft.token.clone();
            modal.edit_id.clone()
        });

        let follow_up = match edit_id {
            Some(id) => {
                self.update_config(&id, &draft).await?;
                Ok(())
            }
            None => self.store_config(&draft).await?.1,
        };
        self.close_config_modal();
        follow_up
    }

    pub fn dismiss_error(&self) {
        self.store.commit(|state| state.flags.error = None);
    }
}

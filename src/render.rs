//! Projection of [`AppState`] onto the retained element tree.
//!
//! Every function here is a pure read of the state followed by writes into
//! the [`Dom`]. Running a render twice with the same state and clock leaves
//! the tree unchanged. Elements that do not exist are skipped.

use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, fmt::Write as _};

use crate::{
    consts::{SIDEBAR_COLLAPSED_MARGIN, SIDEBAR_EXPANDED_MARGIN, UNTITLED_MESSAGE},
    core::{escape_html, format_last_used, format_message_time},
    model::{AppState, Page, ServerConfig},
};

pub const STATUS_INDICATOR: &str = "statusIndicator";
pub const STATUS_TEXT: &str = "statusText";
pub const CONFIG_DISPLAY: &str = "configDisplay";
pub const CONNECT_BTN: &str = "connectBtn";
pub const DISCONNECT_BTN: &str = "disconnectBtn";
pub const ERROR_MESSAGE: &str = "errorMessage";
pub const MESSAGES: &str = "messages";
pub const CONFIG_LIST: &str = "configList";
pub const ENABLE_AUTOSTART: &str = "enableAutostart";
pub const MINIMIZE_TO_TRAY: &str = "minimizeToTray";
pub const SILENT_START: &str = "silentStart";
pub const ENABLE_NOTIFICATIONS: &str = "enableNotifications";
pub const SIDEBAR: &str = "sidebar";
pub const MAIN_CONTENT: &str = "mainContent";
pub const CONFIG_MODAL: &str = "configModal";
pub const MODAL_TITLE: &str = "modalTitle";
pub const MODAL_SERVER_URL: &str = "modalServerUrl";
pub const MODAL_TOKEN: &str = "modalToken";
pub const MODAL_CONFIG_NAME: &str = "modalConfigName";

const STATIC_IDS: [&str; 19] = [
    STATUS_INDICATOR,
    STATUS_TEXT,
    CONFIG_DISPLAY,
    CONNECT_BTN,
    DISCONNECT_BTN,
    ERROR_MESSAGE,
    MESSAGES,
    CONFIG_LIST,
    ENABLE_AUTOSTART,
    MINIMIZE_TO_TRAY,
    SILENT_START,
    ENABLE_NOTIFICATIONS,
    SIDEBAR,
    MAIN_CONTENT,
    CONFIG_MODAL,
    MODAL_TITLE,
    MODAL_SERVER_URL,
    MODAL_TOKEN,
    MODAL_CONFIG_NAME,
];

pub fn nav_id(page: Page) -> String {
    format!("nav-{}", page.as_str())
}

pub fn page_id(page: Page) -> String {
    format!("page-{}", page.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: Option<String>,
    pub inner_html: Option<String>,
    pub class_name: Option<String>,
    pub style: BTreeMap<String, String>,
    pub disabled: bool,
    pub checked: bool,
    pub value: Option<String>,
}

impl Element {
    pub fn display(&self) -> Option<&str> {
        self.style.get("display").map(String::as_str)
    }

    fn set_display(&mut self, value: &str) {
        self.style.insert("display".to_string(), value.to_string());
    }

    fn set_text(&mut self, value: impl Into<String>) {
        self.text = Some(value.into());
    }
}

/// Retained element tree keyed by element id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dom {
    elements: BTreeMap<String, Element>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding every element the renderer writes to.
    pub fn with_structure() -> Self {
        let mut dom = Self::new();
        for id in STATIC_IDS {
            dom.insert(id);
        }
        for page in Page::ALL {
            dom.insert(nav_id(page));
            dom.insert(page_id(page));
        }
        dom
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.elements.entry(id.into()).or_default();
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }
}

pub fn render(state: &AppState, dom: &mut Dom, now: DateTime<Utc>) {
    render_connection(state, dom);
    render_buttons(state, dom);
    render_error(state, dom);
    render_messages(state, dom);
    render_configs(state, dom, now);
    render_settings(state, dom);
    render_shell(state, dom);
    render_config_modal(state, dom);
}

fn render_connection(state: &AppState, dom: &mut Dom) {
    let connected = state.connection.connected;
    if let Some(indicator) = dom.element_mut(STATUS_INDICATOR) {
        indicator.class_name = Some(
            if connected {
                "status connected"
            } else {
                "status disconnected"
            }
            .to_string(),
        );
    }
    if let Some(label) = dom.element_mut(STATUS_TEXT) {
        label.set_text(if connected { "Connected" } else { "Disconnected" });
    }

    if let Some(display) = dom.element_mut(CONFIG_DISPLAY) {
        match state.connection.config_name.as_deref() {
            Some(name) if connected => {
                display.set_text(format!("{name} ({})", state.connection.server_url));
                display.set_display("inline-block");
            }
            _ => display.set_display("none"),
        }
    }
}

fn render_buttons(state: &AppState, dom: &mut Dom) {
    let connected = state.connection.connected;
    let loading = state.flags.loading;
    if let Some(button) = dom.element_mut(CONNECT_BTN) {
        button.disabled = loading;
        button.set_text(if loading { "Connecting..." } else { "Connect" });
        button.set_display(if connected { "none" } else { "inline-block" });
    }
    if let Some(button) = dom.element_mut(DISCONNECT_BTN) {
        button.set_display(if connected { "inline-block" } else { "none" });
    }
}

fn render_error(state: &AppState, dom: &mut Dom) {
    let Some(banner) = dom.element_mut(ERROR_MESSAGE) else {
        return;
    };
    match state.flags.error.as_deref() {
        Some(error) => {
            banner.set_text(error);
            banner.set_display("block");
        }
        None => banner.set_display("none"),
    }
}

fn render_messages(state: &AppState, dom: &mut Dom) {
    if let Some(container) = dom.element_mut(MESSAGES) {
        container.inner_html = Some(messages_html(state));
    }
}

fn render_configs(state: &AppState, dom: &mut Dom, now: DateTime<Utc>) {
    if let Some(container) = dom.element_mut(CONFIG_LIST) {
        container.inner_html = Some(configs_html(state, now));
    }
}

fn render_settings(state: &AppState, dom: &mut Dom) {
    let settings = state.settings;
    for (id, checked) in [
        (ENABLE_AUTOSTART, settings.enable_autostart),
        (MINIMIZE_TO_TRAY, settings.minimize_to_tray),
        (SILENT_START, settings.silent_start),
        (ENABLE_NOTIFICATIONS, settings.enable_notifications),
    ] {
        if let Some(checkbox) = dom.element_mut(id) {
            checkbox.checked = checked;
        }
    }
}

fn render_shell(state: &AppState, dom: &mut Dom) {
    let shell = &state.shell;
    for page in Page::ALL {
        let active = page == shell.page;
        if let Some(nav) = dom.element_mut(&nav_id(page)) {
            nav.class_name = Some(if active { "nav-item active" } else { "nav-item" }.to_string());
        }
        if let Some(section) = dom.element_mut(&page_id(page)) {
            section.set_display(if active { "block" } else { "none" });
        }
    }

    if let Some(sidebar) = dom.element_mut(SIDEBAR) {
        sidebar.class_name = Some(
            if shell.sidebar_collapsed {
                "sidebar collapsed"
            } else {
                "sidebar"
            }
            .to_string(),
        );
    }
    if let Some(main) = dom.element_mut(MAIN_CONTENT) {
        let margin = if shell.sidebar_collapsed {
            SIDEBAR_COLLAPSED_MARGIN
        } else {
            SIDEBAR_EXPANDED_MARGIN
        };
        main.style
            .insert("margin-left".to_string(), margin.to_string());
    }
}

fn render_config_modal(state: &AppState, dom: &mut Dom) {
    let modal = &state.shell.config_modal;
    if let Some(element) = dom.element_mut(CONFIG_MODAL) {
        element.class_name = Some(if modal.open { "modal show" } else { "modal" }.to_string());
    }
    if let Some(title) = dom.element_mut(MODAL_TITLE) {
        title.set_text(if modal.edit_id.is_some() {
            "Edit configuration"
        } else {
            "Add configuration"
        });
    }
    for (id, value) in [
        (MODAL_SERVER_URL, &modal.server_url),
        (MODAL_TOKEN, &modal.token),
        (MODAL_CONFIG_NAME, &modal.name),
    ] {
        if let Some(input) = dom.element_mut(id) {
            input.value = Some(value.clone());
        }
    }
}

pub fn messages_html(state: &AppState) -> String {
    if state.feed.is_empty() {
        return r#"<p class="empty-state">No messages</p>"#.to_string();
    }

    let mut html = String::from(
        r#"<div class="messages-header"><h2>Messages</h2><button id="refreshBtn" data-action="refresh-messages">Refresh</button></div>"#,
    );
    for message in &state.feed {
        let title = message
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(UNTITLED_MESSAGE);
        let _ = write!(
            html,
            concat!(
                r#"<div class="message-card priority-{priority}" data-id="{id}">"#,
                r#"<div class="message-header"><span class="message-title">{title}</span>"#,
                r#"<span class="message-time">{time}</span></div>"#,
                r#"<div class="message-body">{body}</div>"#,
                r#"<div class="message-footer"><span class="priority-badge priority-{priority}">Priority: {priority}</span>"#,
                r#"<button class="delete-btn" data-action="delete-message" data-id="{id}">Delete</button></div>"#,
                "</div>"
            ),
            priority = message.priority,
            id = message.id,
            title = escape_html(title),
            time = escape_html(&format_message_time(&message.timestamp)),
            body = escape_html(&message.message),
        );
    }
    if state.flags.loading_more {
        html.push_str(r#"<div class="loading-more">Loading...</div>"#);
    }
    if state.flags.has_more_messages {
        html.push_str(
            r#"<button class="load-more-btn" data-action="load-more-messages">Load more</button>"#,
        );
    }
    html
}

/// Most recently used first; configs never used go last, keeping their
/// relative order.
pub fn sorted_configs(configs: &[ServerConfig]) -> Vec<&ServerConfig> {
    let mut sorted: Vec<&ServerConfig> = configs.iter().collect();
    sorted.sort_by(|a, b| match (&a.last_used, &b.last_used) {
        (Some(a_used), Some(b_used)) => b_used.cmp(a_used),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}

pub fn configs_html(state: &AppState, now: DateTime<Utc>) -> String {
    if state.configs.is_empty() {
        return concat!(
            r#"<div class="empty-state"><p>No configurations</p>"#,
            r#"<p class="empty-hint">Use the add button to create one</p></div>"#
        )
        .to_string();
    }

    let current = state.connection.current_config_id.as_deref();
    let mut html = String::from(r#"<div class="config-grid">"#);
    for config in sorted_configs(&state.configs) {
        let connected = current == Some(config.id.as_str());
        let id = escape_html(&config.id);

        let mut classes = String::from("config-card");
        if config.is_default {
            classes.push_str(" default");
        }
        if connected {
            classes.push_str(" connected");
        }

        let _ = write!(
            html,
            r#"<div class="{classes}" data-id="{id}"><div class="config-header"><div class="config-name">{name}"#,
            name = escape_html(&config.name),
        );
        if connected {
            html.push_str(r#"<span class="connected-badge">Connected</span>"#);
        }
        html.push_str("</div>");
        if let Some(last_used) = config.last_used.as_deref() {
            let _ = write!(
                html,
                r#"<div class="config-last-used">Last used: {}</div>"#,
                escape_html(&format_last_used(last_used, now))
            );
        }
        let _ = write!(
            html,
            r#"</div><div class="config-url">{}</div><div class="config-actions">"#,
            escape_html(&config.server_url)
        );
        if connected {
            html.push_str(r#"<button class="config-action-btn disabled" disabled>Connected</button>"#);
        } else {
            let _ = write!(
                html,
                r#"<button class="config-action-btn primary" data-action="use-config" data-id="{id}">Connect</button>"#
            );
        }
        if !config.is_default {
            let _ = write!(
                html,
                r#"<button class="config-action-btn secondary" data-action="set-default-config" data-id="{id}">Set default</button>"#
            );
        }
        let _ = write!(
            html,
            concat!(
                r#"<button class="config-action-btn secondary" data-action="edit-config" data-id="{id}">Edit</button>"#,
                r#"<button class="config-action-btn danger" data-action="delete-config" data-id="{id}">Delete</button>"#,
                "</div></div>"
            ),
            id = id
        );
    }
    html.push_str("</div>");
    html
}

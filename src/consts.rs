pub(crate) const LOG_TARGET_PREFIX: &str = "gotify-client";

pub const PAGE_SIZE: usize = 10;
pub const PUSH_FEED_CAP: usize = 100;

pub const NEW_MESSAGE_EVENT: &str = "new-message";

pub(crate) const SIDEBAR_COLLAPSED_MARGIN: &str = "50px";
pub(crate) const SIDEBAR_EXPANDED_MARGIN: &str = "200px";

pub(crate) const DEFAULT_NOTIFICATION_TITLE: &str = "New message";
pub(crate) const UNTITLED_MESSAGE: &str = "Untitled";

pub(crate) const CONFIRM_DELETE_MESSAGE: &str = "Delete this message?";
pub(crate) const CONFIRM_DELETE_CONFIG: &str = "Delete this configuration?";

pub(crate) const ERR_URL_REQUIRED: &str = "Please enter the server URL";
pub(crate) const ERR_TOKEN_REQUIRED: &str = "Please enter the token";
pub(crate) const ERR_NAME_REQUIRED: &str = "Please enter a configuration name";
pub(crate) const ERR_URL_INVALID: &str = "Invalid URL format";

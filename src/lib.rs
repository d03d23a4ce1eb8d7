//! State, rendering and dispatch layer of a Gotify desktop client.
//!
//! An embedding shell supplies a [`BackendGateway`] (or an [`Invoker`] wrapped
//! in [`InvokeGateway`]) and a [`Confirm`] prompt, builds a [`Controller`],
//! calls [`Controller::bootstrap`], mirrors the [`Dom`] into its view and
//! forwards clicks as [`Action`]s.

pub mod app;
pub mod configs;
pub mod connection;
pub mod consts;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod gateway;
pub mod invoke;
pub mod messages;
pub mod model;
pub mod notifications;
pub mod options;
pub mod preferences;
pub mod render;
pub mod settings;
pub mod store;
pub mod ui_shell;

#[cfg(test)]
mod test_utils;

pub use app::{Controller, Startup};
pub use configs::ConfigDraft;
pub use dispatch::Action;
pub use error::{ClientError, GatewayError};
pub use gateway::{BackendGateway, Confirm, Envelope, FixedAnswer, GatewayResult};
pub use invoke::{InvokeGateway, Invoker};
pub use model::{AppSettings, AppState, Message, Page, ServerConfig};
pub use options::ClientOptions;
pub use render::Dom;
pub use store::StateStore;

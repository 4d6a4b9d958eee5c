//! Template Engine for HookRelay
//!
//! This crate turns webhook payloads into human-readable messages using a
//! named set of Handlebars templates. See [`MessageTemplates`].

mod errors;
pub mod helpers;
pub mod message_templates;

pub use errors::Error;
pub use message_templates::{MessageTemplates, TemplateRenderConfig, DEFAULT_TEMPLATES};

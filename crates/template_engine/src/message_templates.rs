//! # Message Templates
//!
//! A named set of Handlebars templates that turn a webhook payload into the
//! lines sent to a chat channel or posted to a social feed.
//!
//! Templates are addressed as `<source>.<event>.<destination>`, for example
//! `github.push.irc` or `github.push.twitter`. A built-in set covers every
//! event the relay understands; operators can override individual templates
//! from a TOML file without touching the rest.
//!
//! ## Examples
//!
//! ```rust
//! # use template_engine::MessageTemplates;
//! # use serde_json::json;
//! # fn main() -> Result<(), template_engine::Error> {
//! let templates = MessageTemplates::with_defaults()?;
//! let lines = templates.render(
//!     "generic.irc",
//!     &json!({"message": "deploy finished"}),
//! )?;
//! assert_eq!(lines, vec!["deploy finished".to_string()]);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use handlebars::Handlebars;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::Error;
use crate::helpers::register_helpers;

#[cfg(test)]
#[path = "message_templates_tests.rs"]
mod tests;

/// The built-in template set, compiled into the binary.
pub const DEFAULT_TEMPLATES: &str = include_str!("../templates/default.toml");

/// Configuration for template registration and rendering.
#[derive(Debug, Clone)]
pub struct TemplateRenderConfig {
    /// Whether to fail on undefined variables (true) or render them as empty
    /// strings (false).
    ///
    /// **Default**: `false`. Webhook payloads omit optional fields freely.
    pub strict_variables: bool,

    /// Maximum size of a single template in bytes.
    ///
    /// **Default**: 64KiB
    pub max_template_size: usize,
}

impl Default for TemplateRenderConfig {
    fn default() -> Self {
        Self {
            strict_variables: false,
            max_template_size: 65_536,
        }
    }
}

/// A registry of compiled message templates.
///
/// Rendering is read-only, so a single instance can be shared between request
/// handlers behind an `Arc`.
pub struct MessageTemplates {
    handlebars: Handlebars<'static>,
    config: TemplateRenderConfig,
}

impl std::fmt::Debug for MessageTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageTemplates")
            .field("templates", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

impl MessageTemplates {
    /// Creates an empty registry with all helpers registered.
    pub fn new(config: TemplateRenderConfig) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(config.strict_variables);
        // Output goes to IRC and Twitter, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);
        register_helpers(&mut handlebars);

        Self { handlebars, config }
    }

    /// Creates a registry containing the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in set is itself broken.
    pub fn with_defaults() -> Result<Self, Error> {
        let mut templates = Self::new(TemplateRenderConfig::default());
        templates.register_toml(DEFAULT_TEMPLATES)?;
        Ok(templates)
    }

    /// Creates a registry containing the built-in templates, then applies the
    /// overrides found in the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` when the file cannot be read, `Error::Parse` when it
    /// is not a flat table of strings, and `Error::Compilation` when any
    /// template fails to compile.
    pub fn with_overrides(path: &Path) -> Result<Self, Error> {
        let mut templates = Self::with_defaults()?;
        let content = fs::read_to_string(path)?;
        let count = templates.register_toml(&content)?;
        info!(path = ?path, count, "Loaded message template overrides");
        Ok(templates)
    }

    /// Registers every `name = "template"` entry of a TOML document.
    ///
    /// Returns the number of templates registered. Entries replace any
    /// template already registered under the same name.
    pub fn register_toml(&mut self, content: &str) -> Result<usize, Error> {
        let entries: BTreeMap<String, String> =
            toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;

        for (name, source) in &entries {
            self.register(name, source)?;
        }

        Ok(entries.len())
    }

    /// Compiles and registers a single template.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), Error> {
        if source.len() > self.config.max_template_size {
            return Err(Error::TooLarge {
                name: name.to_string(),
                size: source.len(),
                limit: self.config.max_template_size,
            });
        }

        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| Error::Compilation {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        debug!(template = name, "Registered message template");
        Ok(())
    }

    /// Returns true when a template is registered under `name`.
    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Names of all registered templates, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    /// Renders the template `name` against `context` and splits the output
    /// into lines.
    ///
    /// Trailing whitespace is trimmed from each line and blank lines are
    /// dropped, so a template may use `{{#each}}` blocks freely.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTemplate` if no template is registered under
    /// `name` and `Error::Render` if rendering fails.
    pub fn render(&self, name: &str, context: &Value) -> Result<Vec<String>, Error> {
        if !self.has_template(name) {
            return Err(Error::UnknownTemplate(name.to_string()));
        }

        let output = self
            .handlebars
            .render(name, context)
            .map_err(|e| Error::Render {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(split_lines(&output))
    }
}

/// Splits rendered output into non-blank, right-trimmed lines.
pub fn split_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

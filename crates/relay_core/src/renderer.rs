//! The seam between dispatch and the template engine.

use serde_json::Value;
use template_engine::MessageTemplates;

use crate::errors::RenderError;

/// Renders a named message template against a webhook payload.
pub trait MessageRenderer: Send + Sync {
    /// Returns the rendered output split into lines.
    fn render(&self, template: &str, context: &Value) -> Result<Vec<String>, RenderError>;
}

impl MessageRenderer for MessageTemplates {
    fn render(&self, template: &str, context: &Value) -> Result<Vec<String>, RenderError> {
        MessageTemplates::render(self, template, context).map_err(|e| RenderError {
            template: template.to_string(),
            message: e.to_string(),
        })
    }
}

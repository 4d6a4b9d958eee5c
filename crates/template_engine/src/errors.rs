use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types that can occur while loading or rendering message templates.
///
/// # Examples
///
/// ```rust,ignore
/// use template_engine::Error;
///
/// match templates.render("github.push.irc", &payload) {
///     Ok(lines) => println!("{} line(s)", lines.len()),
///     Err(Error::UnknownTemplate(name)) => eprintln!("No template named {}", name),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed while reading a template override file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The template override file is not a valid TOML table of strings.
    #[error("Failed to parse template file: {0}")]
    Parse(String),

    /// A template failed to compile.
    ///
    /// Raised at registration time so that a broken template set is rejected
    /// during startup rather than on the first matching webhook.
    #[error("Template '{name}' failed to compile: {message}")]
    Compilation {
        /// Name of the template that failed
        name: String,
        /// Detailed error message from the Handlebars parser
        message: String,
    },

    /// A template exceeded the configured size limit.
    #[error("Template '{name}' is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    /// No template is registered under the requested name.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// A syntactically valid template failed while rendering a payload.
    #[error("Template '{name}' failed to render: {message}")]
    Render {
        /// Name of the template that failed
        name: String,
        /// Detailed error message from the Handlebars renderer
        message: String,
    },
}

//! Integration testing library for HookRelay.
//!
//! Runs a complete relay against a fake IRC server and a mocked Twitter API,
//! so webhooks can be posted over real HTTP and the resulting IRC lines and
//! tweets inspected.

pub mod fake_irc;
pub mod fixtures;
pub mod mock_twitter;

pub use fake_irc::FakeIrcServer;
pub use fixtures::{relay_config, signed_github_request, GENERIC_TOKEN, GITHUB_SECRET};
pub use mock_twitter::TwitterMockServer;

/// Initialize logging for tests.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_test_writer()
        .try_init();
}

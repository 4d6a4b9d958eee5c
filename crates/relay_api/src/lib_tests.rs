use super::*;
use crate::test_support::{fixture, fixture_with};
use secrecy::ExposeSecret;

#[test]
fn test_state_from_config_includes_enabled_listeners() {
    let state = fixture().state;

    let generic = state.generic.expect("generic listener");
    assert_eq!(
        generic.secret.as_ref().map(|s| s.expose_secret().to_string()),
        Some(crate::test_support::GENERIC_TOKEN.to_string())
    );
    assert_eq!(generic.router.resolve(None), Some("#general"));

    assert!(state.grafana.is_some());

    let github = state.github.expect("github listener");
    assert_eq!(github.router.resolve(Some("Widget")), Some("#builds"));
}

#[test]
fn test_disabled_listener_has_no_state() {
    let listeners = ListenersConfig {
        generic: Some(ListenerConfig {
            enabled: false,
            ..ListenerConfig::enabled()
        }),
        ..ListenersConfig::default()
    };

    let state = fixture_with(&listeners).state;

    assert!(state.generic.is_none());
    assert!(state.grafana.is_none());
    assert!(state.github.is_none());
}

#[test]
fn test_debug_hides_secrets() {
    let state = fixture().state;

    let rendered = format!("{state:?}");

    assert!(!rendered.contains(crate::test_support::GITHUB_SECRET));
    assert!(!rendered.contains(&format!("\"{}\"", crate::test_support::GENERIC_TOKEN)));
}

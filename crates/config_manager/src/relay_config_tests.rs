use super::*;
use std::io::Write;
use tempfile::TempDir;

const MINIMAL: &str = r##"
[irc]
server = "irc.example.net"
nick = "hookrelay"
"##;

const FULL: &str = r##"
[http]
listen = "127.0.0.1:9000"
render_failure = "isolate"

[http.listeners.generic]
enabled = true
secret = "generic-token"
default_channel = "#general"

[http.listeners.grafana]
enabled = false
default_channel = "#alerts"

[http.listeners.github]
secret = "webhook-secret"

[http.listeners.github.repositories]
Widget = "#builds"
gadget = "#gadgets"

[irc]
server = "irc.example.net"
port = 6697
nick = "hookrelay"
username = "relay"
password = "hunter2"
channels = ["#builds", "#gadgets"]

[twitter]
bearer_token = "token"

[templates]
path = "templates.toml"
"##;

#[test]
fn test_minimal_config_uses_defaults() {
    let config = RelayConfig::from_toml_str(MINIMAL).unwrap();

    assert_eq!(config.http.listen, DEFAULT_LISTEN_ADDRESS);
    assert!(!config.http.tls);
    assert_eq!(config.http.render_failure, RenderFailurePolicy::Abort);
    assert!(config.http.listeners.github().is_none());
    assert!(config.http.listeners.generic().is_none());
    assert!(config.http.listeners.grafana().is_none());
    assert_eq!(config.irc.port, DEFAULT_IRC_PORT);
    assert_eq!(config.irc.username(), "hookrelay");
    assert_eq!(config.irc.realname(), "hookrelay");
    assert!(config.twitter.is_none());
    assert!(config.templates.path.is_none());
}

#[test]
fn test_full_config() {
    let config = RelayConfig::from_toml_str(FULL).unwrap();

    assert_eq!(config.http.listen_address().unwrap(), "127.0.0.1:9000");
    assert_eq!(config.http.render_failure, RenderFailurePolicy::Isolate);

    let generic = config.http.listeners.generic().unwrap();
    assert_eq!(generic.secret.as_deref(), Some("generic-token"));
    assert_eq!(generic.default_channel.as_deref(), Some("#general"));

    // Present but disabled.
    assert!(config.http.listeners.grafana.is_some());
    assert!(config.http.listeners.grafana().is_none());

    let github = config.http.listeners.github().unwrap();
    assert!(github.enabled);
    assert!(github.default_channel.is_none());
    assert_eq!(github.repositories.get("widget").map(String::as_str), Some("#builds"));
    assert_eq!(github.repositories.get("gadget").map(String::as_str), Some("#gadgets"));

    assert_eq!(config.irc.port, 6697);
    assert_eq!(config.irc.username(), "relay");
    assert_eq!(config.irc.password.as_deref(), Some("hunter2"));
    assert_eq!(config.irc.channels, vec!["#builds", "#gadgets"]);

    let twitter = config.twitter.unwrap();
    assert!(twitter.enabled);
    assert_eq!(twitter.api_base, DEFAULT_TWITTER_API_BASE);
}

#[test]
fn test_missing_irc_section_fails_to_parse() {
    let result = RelayConfig::from_toml_str("[http]\nlisten = \"0.0.0.0:80\"\n");

    assert!(matches!(result, Err(ConfigurationError::ParseError { .. })));
}

#[test]
fn test_invalid_listen_address() {
    let content = format!("[http]\nlisten = \"not-an-address\"\n{MINIMAL}");

    let result = RelayConfig::from_toml_str(&content);

    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidConfiguration { ref field, .. }) if field == "http.listen"
    ));
}

#[test]
fn test_listen_address_forms() {
    let listen = |value: &str| HttpConfig {
        listen: value.to_string(),
        ..HttpConfig::default()
    };

    assert_eq!(listen("0.0.0.0:8080").listen_address().unwrap(), "0.0.0.0:8080");
    assert_eq!(listen("[::1]:8080").listen_address().unwrap(), "[::1]:8080");
    assert_eq!(listen(":8045").listen_address().unwrap(), "0.0.0.0:8045");
    assert_eq!(
        listen("localhost:8080").listen_address().unwrap(),
        "localhost:8080"
    );

    assert!(listen("localhost").listen_address().is_err());
    assert!(listen(":http").listen_address().is_err());
    assert!(listen("::1:8080").listen_address().is_err());
    assert!(listen("my host:8080").listen_address().is_err());
}

#[test]
fn test_short_listen_form_is_accepted_at_load() {
    let content = format!("[http]\nlisten = \":8045\"\n{MINIMAL}");

    let config = RelayConfig::from_toml_str(&content).unwrap();

    assert_eq!(config.http.listen, ":8045");
    assert_eq!(config.http.listen_address().unwrap(), "0.0.0.0:8045");
}

#[test]
fn test_tls_requires_certificate_and_key() {
    let content = format!("[http]\ntls = true\ntls_key = \"key.pem\"\n{MINIMAL}");

    let result = RelayConfig::from_toml_str(&content);

    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::RequiredConfigMissing {
            key: "http.tls_cert".to_string()
        }
    );

    let content = format!("[http]\ntls = true\ntls_cert = \"cert.pem\"\n{MINIMAL}");

    let result = RelayConfig::from_toml_str(&content);

    assert_eq!(
        result.unwrap_err(),
        ConfigurationError::RequiredConfigMissing {
            key: "http.tls_key".to_string()
        }
    );
}

#[test]
fn test_unknown_render_failure_policy() {
    let content = format!("[http]\nrender_failure = \"sometimes\"\n{MINIMAL}");

    let result = RelayConfig::from_toml_str(&content);

    assert!(matches!(result, Err(ConfigurationError::ParseError { .. })));
}

#[test]
fn test_blank_nick_is_rejected() {
    let result = RelayConfig::from_toml_str("[irc]\nserver = \"irc.example.net\"\nnick = \" \"\n");

    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidConfiguration { ref field, .. }) if field == "irc.nick"
    ));
}

#[test]
fn test_blank_twitter_token_is_rejected() {
    let content = format!("{MINIMAL}\n[twitter]\nbearer_token = \"\"\n");

    let result = RelayConfig::from_toml_str(&content);

    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidConfiguration { ref field, .. }) if field == "twitter.bearer_token"
    ));
}

#[test]
fn test_unknown_top_level_key_is_rejected() {
    let content = format!("{MINIMAL}\n[twiter]\nbearer_token = \"x\"\n");

    let result = RelayConfig::from_toml_str(&content);

    assert!(matches!(result, Err(ConfigurationError::ParseError { .. })));
}

#[test]
fn test_load_nonexistent_file() {
    let result = RelayConfig::load(Path::new("nonexistent_hookrelay.toml"));

    assert!(matches!(result, Err(ConfigurationError::FileNotFound { .. })));
}

#[test]
fn test_load_resolves_relative_paths() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILENAME);
    let mut file = fs::File::create(&config_path).unwrap();
    write!(
        file,
        "[http]\ntls = true\ntls_cert = \"cert.pem\"\ntls_key = \"/etc/ssl/key.pem\"\n\n[templates]\npath = \"templates.toml\"\n{MINIMAL}"
    )
    .unwrap();

    let config = RelayConfig::load(&config_path).unwrap();

    assert_eq!(
        config.http.tls_cert.as_deref(),
        Some(temp_dir.path().join("cert.pem").as_path())
    );
    assert_eq!(config.http.tls_key.as_deref(), Some(Path::new("/etc/ssl/key.pem")));
    assert_eq!(
        config.templates.path.as_deref(),
        Some(temp_dir.path().join("templates.toml").as_path())
    );
}

#[test]
fn test_load_invalid_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("invalid_config.toml");
    fs::write(&config_path, "invalid = toml = syntax").unwrap();

    let result = RelayConfig::load(&config_path);

    assert!(matches!(result, Err(ConfigurationError::ParseError { .. })));
}

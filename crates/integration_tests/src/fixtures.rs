//! Relay configuration and request fixtures.

use anyhow::Result;
use config_manager::RelayConfig;
use relay_core::signature::compute_signature;

pub const GITHUB_SECRET: &str = "integration-secret";
pub const GENERIC_TOKEN: &str = "integration-token";

/// Configuration listening on an ephemeral loopback port, with IRC on
/// `irc_port` and Twitter at `twitter_base` when given.
///
/// GitHub pushes to `widget` go to `#builds`; generic messages go to
/// `#general`; Grafana alerts go to `#alerts`.
pub fn relay_config(irc_port: u16, twitter_base: Option<&str>) -> Result<RelayConfig> {
    let twitter = twitter_base
        .map(|base| format!("[twitter]\nbearer_token = \"test-bearer\"\napi_base = \"{base}\"\n"))
        .unwrap_or_default();

    let toml = format!(
        r##"
[http]
listen = "127.0.0.1:0"

[http.listeners.generic]
secret = "{GENERIC_TOKEN}"
default_channel = "#general"

[http.listeners.grafana]
default_channel = "#alerts"

[http.listeners.github]
secret = "{GITHUB_SECRET}"

[http.listeners.github.repositories]
Widget = "#builds"

[irc]
server = "127.0.0.1"
port = {irc_port}
nick = "hookrelay"
channels = ["#builds", "#general", "#alerts"]

{twitter}
"##
    );

    Ok(RelayConfig::from_toml_str(&toml)?)
}

/// Builds a signed `POST /github` request.
pub fn signed_github_request(
    client: &reqwest::Client,
    base: &str,
    event: &str,
    body: &serde_json::Value,
) -> reqwest::RequestBuilder {
    let body = serde_json::to_vec(body).unwrap_or_default();
    client
        .post(format!("{base}/github"))
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header(
            "x-hub-signature-256",
            compute_signature(GITHUB_SECRET, &body).unwrap_or_default(),
        )
        .body(body)
}

use super::*;
use tokio::io::{
    duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf,
};
use tokio::time::{timeout, Duration};

async fn next_line(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) -> String {
    timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("timed out waiting for client line")
        .unwrap()
        .expect("client closed the connection")
}

fn registration() -> Registration {
    Registration {
        password: None,
        nick: "hookrelay".to_string(),
        username: "hookrelay".to_string(),
        realname: "hookrelay".to_string(),
        channels: vec!["#builds".to_string()],
    }
}

#[tokio::test]
async fn test_chat_relay_sends_privmsg() {
    let (client, server) = duplex(8192);
    let (relay, _task) = IrcRelay::spawn(client, registration());
    let (reader, mut writer) = tokio::io::split(server);
    let mut lines = BufReader::new(reader).lines();

    assert_eq!(next_line(&mut lines).await, "NICK hookrelay");
    assert_eq!(next_line(&mut lines).await, "USER hookrelay 0 * :hookrelay");
    writer
        .write_all(b":irc.example.net 001 hookrelay :Welcome\r\n")
        .await
        .unwrap();
    assert_eq!(next_line(&mut lines).await, "JOIN #builds");

    relay
        .send_line("#builds", "[widget] octocat pushed 1 commit(s)")
        .await
        .unwrap();

    assert_eq!(
        next_line(&mut lines).await,
        "PRIVMSG #builds :[widget] octocat pushed 1 commit(s)"
    );
}

#[tokio::test]
async fn test_long_message_is_queued_in_chunks() {
    let (client, _server) = duplex(64);
    let (relay, _task) = IrcRelay::spawn(client, registration());

    let queued = relay
        .send_message("#builds", &"x".repeat(message::MAX_TEXT_BYTES + 1))
        .await
        .unwrap();

    assert_eq!(queued, 2);
}

#[tokio::test]
async fn test_send_after_session_ended_is_closed() {
    let (client, server) = duplex(64);
    let (relay, task) = IrcRelay::spawn(client, registration());
    drop(server);

    let _ = timeout(Duration::from_secs(5), task).await.unwrap();

    assert_eq!(
        relay.send_line("#builds", "too late").await,
        Err(SinkError::Closed)
    );
}

#[tokio::test]
async fn test_connect_failure_reports_address() {
    let mut config = IrcConfig::new("127.0.0.1", "hookrelay");
    // Port 1 is reserved and nothing listens on it in the test environment.
    config.port = 1;

    let error = IrcRelay::connect(&config).await.unwrap_err();

    assert!(matches!(error, Error::Connect { ref address, .. } if address == "127.0.0.1:1"));
}

use super::*;

#[test]
fn test_connect_error_names_the_address() {
    let error = Error::Connect {
        address: "irc.example.net:6667".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
    };

    let message = error.to_string();
    assert!(message.contains("irc.example.net:6667"));
    assert!(message.contains("refused"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_closed_display() {
    assert_eq!(Error::Closed.to_string(), "IRC session is closed");
}
